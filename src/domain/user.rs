use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{LedgerError, Result};

/// Tracker account holder. Credentials live outside this crate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    pub fn new(username: impl Into<String>, email: Option<String>) -> Result<Self> {
        let username = username.into().trim().to_string();
        if username.is_empty() {
            return Err(LedgerError::InvalidInput("username cannot be empty".into()));
        }
        if let Some(address) = email.as_deref() {
            if !is_valid_email(address) {
                return Err(LedgerError::InvalidInput(format!(
                    "`{address}` is not a valid e-mail address"
                )));
            }
        }
        Ok(Self {
            username,
            email,
            created_at: Some(Utc::now()),
        })
    }
}

/// Accepts the `local@domain.tld` shape: one `@`, and a dot inside the domain.
pub fn is_valid_email(address: &str) -> bool {
    let mut parts = address.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    if local.is_empty() || address.chars().any(char::is_whitespace) {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape_is_checked() {
        assert!(is_valid_email("ana@example.com"));
        assert!(is_valid_email("a.b@mail.co.uk"));
        assert!(!is_valid_email("ana@example"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ana@@example.com"));
        assert!(!is_valid_email("ana @example.com"));
    }

    #[test]
    fn blank_username_is_rejected() {
        assert!(UserProfile::new("   ", None).is_err());
        let profile = UserProfile::new(" ana ", Some("ana@example.com".into())).unwrap();
        assert_eq!(profile.username, "ana");
    }
}
