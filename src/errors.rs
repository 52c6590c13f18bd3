use std::result::Result as StdResult;

use thiserror::Error;

/// Error type that captures ledger, settlement and persistence failures.
///
/// Every variant is recoverable: callers report the problem and carry on.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Invalid amount: {0} (amounts must be finite and not negative)")]
    InvalidAmount(f64),
    #[error("Invalid payment: {payment} (outstanding balance is {outstanding})")]
    InvalidPayment { payment: f64, outstanding: f64 },
    #[error("Invalid date `{0}`: expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("Entry not found: {0}")]
    EntryNotFound(u64),
    #[error("Owner not found: {0}")]
    OwnerNotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Persistence error: {0}")]
    Storage(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = StdResult<T, LedgerError>;

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_error_mentions_outstanding_balance() {
        let err = LedgerError::InvalidPayment {
            payment: 80.0,
            outstanding: 50.0,
        };
        let message = err.to_string();
        assert!(message.contains("80"), "unexpected message: {message}");
        assert!(message.contains("50"), "unexpected message: {message}");
    }

    #[test]
    fn io_errors_map_to_storage() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(matches!(LedgerError::from(io), LedgerError::Storage(ref m) if m.contains("gone")));
    }
}
