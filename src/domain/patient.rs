//! Clinic patient profile and its charge ledger.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::{Displayable, Identifiable};
use crate::domain::ledger::Ledger;
use crate::errors::{LedgerError, Result};

const CONTACT_LENGTH: usize = 11;
const CONTACT_PREFIX: &str = "09";

/// Mobile number of the form `09XXXXXXXXX`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactNumber(String);

impl ContactNumber {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(LedgerError::InvalidInput("contact cannot be empty".into()));
        }
        if !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Err(LedgerError::InvalidInput(
                "contact number must contain only digits".into(),
            ));
        }
        if trimmed.len() != CONTACT_LENGTH {
            return Err(LedgerError::InvalidInput(format!(
                "contact number must be exactly {CONTACT_LENGTH} digits"
            )));
        }
        if !trimmed.starts_with(CONTACT_PREFIX) {
            return Err(LedgerError::InvalidInput(format!(
                "contact number must start with '{CONTACT_PREFIX}'"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContactNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Patient {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub birthday: Option<NaiveDate>,
    pub contact: ContactNumber,
    /// Next appointment, if any.
    pub schedule: Option<NaiveDate>,
    /// Whether the appointment in `schedule` has been attended.
    pub visit_done: bool,
    pub is_active: bool,
    pub last_updated: Option<NaiveDate>,
    pub ledger: Ledger,
}

impl Patient {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        contact: ContactNumber,
        today: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            birthday: None,
            contact,
            schedule: None,
            visit_done: false,
            is_active: true,
            last_updated: Some(today),
            ledger: Ledger::new(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn touch(&mut self, today: NaiveDate) {
        self.last_updated = Some(today);
    }

    pub fn matches_name(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        self.full_name().to_lowercase().contains(&needle)
    }
}

impl Identifiable for Patient {
    type Id = Uuid;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Displayable for Patient {
    fn display_label(&self) -> String {
        format!("{} ({})", self.full_name(), self.ledger.status())
    }
}

/// Active and archived patients of one clinic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Roster {
    pub active: Vec<Patient>,
    pub archived: Vec<Patient>,
}

impl Roster {
    pub fn new(active: Vec<Patient>, archived: Vec<Patient>) -> Self {
        Self { active, archived }
    }

    pub fn get(&self, id: Uuid) -> Option<&Patient> {
        self.active
            .iter()
            .chain(self.archived.iter())
            .find(|patient| patient.id == id)
    }

    pub fn active_mut(&mut self, id: Uuid) -> Option<&mut Patient> {
        self.active.iter_mut().find(|patient| patient.id == id)
    }

    pub fn len(&self) -> usize {
        self.active.len() + self.archived.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.archived.is_empty()
    }
}
