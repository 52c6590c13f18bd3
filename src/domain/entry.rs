use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::common::{Displayable, Identifiable};

/// Closed set of entry kinds. `Charge` is a clinic procedure billed to a patient.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntryKind {
    Expense,
    Income,
    Charge,
}

impl EntryKind {
    /// Only charges carry an outstanding amount that payments settle.
    pub fn is_settleable(&self) -> bool {
        matches!(self, EntryKind::Charge)
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "expense" | "e" | "1" => Some(EntryKind::Expense),
            "income" | "i" | "2" => Some(EntryKind::Income),
            "charge" | "procedure" => Some(EntryKind::Charge),
            _ => None,
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntryKind::Expense => "Expense",
            EntryKind::Income => "Income",
            EntryKind::Charge => "Charge",
        };
        f.write_str(label)
    }
}

/// One dated monetary record owned by a user or patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entry {
    pub id: u64,
    pub date: NaiveDate,
    pub kind: EntryKind,
    pub amount: f64,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub paid: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_at: Option<DateTime<Utc>>,
}

impl Entry {
    pub fn new(
        id: u64,
        date: NaiveDate,
        kind: EntryKind,
        amount: f64,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id,
            date,
            kind,
            amount,
            category: category.into(),
            description: None,
            paid: 0.0,
            recorded_at: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Amount not yet covered by recorded payments, never negative.
    pub fn outstanding(&self) -> f64 {
        if self.kind.is_settleable() {
            (self.amount - self.paid).max(0.0)
        } else {
            0.0
        }
    }

    pub fn is_settled(&self) -> bool {
        self.outstanding() <= 0.0
    }
}

impl Identifiable for Entry {
    type Id = u64;

    fn id(&self) -> u64 {
        self.id
    }
}

impl Displayable for Entry {
    fn display_label(&self) -> String {
        let mut label = format!(
            "[{}] {} | {} | {:.2} | {}",
            self.id, self.date, self.kind, self.amount, self.category
        );
        if let Some(description) = &self.description {
            label.push_str(" | ");
            label.push_str(description);
        }
        label
    }
}

/// Explicit edit of an existing entry. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryPatch {
    pub kind: Option<EntryKind>,
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub description: Option<Option<String>>,
    pub date: Option<NaiveDate>,
}

impl EntryPatch {
    pub fn is_empty(&self) -> bool {
        *self == EntryPatch::default()
    }
}
