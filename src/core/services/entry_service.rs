//! Business logic helpers for recording, editing and deleting entries.

use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use crate::domain::category::validate_category;
use crate::domain::entry::{Entry, EntryKind, EntryPatch};
use crate::domain::ledger::Ledger;
use crate::errors::{LedgerError, Result};

/// Validated input for a new entry.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub date: NaiveDate,
    pub kind: EntryKind,
    pub amount: f64,
    pub category: String,
    pub description: Option<String>,
}

impl NewEntry {
    pub fn new(date: NaiveDate, kind: EntryKind, amount: f64, category: impl Into<String>) -> Self {
        Self {
            date,
            kind,
            amount,
            category: category.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let text = description.into();
        self.description = if text.trim().is_empty() {
            None
        } else {
            Some(text)
        };
        self
    }
}

/// Provides validated CRUD helpers for ledger entries.
pub struct EntryService;

impl EntryService {
    /// Charges may be zero (a free procedure); transactions must be positive.
    pub fn validate_amount(kind: EntryKind, amount: f64) -> Result<()> {
        let valid = amount.is_finite()
            && match kind {
                EntryKind::Charge => amount >= 0.0,
                EntryKind::Expense | EntryKind::Income => amount > 0.0,
            };
        if valid {
            Ok(())
        } else {
            Err(LedgerError::InvalidAmount(amount))
        }
    }

    /// Adds a new entry and returns its identifier.
    pub fn add(ledger: &mut Ledger, input: NewEntry) -> Result<u64> {
        Self::validate_amount(input.kind, input.amount)?;
        validate_category(input.kind, &input.category)?;
        let id = ledger.allocate_id()?;
        let mut entry = Entry::new(
            id,
            input.date,
            input.kind,
            input.amount,
            input.category.trim(),
        );
        entry.description = input.description;
        entry.recorded_at = Some(Utc::now());
        ledger.push(entry);
        info!(id, kind = %input.kind, amount = input.amount, "entry recorded");
        Ok(id)
    }

    /// Applies an explicit edit. The patched entry is validated as a whole
    /// before anything is written back.
    pub fn edit(ledger: &mut Ledger, id: u64, patch: EntryPatch) -> Result<()> {
        let entry = ledger.entry_mut(id).ok_or(LedgerError::EntryNotFound(id))?;
        if patch.is_empty() {
            debug!(id, "empty entry patch ignored");
            return Ok(());
        }
        let mut updated = entry.clone();
        if let Some(kind) = patch.kind {
            if kind.is_settleable() != updated.kind.is_settleable() {
                return Err(LedgerError::InvalidInput(format!(
                    "cannot change a {} entry into a {}",
                    updated.kind, kind
                )));
            }
            updated.kind = kind;
        }
        if let Some(amount) = patch.amount {
            updated.amount = amount;
        }
        if let Some(category) = patch.category {
            updated.category = category.trim().to_string();
        }
        if let Some(description) = patch.description {
            updated.description = description;
        }
        if let Some(date) = patch.date {
            updated.date = date;
        }

        Self::validate_amount(updated.kind, updated.amount)?;
        if updated.amount < updated.paid {
            return Err(LedgerError::InvalidAmount(updated.amount));
        }
        validate_category(updated.kind, &updated.category)?;

        *entry = updated;
        info!(id, "entry updated");
        Ok(())
    }

    /// Removes the entry identified by `id`, returning the removed instance.
    pub fn remove(ledger: &mut Ledger, id: u64) -> Result<Entry> {
        let removed = ledger.remove(id).ok_or(LedgerError::EntryNotFound(id))?;
        info!(id, "entry removed");
        Ok(removed)
    }

    /// Removes every entry dated `date` and returns how many were deleted.
    pub fn remove_on_date(ledger: &mut Ledger, date: NaiveDate) -> usize {
        let before = ledger.entries.len();
        ledger.entries.retain(|entry| entry.date != date);
        let removed = before - ledger.entries.len();
        info!(%date, removed, "entries removed by date");
        removed
    }

    /// Drops all entries. The id sequence keeps counting from where it was.
    pub fn clear(ledger: &mut Ledger) -> usize {
        let removed = ledger.entries.len();
        ledger.entries.clear();
        info!(removed, "ledger cleared");
        removed
    }

    /// Returns a snapshot of the ledger's entries.
    pub fn list(ledger: &Ledger) -> Vec<&Entry> {
        ledger.entries.iter().collect()
    }
}
