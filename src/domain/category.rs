//! Closed category sets used by the expense tracker.

use crate::domain::entry::EntryKind;
use crate::errors::{LedgerError, Result};

pub const EXPENSE_CATEGORIES: [&str; 8] = [
    "Food & Groceries",
    "Transportation",
    "Entertainment",
    "Personal Needs",
    "Personal Wants",
    "Health & Fitness",
    "Bills",
    "School/Work",
];

pub const INCOME_CATEGORIES: [&str; 4] = ["Allowance", "Work", "Reward", "Gift"];

/// Essentials in the order dashboard focus areas are reported.
pub const ESSENTIAL_CATEGORIES: [&str; 6] = [
    "Food & Groceries",
    "Transportation",
    "School/Work",
    "Personal Needs",
    "Bills",
    "Health & Fitness",
];

pub const DESIRE_CATEGORIES: [&str; 2] = ["Entertainment", "Personal Wants"];

/// Spending class of an expense category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpendingGroup {
    Essential,
    Desire,
}

/// Categories allowed for `kind`. Charges accept any procedure name, so the list is empty.
pub fn categories_for(kind: EntryKind) -> &'static [&'static str] {
    match kind {
        EntryKind::Expense => &EXPENSE_CATEGORIES,
        EntryKind::Income => &INCOME_CATEGORIES,
        EntryKind::Charge => &[],
    }
}

pub fn validate_category(kind: EntryKind, category: &str) -> Result<()> {
    let trimmed = category.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::InvalidInput("category cannot be empty".into()));
    }
    if kind == EntryKind::Charge || categories_for(kind).contains(&trimmed) {
        Ok(())
    } else {
        Err(LedgerError::InvalidInput(format!(
            "`{trimmed}` is not a valid {kind} category"
        )))
    }
}

/// Resolves user input (exact label, case-insensitive label, or 1-based menu number).
pub fn resolve_category(kind: EntryKind, raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if kind == EntryKind::Charge {
        validate_category(kind, trimmed)?;
        return Ok(trimmed.to_string());
    }
    let options = categories_for(kind);
    if let Ok(index) = trimmed.parse::<usize>() {
        if (1..=options.len()).contains(&index) {
            return Ok(options[index - 1].to_string());
        }
    }
    options
        .iter()
        .find(|label| label.eq_ignore_ascii_case(trimmed))
        .map(|label| label.to_string())
        .ok_or_else(|| {
            LedgerError::InvalidInput(format!("`{trimmed}` is not a valid {kind} category"))
        })
}

pub fn spending_group(category: &str) -> Option<SpendingGroup> {
    if ESSENTIAL_CATEGORIES.contains(&category) {
        Some(SpendingGroup::Essential)
    } else if DESIRE_CATEGORIES.contains(&category) {
        Some(SpendingGroup::Desire)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn income_labels_are_rejected_for_expenses() {
        assert!(validate_category(EntryKind::Income, "Gift").is_ok());
        assert!(validate_category(EntryKind::Expense, "Gift").is_err());
        assert!(validate_category(EntryKind::Charge, "Root canal").is_ok());
    }

    #[test]
    fn resolve_accepts_menu_numbers_and_loose_case() {
        assert_eq!(
            resolve_category(EntryKind::Expense, "7").unwrap(),
            "Bills".to_string()
        );
        assert_eq!(
            resolve_category(EntryKind::Income, "allowance").unwrap(),
            "Allowance".to_string()
        );
        assert!(resolve_category(EntryKind::Income, "9").is_err());
    }

    #[test]
    fn every_expense_category_has_a_group() {
        for category in EXPENSE_CATEGORIES {
            assert!(spending_group(category).is_some(), "{category} has no group");
        }
    }
}
