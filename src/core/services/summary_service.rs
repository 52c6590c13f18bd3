//! Category totals and filtered views over a ledger.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::core::services::aggregation_service::percentage;
use crate::domain::category::categories_for;
use crate::domain::entry::{Entry, EntryKind};

/// Income, expense and their difference over some set of entries.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub income: f64,
    pub expense: f64,
    pub savings: f64,
}

impl Totals {
    pub fn of<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> Self {
        let (income, expense) = entries
            .into_iter()
            .fold((0.0, 0.0), |(income, expense), entry| match entry.kind {
                EntryKind::Income => (income + entry.amount, expense),
                EntryKind::Expense => (income, expense + entry.amount),
                EntryKind::Charge => (income, expense),
            });
        Self {
            income,
            expense,
            savings: income - expense,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryShare {
    pub kind: EntryKind,
    pub category: String,
    pub total: f64,
    /// Percentage of the total for `kind`.
    pub share: f64,
}

/// Which entries a filtered view keeps.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryFilter {
    All,
    Kind(EntryKind),
    Category(EntryKind, String),
    OnDate(NaiveDate),
    /// The last `n` entries in insertion order.
    Recent(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilteredView {
    pub filter: EntryFilter,
    pub entries: Vec<Entry>,
    pub totals: Totals,
}

impl FilteredView {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub struct SummaryService;

impl SummaryService {
    /// Sums by `(kind, category)`, sorted by kind and then category.
    pub fn by_category(entries: &[Entry]) -> Vec<CategoryShare> {
        let mut groups: BTreeMap<(EntryKind, String), f64> = BTreeMap::new();
        let mut kind_totals: BTreeMap<EntryKind, f64> = BTreeMap::new();
        for entry in entries {
            *groups
                .entry((entry.kind, entry.category.clone()))
                .or_insert(0.0) += entry.amount;
            *kind_totals.entry(entry.kind).or_insert(0.0) += entry.amount;
        }
        groups
            .into_iter()
            .map(|((kind, category), total)| {
                let kind_total = kind_totals.get(&kind).copied().unwrap_or(0.0);
                CategoryShare {
                    kind,
                    category,
                    total,
                    share: percentage(total, kind_total),
                }
            })
            .collect()
    }

    /// Every category of the closed set for `kind`, in list order, including
    /// categories with nothing recorded.
    pub fn category_breakdown(entries: &[Entry], kind: EntryKind) -> Vec<CategoryShare> {
        let kind_total: f64 = entries
            .iter()
            .filter(|entry| entry.kind == kind)
            .map(|entry| entry.amount)
            .sum();
        categories_for(kind)
            .iter()
            .map(|category| {
                let total = entries
                    .iter()
                    .filter(|entry| entry.kind == kind && entry.category == *category)
                    .map(|entry| entry.amount)
                    .sum();
                CategoryShare {
                    kind,
                    category: (*category).to_string(),
                    total,
                    share: percentage(total, kind_total),
                }
            })
            .collect()
    }

    pub fn filter(entries: &[Entry], filter: EntryFilter) -> FilteredView {
        let kept: Vec<Entry> = match &filter {
            EntryFilter::All => entries.to_vec(),
            EntryFilter::Kind(kind) => entries
                .iter()
                .filter(|entry| entry.kind == *kind)
                .cloned()
                .collect(),
            EntryFilter::Category(kind, category) => entries
                .iter()
                .filter(|entry| entry.kind == *kind && entry.category == *category)
                .cloned()
                .collect(),
            EntryFilter::OnDate(date) => entries
                .iter()
                .filter(|entry| entry.date == *date)
                .cloned()
                .collect(),
            EntryFilter::Recent(count) => {
                let start = entries.len().saturating_sub(*count);
                entries[start..].to_vec()
            }
        };
        let totals = Totals::of(&kept);
        FilteredView {
            filter,
            entries: kept,
            totals,
        }
    }
}
