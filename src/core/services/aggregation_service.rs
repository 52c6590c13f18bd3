//! Time-bucketed rollups of income and expense entries.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate};
use tracing::debug;

use crate::domain::common::{SortOrder, TimeUnit};
use crate::domain::entry::{Entry, EntryKind};

/// `part / total × 100`, or `0` when `total` is zero.
pub fn percentage(part: f64, total: f64) -> f64 {
    if total == 0.0 {
        0.0
    } else {
        part / total * 100.0
    }
}

/// `(curr − prev) / prev × 100`. Returns `None` when `prev` is zero; callers
/// render that as "no trend" rather than substituting a value.
pub fn percent_change(current: f64, previous: f64) -> Option<f64> {
    if previous == 0.0 {
        None
    } else {
        Some((current - previous) / previous * 100.0)
    }
}

/// Calendar key of the bucket containing `date`.
pub fn bucket_key(date: NaiveDate, unit: TimeUnit) -> String {
    match unit {
        TimeUnit::Day => date.format("%Y-%m-%d").to_string(),
        TimeUnit::Week => {
            let week = date.iso_week();
            format!("{:04}-W{:02}", week.year(), week.week())
        }
        TimeUnit::Month => format!("{:04}-{:02}", date.year(), date.month()),
        TimeUnit::Year => format!("{:04}", date.year()),
    }
}

/// Last `count` units ending today, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollingWindow {
    pub count: u32,
    pub unit: TimeUnit,
}

impl RollingWindow {
    pub fn new(count: u32, unit: TimeUnit) -> Self {
        Self { count, unit }
    }

    /// Windows reaching past the earliest representable date start there.
    pub fn bounds(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let span = self.unit.approx_days().unsigned_abs() * u64::from(self.count);
        let start = today
            .checked_sub_days(Days::new(span))
            .unwrap_or(NaiveDate::MIN);
        (start, today)
    }

    pub fn contains(&self, date: NaiveDate, today: NaiveDate) -> bool {
        let (start, end) = self.bounds(today);
        date >= start && date <= end
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BucketQuery {
    pub unit: TimeUnit,
    /// `None` groups every entry; `Some(n)` keeps the last `n` units only.
    pub last: Option<u32>,
    pub order: SortOrder,
}

impl BucketQuery {
    pub fn new(unit: TimeUnit) -> Self {
        Self {
            unit,
            last: None,
            order: SortOrder::Ascending,
        }
    }

    pub fn last(mut self, count: u32) -> Self {
        self.last = Some(count);
        self
    }

    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }
}

/// An entry inside a bucket with its share of that bucket's total for its kind.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketEntry {
    pub entry: Entry,
    pub share_of_bucket: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BucketSummary {
    pub key: String,
    pub income_total: f64,
    pub expense_total: f64,
    pub savings: f64,
    /// Share of the report-wide income total.
    pub income_share: f64,
    /// Share of the report-wide expense total.
    pub expense_share: f64,
    /// Change against the bucket listed just before this one.
    pub income_change: Option<f64>,
    pub expense_change: Option<f64>,
    pub entries: Vec<BucketEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BucketReport {
    pub unit: TimeUnit,
    pub income_total: f64,
    pub expense_total: f64,
    pub buckets: Vec<BucketSummary>,
}

impl BucketReport {
    pub fn savings(&self) -> f64 {
        self.income_total - self.expense_total
    }

    pub fn bucket(&self, key: &str) -> Option<&BucketSummary> {
        self.buckets.iter().find(|bucket| bucket.key == key)
    }
}

pub struct AggregationService;

impl AggregationService {
    /// Groups `entries` by calendar bucket.
    ///
    /// Report-wide totals (the divisors for `income_share` and
    /// `expense_share`) cover every entry passed in, windowed or not. Trends
    /// compare neighbours in the requested display order.
    pub fn bucketize(entries: &[Entry], query: BucketQuery, today: NaiveDate) -> BucketReport {
        let income_total = sum_kind(entries.iter(), EntryKind::Income);
        let expense_total = sum_kind(entries.iter(), EntryKind::Expense);

        let window = query.last.map(|count| RollingWindow::new(count, query.unit));
        let mut groups: BTreeMap<String, Vec<&Entry>> = BTreeMap::new();
        for entry in entries {
            if let Some(window) = window {
                if !window.contains(entry.date, today) {
                    continue;
                }
            }
            groups
                .entry(bucket_key(entry.date, query.unit))
                .or_default()
                .push(entry);
        }

        let mut ordered: Vec<(String, Vec<&Entry>)> = groups.into_iter().collect();
        if query.order == SortOrder::Descending {
            ordered.reverse();
        }

        let mut buckets = Vec::with_capacity(ordered.len());
        let mut previous: Option<(f64, f64)> = None;
        for (key, members) in ordered {
            let bucket_income = sum_kind(members.iter().copied(), EntryKind::Income);
            let bucket_expense = sum_kind(members.iter().copied(), EntryKind::Expense);
            let (income_change, expense_change) = match previous {
                Some((prev_income, prev_expense)) => (
                    percent_change(bucket_income, prev_income),
                    percent_change(bucket_expense, prev_expense),
                ),
                None => (None, None),
            };
            let entries = members
                .into_iter()
                .map(|entry| {
                    let divisor = match entry.kind {
                        EntryKind::Income => bucket_income,
                        EntryKind::Expense => bucket_expense,
                        EntryKind::Charge => 0.0,
                    };
                    BucketEntry {
                        entry: entry.clone(),
                        share_of_bucket: percentage(entry.amount, divisor),
                    }
                })
                .collect();
            buckets.push(BucketSummary {
                key,
                income_total: bucket_income,
                expense_total: bucket_expense,
                savings: bucket_income - bucket_expense,
                income_share: percentage(bucket_income, income_total),
                expense_share: percentage(bucket_expense, expense_total),
                income_change,
                expense_change,
                entries,
            });
            previous = Some((bucket_income, bucket_expense));
        }

        debug!(unit = %query.unit, buckets = buckets.len(), "entries bucketed");
        BucketReport {
            unit: query.unit,
            income_total,
            expense_total,
            buckets,
        }
    }
}

fn sum_kind<'a>(entries: impl Iterator<Item = &'a Entry>, kind: EntryKind) -> f64 {
    entries
        .filter(|entry| entry.kind == kind)
        .map(|entry| entry.amount)
        .sum()
}
