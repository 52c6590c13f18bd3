//! Dashboard analytics for a tracker ledger.

use std::collections::HashSet;

use chrono::{Duration, NaiveDate};

use crate::core::services::aggregation_service::percent_change;
use crate::core::services::summary_service::{CategoryShare, SummaryService, Totals};
use crate::domain::category::{DESIRE_CATEGORIES, ESSENTIAL_CATEGORIES};
use crate::domain::entry::{Entry, EntryKind};

const TREND_WINDOW_DAYS: i64 = 7;
const FOCUS_AREAS: usize = 2;

/// Income and expense recorded on one calendar day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayFigures {
    pub date: NaiveDate,
    pub totals: Totals,
}

impl DayFigures {
    pub fn has_data(&self) -> bool {
        self.totals.income > 0.0 || self.totals.expense > 0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSnapshot {
    pub overall: Totals,
    pub days_tracked: usize,
    pub average_income_per_day: f64,
    pub average_expense_per_day: f64,
    pub average_savings_per_day: f64,
    pub today: DayFigures,
    pub yesterday: DayFigures,
    /// Only set when both days have data and yesterday had expenses.
    pub expense_change: Option<f64>,
    /// Relative to `|yesterday's savings|`; `None` when those were zero.
    pub savings_change: Option<f64>,
    pub average_expense_last_week: f64,
    /// `yesterday's expense − average_expense_last_week`, `0` without history.
    pub expense_trend: f64,
    pub essential_focus: Vec<String>,
    pub desire_focus: Vec<String>,
    pub today_income_breakdown: Vec<CategoryShare>,
    pub today_expense_breakdown: Vec<CategoryShare>,
}

pub struct InsightService;

impl InsightService {
    pub fn dashboard(entries: &[Entry], today: NaiveDate) -> DashboardSnapshot {
        let overall = Totals::of(entries);
        let days_tracked = entries
            .iter()
            .map(|entry| entry.date)
            .collect::<HashSet<_>>()
            .len()
            .max(1);
        let divisor = days_tracked as f64;

        let yesterday_date = today - Duration::days(1);
        let today_figures = day_figures(entries, today);
        let yesterday_figures = day_figures(entries, yesterday_date);

        let both_days = today_figures.has_data() && yesterday_figures.has_data();
        let expense_change = if both_days {
            percent_change(today_figures.totals.expense, yesterday_figures.totals.expense)
        } else {
            None
        };
        let savings_change = if yesterday_figures.has_data() && yesterday_figures.totals.savings != 0.0
        {
            let previous = yesterday_figures.totals.savings;
            Some((today_figures.totals.savings - previous) / previous.abs() * 100.0)
        } else {
            None
        };

        let week_expense: f64 = (1..=TREND_WINDOW_DAYS)
            .map(|offset| day_figures(entries, today - Duration::days(offset)).totals.expense)
            .sum();
        let average_expense_last_week = week_expense / TREND_WINDOW_DAYS as f64;
        let expense_trend = if average_expense_last_week > 0.0 {
            yesterday_figures.totals.expense - average_expense_last_week
        } else {
            0.0
        };

        let expense_rows = SummaryService::by_category(entries)
            .into_iter()
            .filter(|row| row.kind == EntryKind::Expense && row.total > 0.0)
            .collect::<Vec<_>>();
        let essential_focus = ESSENTIAL_CATEGORIES
            .iter()
            .filter(|name| expense_rows.iter().any(|row| row.category == **name))
            .take(FOCUS_AREAS)
            .map(|name| name.to_string())
            .collect();
        let mut desires: Vec<&CategoryShare> = expense_rows
            .iter()
            .filter(|row| DESIRE_CATEGORIES.contains(&row.category.as_str()))
            .collect();
        desires.sort_by(|a, b| b.total.total_cmp(&a.total));
        let desire_focus = desires
            .into_iter()
            .take(FOCUS_AREAS)
            .map(|row| row.category.clone())
            .collect();

        let todays: Vec<Entry> = entries
            .iter()
            .filter(|entry| entry.date == today)
            .cloned()
            .collect();
        let (today_income_breakdown, today_expense_breakdown): (Vec<_>, Vec<_>) =
            SummaryService::by_category(&todays)
                .into_iter()
                .filter(|row| row.kind != EntryKind::Charge)
                .partition(|row| row.kind == EntryKind::Income);

        DashboardSnapshot {
            overall,
            days_tracked,
            average_income_per_day: overall.income / divisor,
            average_expense_per_day: overall.expense / divisor,
            average_savings_per_day: overall.savings / divisor,
            today: today_figures,
            yesterday: yesterday_figures,
            expense_change,
            savings_change,
            average_expense_last_week,
            expense_trend,
            essential_focus,
            desire_focus,
            today_income_breakdown,
            today_expense_breakdown,
        }
    }
}

fn day_figures(entries: &[Entry], date: NaiveDate) -> DayFigures {
    DayFigures {
        date,
        totals: Totals::of(entries.iter().filter(|entry| entry.date == date)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn on(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 8, d).unwrap()
    }

    fn entry(id: u64, d: u32, kind: EntryKind, amount: f64, category: &str) -> Entry {
        Entry::new(id, on(d), kind, amount, category)
    }

    #[test]
    fn empty_ledger_yields_quiet_dashboard() {
        let snapshot = InsightService::dashboard(&[], on(10));
        assert_eq!(snapshot.days_tracked, 1);
        assert_eq!(snapshot.average_expense_per_day, 0.0);
        assert_eq!(snapshot.expense_change, None);
        assert_eq!(snapshot.savings_change, None);
        assert_eq!(snapshot.expense_trend, 0.0);
        assert!(snapshot.essential_focus.is_empty());
    }

    #[test]
    fn compares_today_with_yesterday() {
        let entries = vec![
            entry(1, 9, EntryKind::Expense, 200.0, "Bills"),
            entry(2, 9, EntryKind::Income, 300.0, "Work"),
            entry(3, 10, EntryKind::Expense, 250.0, "Transportation"),
            entry(4, 10, EntryKind::Income, 50.0, "Gift"),
        ];
        let snapshot = InsightService::dashboard(&entries, on(10));
        assert_eq!(snapshot.days_tracked, 2);
        assert_eq!(snapshot.average_income_per_day, 175.0);
        assert_eq!(snapshot.expense_change, Some(25.0));
        // savings went from 100 to -200
        assert_eq!(snapshot.savings_change, Some(-300.0));
        assert_eq!(snapshot.today_expense_breakdown.len(), 1);
        assert_eq!(snapshot.today_income_breakdown[0].category, "Gift");
    }

    #[test]
    fn no_change_without_data_for_both_days() {
        let entries = vec![entry(1, 10, EntryKind::Expense, 40.0, "Bills")];
        let snapshot = InsightService::dashboard(&entries, on(10));
        assert!(snapshot.today.has_data());
        assert!(!snapshot.yesterday.has_data());
        assert_eq!(snapshot.expense_change, None);
    }

    #[test]
    fn weekly_trend_excludes_today() {
        let entries = vec![
            entry(1, 3, EntryKind::Expense, 70.0, "Bills"),
            entry(2, 9, EntryKind::Expense, 35.0, "Bills"),
            entry(3, 10, EntryKind::Expense, 500.0, "Bills"),
        ];
        let snapshot = InsightService::dashboard(&entries, on(10));
        assert_eq!(snapshot.average_expense_last_week, 15.0);
        assert_eq!(snapshot.expense_trend, 20.0);
    }

    #[test]
    fn focus_areas_follow_their_own_orderings() {
        let entries = vec![
            entry(1, 1, EntryKind::Expense, 10.0, "Health & Fitness"),
            entry(2, 1, EntryKind::Expense, 90.0, "Bills"),
            entry(3, 1, EntryKind::Expense, 5.0, "Transportation"),
            entry(4, 1, EntryKind::Expense, 20.0, "Entertainment"),
            entry(5, 1, EntryKind::Expense, 60.0, "Personal Wants"),
        ];
        let snapshot = InsightService::dashboard(&entries, on(10));
        assert_eq!(snapshot.essential_focus, vec!["Transportation", "Bills"]);
        assert_eq!(snapshot.desire_focus, vec!["Personal Wants", "Entertainment"]);
    }
}
