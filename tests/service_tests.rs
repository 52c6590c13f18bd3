mod common;

use common::date;
use ledger_core::{
    core::services::{
        bucket_key, percent_change, percentage, AggregationService, BucketQuery, EntryFilter,
        EntryService, NewEntry, SettlementService, SummaryService,
    },
    domain::{Entry, EntryKind, Ledger, OwnerStatus, SortOrder, TimeUnit},
    errors::LedgerError,
};

fn charges(amounts: &[f64]) -> Ledger {
    let mut ledger = Ledger::new();
    for (offset, amount) in amounts.iter().enumerate() {
        EntryService::add(
            &mut ledger,
            NewEntry::new(
                date(2024, 1, 1 + offset as u32),
                EntryKind::Charge,
                *amount,
                "Procedure",
            ),
        )
        .unwrap();
    }
    ledger
}

fn total_paid(ledger: &Ledger) -> f64 {
    ledger.entries.iter().map(|entry| entry.paid).sum()
}

#[test]
fn settlement_is_first_come_first_served() {
    let mut ledger = charges(&[100.0, 50.0]);
    let report = SettlementService::settle(&mut ledger, 120.0).unwrap();
    assert_eq!(ledger.entries[0].paid, 100.0);
    assert_eq!(ledger.entries[1].paid, 20.0);
    assert_eq!(report.balance, 30.0);
    assert_eq!(report.status, OwnerStatus::Unpaid);
}

#[test]
fn settlement_conserves_the_payment_and_balance_identity() {
    let mut ledger = charges(&[40.0, 25.5, 10.0, 80.0]);
    for payment in [10.0, 35.5, 0.0, 50.0] {
        let before = total_paid(&ledger);
        let report = SettlementService::settle(&mut ledger, payment).unwrap();
        let after = total_paid(&ledger);
        assert!((after - before - payment).abs() < 1e-9);

        let charged: f64 = ledger.entries.iter().map(|entry| entry.amount).sum();
        assert!((report.balance - (charged - after)).abs() < 1e-9);
        assert!(ledger
            .entries
            .iter()
            .all(|entry| entry.paid >= 0.0 && entry.paid <= entry.amount));
    }
    let remaining = ledger.total_outstanding();
    let report = SettlementService::settle(&mut ledger, remaining).unwrap();
    assert_eq!(report.balance, 0.0);
    assert_eq!(report.status, OwnerStatus::Paid);
}

#[test]
fn settled_ledgers_accept_only_a_zero_payment() {
    let mut ledger = charges(&[30.0]);
    SettlementService::settle(&mut ledger, 30.0).unwrap();

    let noop = SettlementService::settle(&mut ledger, 0.0).unwrap();
    assert!(noop.already_settled);
    assert!(noop.allocations.is_empty());
    assert!(matches!(
        SettlementService::settle(&mut ledger, 5.0),
        Err(LedgerError::InvalidPayment { .. })
    ));

    let mut empty = Ledger::new();
    assert!(SettlementService::settle(&mut empty, 0.0).unwrap().already_settled);
}

#[test]
fn invalid_payments_leave_the_ledger_untouched() {
    let mut ledger = charges(&[60.0]);
    for payment in [-1.0, f64::NAN, f64::INFINITY, 60.5] {
        assert!(matches!(
            SettlementService::settle(&mut ledger, payment),
            Err(LedgerError::InvalidPayment { .. })
        ));
    }
    assert_eq!(total_paid(&ledger), 0.0);
}

#[test]
fn balance_queries_are_stable_without_mutation() {
    let mut ledger = charges(&[15.0, 15.0]);
    SettlementService::settle(&mut ledger, 20.0).unwrap();
    let first = ledger.snapshot();
    let second = ledger.snapshot();
    assert_eq!(first, second);
    assert_eq!(ledger.balance(), 10.0);
}

#[test]
fn percentage_helpers_handle_zero_divisors() {
    for value in [0.0, 1.0, -3.5, 1e9] {
        assert_eq!(percentage(value, 0.0), 0.0);
        assert_eq!(percent_change(value, 0.0), None);
    }
    assert_eq!(percent_change(250.0, 200.0), Some(25.0));
}

#[test]
fn month_bucketing_groups_january_and_february() {
    assert_eq!(bucket_key(date(2024, 1, 5), TimeUnit::Month), "2024-01");
    assert_eq!(bucket_key(date(2024, 1, 28), TimeUnit::Month), "2024-01");
    assert_eq!(bucket_key(date(2024, 2, 1), TimeUnit::Month), "2024-02");
}

#[test]
fn yearly_report_in_descending_order() {
    let entries = vec![
        Entry::new(1, date(2022, 6, 1), EntryKind::Income, 100.0, "Work"),
        Entry::new(2, date(2023, 6, 1), EntryKind::Income, 150.0, "Work"),
        Entry::new(3, date(2023, 7, 1), EntryKind::Expense, 50.0, "Bills"),
    ];
    let report = AggregationService::bucketize(
        &entries,
        BucketQuery::new(TimeUnit::Year).order(SortOrder::Descending),
        date(2024, 1, 1),
    );
    let keys: Vec<_> = report.buckets.iter().map(|b| b.key.clone()).collect();
    assert_eq!(keys, vec!["2023".to_string(), "2022".to_string()]);
    assert_eq!(report.buckets[0].savings, 100.0);
    assert!((report.buckets[0].income_share - 60.0).abs() < 1e-9);
    let change = report.buckets[1].income_change.unwrap();
    assert!((change + 100.0 / 3.0).abs() < 1e-9);
}

#[test]
fn category_summary_and_filters_agree() {
    let entries = vec![
        Entry::new(1, date(2024, 3, 1), EntryKind::Expense, 25.0, "Transportation"),
        Entry::new(2, date(2024, 3, 1), EntryKind::Expense, 75.0, "Bills"),
        Entry::new(3, date(2024, 3, 2), EntryKind::Income, 300.0, "Allowance"),
    ];
    let rows = SummaryService::by_category(&entries);
    let transport = rows
        .iter()
        .find(|row| row.category == "Transportation")
        .unwrap();
    assert_eq!(transport.share, 25.0);

    let expenses = SummaryService::filter(&entries, EntryFilter::Kind(EntryKind::Expense));
    assert_eq!(expenses.totals.expense, 100.0);
    assert_eq!(expenses.totals.income, 0.0);
}
