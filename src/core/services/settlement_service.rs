//! First-come-first-served allocation of payments across outstanding charges.

use tracing::{debug, info};

use crate::domain::ledger::{Ledger, OwnerStatus};
use crate::errors::{LedgerError, Result};

/// Slack allowed when comparing a payment against the outstanding total.
const PAYMENT_TOLERANCE: f64 = 1e-9;

/// Portion of a payment credited to one entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Allocation {
    pub entry_id: u64,
    pub applied: f64,
    /// Amount still owed on the entry after this payment.
    pub remaining: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SettlementReport {
    pub payment: f64,
    pub allocations: Vec<Allocation>,
    pub balance: f64,
    pub status: OwnerStatus,
    /// The ledger owed nothing before the payment was applied.
    pub already_settled: bool,
}

impl SettlementReport {
    pub fn applied(&self) -> f64 {
        self.allocations.iter().map(|alloc| alloc.applied).sum()
    }

    pub fn fully_settled(&self) -> bool {
        self.status == OwnerStatus::Paid
    }
}

pub struct SettlementService;

impl SettlementService {
    /// Rejects payments that are negative, non-finite, or larger than what is owed.
    pub fn validate_payment(ledger: &Ledger, payment: f64) -> Result<f64> {
        let outstanding = ledger.total_outstanding();
        if !payment.is_finite() || payment < 0.0 || payment > outstanding + PAYMENT_TOLERANCE {
            return Err(LedgerError::InvalidPayment {
                payment,
                outstanding,
            });
        }
        Ok(outstanding)
    }

    /// Applies `payment` to settleable entries in insertion order.
    ///
    /// Each entry is paid off in full before the next one receives anything;
    /// the first entry that cannot be covered absorbs the remainder and
    /// allocation stops there.
    pub fn settle(ledger: &mut Ledger, payment: f64) -> Result<SettlementReport> {
        let outstanding = Self::validate_payment(ledger, payment)?;
        if outstanding <= 0.0 {
            debug!("settlement skipped: nothing outstanding");
            return Ok(Self::report(ledger, payment, Vec::new(), true));
        }

        let mut remaining = payment;
        let mut allocations = Vec::new();
        for entry in ledger
            .entries
            .iter_mut()
            .filter(|entry| entry.kind.is_settleable())
        {
            if remaining <= 0.0 {
                break;
            }
            let unpaid = entry.amount - entry.paid;
            if unpaid <= 0.0 {
                continue;
            }
            if remaining >= unpaid || unpaid - remaining <= PAYMENT_TOLERANCE {
                entry.paid = entry.amount;
                remaining = (remaining - unpaid).max(0.0);
                allocations.push(Allocation {
                    entry_id: entry.id,
                    applied: unpaid,
                    remaining: 0.0,
                });
            } else {
                entry.paid += remaining;
                allocations.push(Allocation {
                    entry_id: entry.id,
                    applied: remaining,
                    remaining: unpaid - remaining,
                });
                break;
            }
        }

        let report = Self::report(ledger, payment, allocations, false);
        info!(
            payment,
            entries = report.allocations.len(),
            balance = report.balance,
            status = %report.status,
            "payment settled"
        );
        Ok(report)
    }

    fn report(
        ledger: &Ledger,
        payment: f64,
        allocations: Vec<Allocation>,
        already_settled: bool,
    ) -> SettlementReport {
        let snapshot = ledger.snapshot();
        SettlementReport {
            payment,
            allocations,
            balance: snapshot.balance,
            status: snapshot.status,
            already_settled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entry::{Entry, EntryKind};
    use chrono::NaiveDate;

    fn ledger_with(charges: &[(f64, f64)]) -> Ledger {
        let mut ledger = Ledger::new();
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        for (amount, paid) in charges {
            let id = ledger.allocate_id().unwrap();
            let mut entry = Entry::new(id, date, EntryKind::Charge, *amount, "Extraction");
            entry.paid = *paid;
            ledger.push(entry);
        }
        ledger
    }

    fn paid(ledger: &Ledger) -> Vec<f64> {
        ledger.entries.iter().map(|entry| entry.paid).collect()
    }

    #[test]
    fn earlier_charges_are_paid_first() {
        let mut ledger = ledger_with(&[(100.0, 0.0), (50.0, 0.0)]);
        let report = SettlementService::settle(&mut ledger, 120.0).unwrap();
        assert_eq!(paid(&ledger), vec![100.0, 20.0]);
        assert_eq!(report.balance, 30.0);
        assert_eq!(report.status, OwnerStatus::Unpaid);
        assert_eq!(report.allocations.len(), 2);
        assert_eq!(report.applied(), 120.0);
    }

    #[test]
    fn partially_paid_entries_receive_only_their_remainder() {
        let mut ledger = ledger_with(&[(100.0, 70.0), (40.0, 0.0), (10.0, 0.0)]);
        SettlementService::settle(&mut ledger, 50.0).unwrap();
        assert_eq!(paid(&ledger), vec![100.0, 20.0, 0.0]);
    }

    #[test]
    fn entries_after_the_partial_one_get_nothing() {
        let mut ledger = ledger_with(&[(30.0, 0.0), (30.0, 0.0), (30.0, 0.0)]);
        let report = SettlementService::settle(&mut ledger, 15.0).unwrap();
        assert_eq!(paid(&ledger), vec![15.0, 0.0, 0.0]);
        assert_eq!(report.allocations[0].remaining, 15.0);
    }

    #[test]
    fn full_settlement_leaves_exact_zero() {
        let mut ledger = ledger_with(&[(0.1, 0.0), (0.2, 0.0)]);
        let report = SettlementService::settle(&mut ledger, 0.1 + 0.2).unwrap();
        assert_eq!(report.balance, 0.0);
        assert!(report.fully_settled());
        assert_eq!(paid(&ledger), vec![0.1, 0.2]);
    }

    #[test]
    fn zero_payment_on_settled_ledger_is_a_noop() {
        let mut ledger = ledger_with(&[(25.0, 25.0)]);
        let before = ledger.clone();
        let report = SettlementService::settle(&mut ledger, 0.0).unwrap();
        assert!(report.already_settled);
        assert!(report.allocations.is_empty());
        assert_eq!(ledger, before);
    }

    #[test]
    fn empty_ledger_accepts_only_zero() {
        let mut ledger = Ledger::new();
        assert!(SettlementService::settle(&mut ledger, 0.0).unwrap().already_settled);
        assert!(matches!(
            SettlementService::settle(&mut ledger, 1.0),
            Err(LedgerError::InvalidPayment { .. })
        ));
    }

    #[test]
    fn out_of_range_payments_are_rejected_without_mutation() {
        let mut ledger = ledger_with(&[(40.0, 0.0)]);
        for payment in [-1.0, 40.5, f64::NAN, f64::INFINITY] {
            let err = SettlementService::settle(&mut ledger, payment).unwrap_err();
            assert!(matches!(err, LedgerError::InvalidPayment { .. }), "{payment}: {err:?}");
        }
        assert_eq!(paid(&ledger), vec![0.0]);
    }

    #[test]
    fn tracker_entries_are_ignored() {
        let mut ledger = ledger_with(&[(60.0, 0.0)]);
        let id = ledger.allocate_id().unwrap();
        ledger.push(Entry::new(
            id,
            NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
            EntryKind::Expense,
            500.0,
            "Bills",
        ));
        assert!(SettlementService::settle(&mut ledger, 100.0).is_err());
        let report = SettlementService::settle(&mut ledger, 60.0).unwrap();
        assert_eq!(report.balance, 0.0);
        assert_eq!(ledger.entries[1].paid, 0.0);
    }
}
