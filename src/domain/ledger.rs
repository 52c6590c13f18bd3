//! Per-owner entry sequence and the balances derived from it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::entry::{Entry, EntryKind};
use crate::errors::{LedgerError, Result};

/// Derived payment status of an owner.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OwnerStatus {
    Paid,
    Unpaid,
}

impl OwnerStatus {
    pub fn from_balance(balance: f64) -> Self {
        if balance <= 0.0 {
            OwnerStatus::Paid
        } else {
            OwnerStatus::Unpaid
        }
    }
}

impl fmt::Display for OwnerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OwnerStatus::Paid => f.write_str("paid"),
            OwnerStatus::Unpaid => f.write_str("unpaid"),
        }
    }
}

/// Balance figures recomputed from a ledger in one pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalanceSnapshot {
    pub total_charged: f64,
    pub total_paid: f64,
    pub balance: f64,
    pub status: OwnerStatus,
}

/// Ordered entries belonging to one owner. Insertion order is creation order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Ledger {
    #[serde(default)]
    pub entries: Vec<Entry>,
    #[serde(default = "Ledger::first_id")]
    next_entry_id: u64,
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_entry_id: Self::first_id(),
        }
    }

    /// Rebuilds a ledger from persisted entries. The counter never goes below
    /// `max(id) + 1`, so a stale stored counter cannot hand out a used id.
    pub fn from_entries(entries: Vec<Entry>, stored_next_id: Option<u64>) -> Self {
        let after_max = entries
            .iter()
            .map(|entry| entry.id)
            .max()
            .unwrap_or(0)
            .saturating_add(1);
        let next_entry_id = stored_next_id.unwrap_or(0).max(after_max);
        Self {
            entries,
            next_entry_id,
        }
    }

    fn first_id() -> u64 {
        1
    }

    pub fn next_entry_id(&self) -> u64 {
        self.next_entry_id
    }

    /// Reserves the next identifier from the sequence. Fails once the
    /// sequence reaches `u64::MAX`.
    pub fn allocate_id(&mut self) -> Result<u64> {
        let id = self.next_entry_id;
        self.next_entry_id = id
            .checked_add(1)
            .ok_or_else(|| LedgerError::InvalidInput("entry id sequence is exhausted".into()))?;
        Ok(id)
    }

    pub fn push(&mut self, entry: Entry) -> u64 {
        let id = entry.id;
        if id >= self.next_entry_id {
            self.next_entry_id = id.saturating_add(1);
        }
        self.entries.push(entry);
        id
    }

    pub fn entry(&self, id: u64) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn entry_mut(&mut self, id: u64) -> Option<&mut Entry> {
        self.entries.iter_mut().find(|entry| entry.id == id)
    }

    pub fn remove(&mut self, id: u64) -> Option<Entry> {
        let index = self.entries.iter().position(|entry| entry.id == id)?;
        Some(self.entries.remove(index))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_of(&self, kind: EntryKind) -> f64 {
        self.entries
            .iter()
            .filter(|entry| entry.kind == kind)
            .map(|entry| entry.amount)
            .sum()
    }

    /// `Σ max(amount − paid, 0)` over settleable entries.
    pub fn total_outstanding(&self) -> f64 {
        self.entries.iter().map(Entry::outstanding).sum()
    }

    /// `Σamount − Σpaid` over settleable entries, clamped to `0` once covered.
    pub fn balance(&self) -> f64 {
        self.snapshot().balance
    }

    pub fn status(&self) -> OwnerStatus {
        self.snapshot().status
    }

    pub fn snapshot(&self) -> BalanceSnapshot {
        let (total_charged, total_paid) = self
            .entries
            .iter()
            .filter(|entry| entry.kind.is_settleable())
            .fold((0.0, 0.0), |(charged, paid), entry| {
                (charged + entry.amount, paid + entry.paid)
            });
        let raw = total_charged - total_paid;
        let balance = if raw <= 0.0 { 0.0 } else { raw };
        BalanceSnapshot {
            total_charged,
            total_paid,
            balance,
            status: OwnerStatus::from_balance(balance),
        }
    }

    /// Income minus expenses for tracker ledgers.
    pub fn net_savings(&self) -> f64 {
        self.total_of(EntryKind::Income) - self.total_of(EntryKind::Expense)
    }
}
