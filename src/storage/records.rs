//! On-disk record shapes and their conversion to domain types.
//!
//! Every field that older documents may lack carries an explicit default, so
//! a partially written or hand-edited file still loads.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::domain::entry::{Entry, EntryKind};
use crate::domain::ledger::{Ledger, OwnerStatus};
use crate::domain::patient::{ContactNumber, Patient};
use crate::domain::user::UserProfile;
use crate::errors::{LedgerError, Result};
use crate::utils::dates::{parse_lenient_date, DATE_FORMAT};

const NO_DESCRIPTION: &str = "N/A";
const BALANCE_TOLERANCE: f64 = 1e-6;

/// The whole tracker document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TrackerDocument {
    #[serde(default)]
    pub users: BTreeMap<String, UserRecord>,
    #[serde(default)]
    pub transactions: BTreeMap<String, Vec<TransactionRecord>>,
    #[serde(default)]
    pub sequences: BTreeMap<String, u64>,
}

impl TrackerDocument {
    pub fn has_owner(&self, owner: &str) -> bool {
        self.users.contains_key(owner) || self.transactions.contains_key(owner)
    }

    pub fn ledger_for(&self, owner: &str) -> Result<Ledger> {
        let records = self.transactions.get(owner).cloned().unwrap_or_default();
        let entries = entries_from_records(owner, records)?;
        Ok(Ledger::from_entries(entries, self.sequences.get(owner).copied()))
    }

    pub fn store_ledger(&mut self, owner: &str, ledger: &Ledger) {
        let records = ledger
            .entries
            .iter()
            .map(TransactionRecord::from_entry)
            .collect();
        self.transactions.insert(owner.to_string(), records);
        self.sequences
            .insert(owner.to_string(), ledger.next_entry_id());
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserRecord {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl UserRecord {
    pub fn from_profile(profile: &UserProfile) -> Self {
        Self {
            email: profile.email.clone(),
            created_at: profile.created_at,
        }
    }

    pub fn into_profile(self, username: &str) -> UserProfile {
        UserProfile {
            username: username.to_string(),
            email: self.email,
            created_at: self.created_at,
        }
    }
}

/// One tracker transaction as stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionRecord {
    #[serde(default)]
    pub id: Option<u64>,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub amount: f64,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl TransactionRecord {
    pub fn from_entry(entry: &Entry) -> Self {
        Self {
            id: Some(entry.id),
            date: entry.date,
            kind: entry.kind,
            amount: entry.amount,
            category: entry.category.clone(),
            description: Some(
                entry
                    .description
                    .clone()
                    .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            ),
            timestamp: entry.recorded_at.map(|stamp| stamp.to_rfc3339()),
        }
    }

    fn into_entry(self, id: u64) -> Entry {
        let mut entry = Entry::new(id, self.date, self.kind, self.amount, self.category);
        entry.description = self
            .description
            .filter(|text| !text.trim().is_empty() && text != NO_DESCRIPTION);
        entry.recorded_at = self.timestamp.as_deref().and_then(parse_timestamp);
        entry
    }
}

/// Missing, repeated or out-of-range ids are reassigned after the largest
/// valid one, in list order. `u64::MAX` is never kept: it leaves no room for
/// a successor.
fn entries_from_records(owner: &str, records: Vec<TransactionRecord>) -> Result<Vec<Entry>> {
    let usable = |id: u64| id > 0 && id < u64::MAX;
    let mut seen = HashSet::new();
    let mut next = records
        .iter()
        .filter_map(|record| record.id)
        .filter(|id| usable(*id))
        .max()
        .unwrap_or(0)
        .checked_add(1);
    records
        .into_iter()
        .map(|record| {
            let id = match record.id {
                Some(id) if usable(id) && seen.insert(id) => id,
                stored => {
                    let fresh = next.ok_or_else(|| {
                        LedgerError::Storage(format!("no entry ids left for `{owner}`"))
                    })?;
                    next = fresh.checked_add(1);
                    seen.insert(fresh);
                    if stored.is_some() {
                        warn!(owner, stored = ?stored, fresh, "unusable entry id reassigned");
                    }
                    fresh
                }
            };
            Ok(record.into_entry(id))
        })
        .collect()
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|stamp| stamp.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

/// One clinic patient as stored in the active or archived document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub bday: String,
    pub contact: ContactNumber,
    #[serde(default)]
    pub balance: f64,
    #[serde(default)]
    pub schedule: String,
    #[serde(default)]
    pub schedule_status: bool,
    #[serde(default)]
    pub procedure: Vec<ProcedureRecord>,
    #[serde(default = "default_status")]
    pub status: OwnerStatus,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub next_procedure_id: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcedureRecord {
    #[serde(default)]
    pub id: Option<u64>,
    pub name: String,
    pub amount: f64,
    pub date: NaiveDate,
    #[serde(default)]
    pub paid: f64,
}

fn default_status() -> OwnerStatus {
    OwnerStatus::Paid
}

fn default_active() -> bool {
    true
}

impl PatientRecord {
    /// Stored balance and status are derived values; they are written for
    /// readers of the file and recomputed here.
    pub fn into_patient(self) -> Result<Patient> {
        let owner = self.id.to_string();
        let paid: Vec<f64> = self.procedure.iter().map(|procedure| procedure.paid).collect();
        let charges = self
            .procedure
            .into_iter()
            .map(|procedure| TransactionRecord {
                id: procedure.id,
                date: procedure.date,
                kind: EntryKind::Charge,
                amount: procedure.amount,
                category: procedure.name,
                description: None,
                timestamp: None,
            })
            .collect();
        let mut entries = entries_from_records(&owner, charges)?;
        for (entry, paid) in entries.iter_mut().zip(paid) {
            entry.paid = paid.clamp(0.0, entry.amount.max(0.0));
        }
        let ledger = Ledger::from_entries(entries, self.next_procedure_id);

        let snapshot = ledger.snapshot();
        if (snapshot.balance - self.balance).abs() > BALANCE_TOLERANCE
            || snapshot.status != self.status
        {
            warn!(
                patient = %owner,
                stored = self.balance,
                computed = snapshot.balance,
                "stored balance disagrees with procedures, using computed value"
            );
        }

        Ok(Patient {
            id: self.id,
            first_name: self.first_name,
            last_name: self.last_name,
            birthday: parse_lenient_date(&self.bday),
            contact: self.contact,
            schedule: parse_lenient_date(&self.schedule),
            visit_done: self.schedule_status,
            is_active: self.is_active,
            last_updated: self.last_updated.as_deref().and_then(parse_lenient_date),
            ledger,
        })
    }

    pub fn from_patient(patient: &Patient) -> Self {
        let snapshot = patient.ledger.snapshot();
        Self {
            id: patient.id,
            first_name: patient.first_name.clone(),
            last_name: patient.last_name.clone(),
            bday: format_optional_date(patient.birthday),
            contact: patient.contact.clone(),
            balance: snapshot.balance,
            schedule: format_optional_date(patient.schedule),
            schedule_status: patient.visit_done,
            procedure: patient
                .ledger
                .entries
                .iter()
                .filter(|entry| entry.kind == EntryKind::Charge)
                .map(|entry| ProcedureRecord {
                    id: Some(entry.id),
                    name: entry.category.clone(),
                    amount: entry.amount,
                    date: entry.date,
                    paid: entry.paid,
                })
                .collect(),
            status: snapshot.status,
            is_active: patient.is_active,
            last_updated: patient
                .last_updated
                .map(|date| date.format(DATE_FORMAT).to_string()),
            next_procedure_id: Some(patient.ledger.next_entry_id()),
        }
    }
}

fn format_optional_date(date: Option<NaiveDate>) -> String {
    date.map(|date| date.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}
