pub mod json_backend;
pub mod records;

use crate::domain::ledger::Ledger;
use crate::domain::patient::Roster;
use crate::errors::Result;

/// Persistence collaborator for per-owner ledgers.
pub trait LedgerStore {
    fn load(&self, owner: &str) -> Result<Ledger>;
    fn save(&self, owner: &str, ledger: &Ledger) -> Result<()>;
    fn owners(&self) -> Result<Vec<String>>;
}

/// Persistence for the clinic's active and archived patients as a whole.
pub trait RosterStore {
    fn load_roster(&self) -> Result<Roster>;
    fn save_roster(&self, roster: &Roster) -> Result<()>;
}

pub use json_backend::{JsonClinicStore, JsonTrackerStore};
