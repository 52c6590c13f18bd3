use tracing::debug;

use crate::domain::ledger::Ledger;
use crate::domain::patient::Roster;
use crate::errors::Result;
use crate::storage::{LedgerStore, RosterStore};

/// Runs each ledger mutation as load, mutate in memory, write back.
pub struct LedgerManager {
    store: Box<dyn LedgerStore>,
}

impl LedgerManager {
    pub fn new(store: Box<dyn LedgerStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn LedgerStore {
        self.store.as_ref()
    }

    pub fn load(&self, owner: &str) -> Result<Ledger> {
        self.store.load(owner)
    }

    /// Applies `mutate` to the owner's ledger. Nothing is written when it fails.
    pub fn update<T, F>(&self, owner: &str, mutate: F) -> Result<T>
    where
        F: FnOnce(&mut Ledger) -> Result<T>,
    {
        let mut ledger = self.store.load(owner)?;
        match mutate(&mut ledger) {
            Ok(value) => {
                self.store.save(owner, &ledger)?;
                Ok(value)
            }
            Err(err) => {
                debug!(owner, error = %err, "mutation failed, ledger left untouched");
                Err(err)
            }
        }
    }
}

/// Same load, mutate, write cycle over the whole clinic roster.
pub struct RosterManager {
    store: Box<dyn RosterStore>,
}

impl RosterManager {
    pub fn new(store: Box<dyn RosterStore>) -> Self {
        Self { store }
    }

    pub fn load(&self) -> Result<Roster> {
        self.store.load_roster()
    }

    pub fn update<T, F>(&self, mutate: F) -> Result<T>
    where
        F: FnOnce(&mut Roster) -> Result<T>,
    {
        let mut roster = self.store.load_roster()?;
        match mutate(&mut roster) {
            Ok(value) => {
                self.store.save_roster(&roster)?;
                Ok(value)
            }
            Err(err) => {
                debug!(error = %err, "mutation failed, roster left untouched");
                Err(err)
            }
        }
    }
}
