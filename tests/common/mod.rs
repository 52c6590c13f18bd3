#![allow(dead_code)]

use chrono::NaiveDate;
use ledger_core::{
    core::{LedgerManager, RosterManager},
    domain::UserProfile,
    storage::{JsonClinicStore, JsonTrackerStore},
};
use tempfile::TempDir;

/// Managers backed by a private data root. Keep the `TempDir` alive for the test.
pub struct TestEnv {
    pub dir: TempDir,
    pub tracker: JsonTrackerStore,
    pub clinic: JsonClinicStore,
}

impl TestEnv {
    pub fn ledgers(&self) -> LedgerManager {
        LedgerManager::new(Box::new(self.tracker.clone()))
    }

    pub fn roster(&self) -> RosterManager {
        RosterManager::new(Box::new(self.clinic.clone()))
    }
}

pub fn setup_test_env() -> TestEnv {
    let dir = TempDir::new().expect("create temp dir");
    let tracker = JsonTrackerStore::in_dir(dir.path());
    let clinic = JsonClinicStore::in_dir(dir.path());
    TestEnv {
        dir,
        tracker,
        clinic,
    }
}

pub fn register(env: &TestEnv, username: &str) {
    let profile = UserProfile::new(username, None).expect("valid profile");
    env.tracker.register(&profile).expect("register user");
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}
