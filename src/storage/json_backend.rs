use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::ledger::Ledger;
use crate::domain::patient::{Patient, Roster};
use crate::domain::user::UserProfile;
use crate::errors::{LedgerError, Result};
use crate::storage::records::{PatientRecord, TrackerDocument, UserRecord};
use crate::storage::{LedgerStore, RosterStore};
use crate::utils::paths::{active_patients_file_in, archived_patients_file_in, tracker_file_in};

const TMP_SUFFIX: &str = "tmp";

/// Tracker users and their transactions, kept in a single JSON document.
#[derive(Debug, Clone)]
pub struct JsonTrackerStore {
    path: PathBuf,
}

impl JsonTrackerStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store rooted at `base/tracker.json`.
    pub fn in_dir(base: &Path) -> Self {
        Self::new(tracker_file_in(base))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load_document(&self) -> Result<TrackerDocument> {
        Ok(read_json(&self.path)?.unwrap_or_default())
    }

    pub fn save_document(&self, document: &TrackerDocument) -> Result<()> {
        write_json(&self.path, document)
    }

    /// Adds a new user with an empty transaction list.
    pub fn register(&self, profile: &UserProfile) -> Result<()> {
        let mut document = self.load_document()?;
        if document.has_owner(&profile.username) {
            return Err(LedgerError::InvalidInput(format!(
                "username `{}` is already taken",
                profile.username
            )));
        }
        document
            .users
            .insert(profile.username.clone(), UserRecord::from_profile(profile));
        document
            .transactions
            .insert(profile.username.clone(), Vec::new());
        self.save_document(&document)?;
        info!(user = %profile.username, "user registered");
        Ok(())
    }

    pub fn user(&self, username: &str) -> Result<UserProfile> {
        let document = self.load_document()?;
        document
            .users
            .get(username)
            .cloned()
            .map(|record| record.into_profile(username))
            .ok_or_else(|| LedgerError::OwnerNotFound(username.to_string()))
    }

    pub fn users(&self) -> Result<Vec<UserProfile>> {
        let document = self.load_document()?;
        Ok(document
            .users
            .into_iter()
            .map(|(name, record)| record.into_profile(&name))
            .collect())
    }
}

impl LedgerStore for JsonTrackerStore {
    fn load(&self, owner: &str) -> Result<Ledger> {
        let document = self.load_document()?;
        if !document.has_owner(owner) {
            return Err(LedgerError::OwnerNotFound(owner.to_string()));
        }
        let ledger = document.ledger_for(owner)?;
        debug!(owner, entries = ledger.len(), "tracker ledger loaded");
        Ok(ledger)
    }

    fn save(&self, owner: &str, ledger: &Ledger) -> Result<()> {
        let mut document = self.load_document()?;
        if !document.has_owner(owner) {
            return Err(LedgerError::OwnerNotFound(owner.to_string()));
        }
        document.store_ledger(owner, ledger);
        self.save_document(&document)?;
        info!(owner, entries = ledger.len(), "tracker ledger saved");
        Ok(())
    }

    fn owners(&self) -> Result<Vec<String>> {
        let document = self.load_document()?;
        Ok(document.users.into_keys().collect())
    }
}

/// Clinic patients split across an active and an archived document.
#[derive(Debug, Clone)]
pub struct JsonClinicStore {
    active_path: PathBuf,
    archived_path: PathBuf,
}

impl JsonClinicStore {
    pub fn new(active_path: PathBuf, archived_path: PathBuf) -> Self {
        Self {
            active_path,
            archived_path,
        }
    }

    pub fn in_dir(base: &Path) -> Self {
        Self::new(active_patients_file_in(base), archived_patients_file_in(base))
    }

    pub fn active_path(&self) -> &Path {
        &self.active_path
    }

    pub fn archived_path(&self) -> &Path {
        &self.archived_path
    }

    fn parse_owner(owner: &str) -> Result<Uuid> {
        Uuid::parse_str(owner.trim()).map_err(|_| LedgerError::OwnerNotFound(owner.to_string()))
    }
}

impl RosterStore for JsonClinicStore {
    fn load_roster(&self) -> Result<Roster> {
        let active = load_patients(&self.active_path)?;
        let archived = load_patients(&self.archived_path)?;
        debug!(
            active = active.len(),
            archived = archived.len(),
            "roster loaded"
        );
        Ok(Roster::new(active, archived))
    }

    fn save_roster(&self, roster: &Roster) -> Result<()> {
        save_patients(&self.active_path, &roster.active)?;
        save_patients(&self.archived_path, &roster.archived)?;
        info!(
            active = roster.active.len(),
            archived = roster.archived.len(),
            "roster saved"
        );
        Ok(())
    }
}

impl LedgerStore for JsonClinicStore {
    /// `owner` is the patient id.
    fn load(&self, owner: &str) -> Result<Ledger> {
        let id = Self::parse_owner(owner)?;
        let roster = self.load_roster()?;
        roster
            .get(id)
            .map(|patient| patient.ledger.clone())
            .ok_or_else(|| LedgerError::OwnerNotFound(owner.to_string()))
    }

    fn save(&self, owner: &str, ledger: &Ledger) -> Result<()> {
        let id = Self::parse_owner(owner)?;
        let mut roster = self.load_roster()?;
        let patient = roster
            .active
            .iter_mut()
            .chain(roster.archived.iter_mut())
            .find(|patient| patient.id == id)
            .ok_or_else(|| LedgerError::OwnerNotFound(owner.to_string()))?;
        patient.ledger = ledger.clone();
        self.save_roster(&roster)
    }

    fn owners(&self) -> Result<Vec<String>> {
        let roster = self.load_roster()?;
        Ok(roster
            .active
            .iter()
            .map(|patient| patient.id.to_string())
            .collect())
    }
}

fn load_patients(path: &Path) -> Result<Vec<Patient>> {
    let records: Vec<PatientRecord> = read_json(path)?.unwrap_or_default();
    records.into_iter().map(PatientRecord::into_patient).collect()
}

fn save_patients(path: &Path, patients: &[Patient]) -> Result<()> {
    let records: Vec<PatientRecord> = patients.iter().map(PatientRecord::from_patient).collect();
    write_json(path, &records)
}

/// `Ok(None)` when the file does not exist yet.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        debug!(path = %path.display(), "no document on disk");
        return Ok(None);
    }
    let data = fs::read_to_string(path)?;
    if data.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(&data).map(Some).map_err(|err| {
        LedgerError::Storage(format!("{} is not valid: {err}", path.display()))
    })
}

pub(crate) fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    let tmp = tmp_path(path);
    write_atomic(&tmp, &json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
