use dirs::home_dir;
use std::{env, path::Path, path::PathBuf};

const DEFAULT_DIR_NAME: &str = ".ledger_core";
const HOME_ENV: &str = "LEDGER_CORE_HOME";
const CONFIG_FILE: &str = "config.json";
const TRACKER_FILE: &str = "tracker.json";
const ACTIVE_PATIENTS_FILE: &str = "active_patients.json";
const ARCHIVED_PATIENTS_FILE: &str = "archived_patients.json";

/// Returns the application data directory, defaulting to `~/.ledger_core`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

pub fn config_file_in(base: &Path) -> PathBuf {
    base.join(CONFIG_FILE)
}

/// Single document holding every tracker user and their transactions.
pub fn tracker_file_in(base: &Path) -> PathBuf {
    base.join(TRACKER_FILE)
}

pub fn active_patients_file_in(base: &Path) -> PathBuf {
    base.join(ACTIVE_PATIENTS_FILE)
}

pub fn archived_patients_file_in(base: &Path) -> PathBuf {
    base.join(ARCHIVED_PATIENTS_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_resolve_inside_base() {
        let base = PathBuf::from("/tmp/ledger-root");
        assert_eq!(tracker_file_in(&base), base.join("tracker.json"));
        assert_eq!(
            archived_patients_file_in(&base),
            base.join("archived_patients.json")
        );
    }
}
