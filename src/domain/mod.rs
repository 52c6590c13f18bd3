//! Domain models: entries, per-owner ledgers, patients and tracker users.
//! No I/O; only data types and their invariants.

pub mod category;
pub mod common;
pub mod entry;
pub mod ledger;
pub mod patient;
pub mod user;

pub use common::{Displayable, Identifiable, SortOrder, TimeUnit};
pub use entry::{Entry, EntryKind, EntryPatch};
pub use ledger::{BalanceSnapshot, Ledger, OwnerStatus};
pub use patient::{ContactNumber, Patient, Roster};
pub use user::UserProfile;
