//! Services and coordination built on top of the domain types.

pub mod ledger_manager;
pub mod services;
pub mod time;

pub use ledger_manager::{LedgerManager, RosterManager};
pub use time::{Clock, FixedClock, SystemClock};
