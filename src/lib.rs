#![doc(test(attr(deny(warnings))))]

//! Ledger Core keeps dated monetary entries per owner, settles payments against
//! outstanding charges, and rolls entries up into time-bucketed reports. It
//! backs both a personal expense tracker and a dental-clinic patient book.

pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod storage;
pub mod utils;

pub use errors::{LedgerError, Result};

/// Initializes global tracing. Safe to call more than once.
pub fn init() {
    utils::init_tracing();
}
