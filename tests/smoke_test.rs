mod common;

use common::{date, register, setup_test_env};
use ledger_core::{
    core::services::{EntryService, NewEntry},
    domain::EntryKind,
    init,
};

#[test]
fn tracker_round_trip_smoke() {
    init();

    let env = setup_test_env();
    register(&env, "ana");
    let manager = env.ledgers();
    manager
        .update("ana", |ledger| {
            EntryService::add(
                ledger,
                NewEntry::new(date(2025, 1, 1), EntryKind::Income, 42.0, "Work"),
            )
        })
        .unwrap();

    let ledger = manager.load("ana").unwrap();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger.net_savings(), 42.0);
}
