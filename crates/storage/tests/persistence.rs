use eureka_ledger::{GenesisConfig, Ledger, LedgerConfig, LedgerError};
use eureka_storage::{load_ledger, save_ledger, SledStorage, Storage, StorageError};
use eureka_types::{eka, Address};
use tempfile::TempDir;

fn config() -> LedgerConfig {
    LedgerConfig {
        genesis: GenesisConfig::default()
            .with_account(Address::from_label("alice"), eka(3_000))
            .with_account(Address::from_label("bob"), eka(10)),
        ..Default::default()
    }
}

#[test]
fn ledger_survives_reopen() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("ledger");
    let alice = Address::from_label("alice");

    let expected = {
        let storage = SledStorage::new(&path).expect("open storage");
        let mut ledger = Ledger::new(config()).expect("genesis");
        let session = ledger.start_session(alice, 4, 2).expect("session");
        ledger.submit_discovery(alice, 1, 50, 5).expect("discovery");
        ledger
            .register_validator(alice, eka(1_000))
            .expect("validator");
        let operator = ledger.config().operator;
        ledger.update_network_health(operator, 20).expect("health");
        ledger.emergency_pause(operator).expect("pause");

        save_ledger(&storage, &ledger).expect("save");
        storage.flush().expect("flush");
        assert!(ledger.get_session(session).expect("stored").active);
        ledger.snapshot()
    };

    let storage = SledStorage::new(&path).expect("reopen storage");
    let restored = load_ledger(&storage, config())
        .expect("load")
        .expect("snapshot present");
    assert_eq!(restored.snapshot(), expected);
    assert!(restored.security_state().paused);
    assert_eq!(restored.security_state().health_score, 20);
    assert!(restored.verify_conservation().is_ok());
}

#[test]
fn emptied_balances_are_removed_on_save() {
    let dir = TempDir::new().expect("temp dir");
    let storage = SledStorage::new(dir.path().join("ledger")).expect("open storage");
    let bob = Address::from_label("bob");

    let mut ledger = Ledger::new(config()).expect("genesis");
    save_ledger(&storage, &ledger).expect("save");
    ledger
        .transfer(bob, Address::from_label("carol"), eka(10))
        .expect("transfer");
    save_ledger(&storage, &ledger).expect("save again");

    let snapshot = storage.load_snapshot().expect("load").expect("present");
    assert!(!snapshot.balances.contains_key(&bob));
    assert_eq!(snapshot, ledger.snapshot());
}

#[test]
fn tampered_balance_fails_conservation_on_load() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("ledger");
    let alice = Address::from_label("alice");

    {
        let storage = SledStorage::new(&path).expect("open storage");
        let ledger = Ledger::new(config()).expect("genesis");
        save_ledger(&storage, &ledger).expect("save");
        storage.flush().expect("flush");
    }

    {
        let db = sled::open(&path).expect("raw open");
        let balances = db.open_tree("balances").expect("tree");
        balances
            .insert(&alice.as_bytes()[..], serde_json::to_vec(&eka(9_999)).expect("encode"))
            .expect("tamper");
        db.flush().expect("flush");
    }

    let storage = SledStorage::new(&path).expect("reopen storage");
    assert!(matches!(
        load_ledger(&storage, config()),
        Err(StorageError::Ledger(LedgerError::InvariantViolation(_)))
    ));
}

#[test]
fn empty_store_loads_nothing() {
    let dir = TempDir::new().expect("temp dir");
    let storage = SledStorage::new(dir.path().join("fresh")).expect("open storage");
    assert!(load_ledger(&storage, config()).expect("load").is_none());
}
