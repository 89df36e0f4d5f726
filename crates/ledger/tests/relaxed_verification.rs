//! Relaxed proof verification (test networks only).
//!
//! Run with: cargo test -p eureka-ledger --features relaxed-verification
#![cfg(feature = "relaxed-verification")]

use eureka_ledger::{Ledger, LedgerConfig, VerificationMode};
use eureka_security::SecurityEvent;
use eureka_types::Address;

#[test]
fn relaxed_mode_accepts_arbitrary_targets_and_is_audited() {
    let mut ledger = Ledger::new(LedgerConfig {
        verification: VerificationMode::Relaxed,
        ..Default::default()
    })
    .unwrap();
    assert!(ledger
        .audit_log()
        .recent(10)
        .iter()
        .any(|e| e.event == SecurityEvent::RelaxedVerificationEnabled));

    let miner = Address::from_label("miner");
    let session = ledger.start_session(miner, 0, 50).unwrap();
    assert!(ledger.submit_proof(miner, session, 0, 0, 0, 0).is_ok());
}

#[test]
fn strict_mode_is_still_the_default() {
    let mut ledger = Ledger::new(LedgerConfig::default()).unwrap();
    let miner = Address::from_label("miner");
    let session = ledger.start_session(miner, 0, 1).unwrap();
    assert!(ledger.submit_proof(miner, session, 0, 0, 0, 0).is_err());
}
