//! Persistable form of the ledger.

use crate::config::LedgerConfig;
use crate::engine::Ledger;
use crate::errors::{LedgerError, Result};
use crate::state::{GlobalLedgerState, LedgerState};
use eureka_security::{SecurityManager, SecurityState};
use eureka_treasury::{InMemoryAccountLedger, PoolBalances, RewardSink};
use eureka_types::{Address, Discovery, MicroEka, MiningSession, Validator};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

pub const SNAPSHOT_VERSION: u32 = 1;

/// Everything needed to rebuild a ledger and re-check conservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub version: u32,
    pub sessions: Vec<MiningSession>,
    pub discoveries: Vec<Discovery>,
    pub validators: Vec<Validator>,
    pub pools: PoolBalances,
    pub balances: BTreeMap<Address, MicroEka>,
    pub global: GlobalLedgerState,
    /// Packed as a `u64` when serialized.
    pub security: SecurityState,
    pub reward_sink: RewardSink,
}

impl Ledger {
    /// Copy of the committed state.
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            version: SNAPSHOT_VERSION,
            sessions: self.state.sessions().to_vec(),
            discoveries: self.state.discoveries().to_vec(),
            validators: self.state.validators().values().cloned().collect(),
            pools: *self.state.pools(),
            balances: self.state.accounts().balances().clone(),
            global: *self.state.global(),
            security: self.security.state(),
            reward_sink: self.state.reward_sink().clone(),
        }
    }

    /// Rebuild a ledger from a snapshot. Fails if the snapshot does not
    /// satisfy the conservation and id invariants.
    pub fn restore(config: LedgerConfig, snapshot: LedgerSnapshot) -> Result<Self> {
        config.validate()?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(LedgerError::InvariantViolation(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }

        let accounts = InMemoryAccountLedger::from_balances(snapshot.balances)?;
        let validators = snapshot
            .validators
            .into_iter()
            .map(|v| (v.address, v))
            .collect();
        let state = LedgerState::from_parts(
            snapshot.pools,
            accounts,
            snapshot.sessions,
            snapshot.discoveries,
            validators,
            snapshot.global,
            snapshot.reward_sink,
        );
        let security =
            SecurityManager::with_state(snapshot.security, config.operator, config.health_policy)
                .map_err(|e| LedgerError::InvalidConfig(e.to_string()))?;

        let ledger = Ledger::assemble(state, security, config)?;
        info!(
            target: "ledger",
            "Ledger restored at height {} ({} sessions, {} discoveries)",
            ledger.global_state().block_height,
            ledger.state.sessions().len(),
            ledger.state.discoveries().len()
        );
        Ok(ledger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenesisConfig;
    use crate::pow::proof_hash;
    use eureka_types::{eka, SessionId};

    #[test]
    fn snapshot_restores_equivalent_ledger() {
        let alice = Address::from_label("alice");
        let config = LedgerConfig {
            genesis: GenesisConfig::default().with_account(alice, eka(500)),
            ..Default::default()
        };
        let mut ledger = Ledger::new(config.clone()).unwrap();
        let session = ledger.start_session(alice, 3, 1).unwrap();
        ledger.start_session(alice, 4, 2).unwrap();
        ledger
            .submit_proof(alice, session, 9, proof_hash(session, 9, 5, 0), 5, 0)
            .unwrap();
        ledger.submit_discovery(alice, 12, 0, 0).unwrap();

        let json = serde_json::to_string(&ledger.snapshot()).unwrap();
        let snapshot: LedgerSnapshot = serde_json::from_str(&json).unwrap();
        let restored = Ledger::restore(config, snapshot).unwrap();

        assert_eq!(restored.snapshot(), ledger.snapshot());
        assert_eq!(restored.active_sessions_of(&alice), vec![SessionId(2)]);
        assert!(restored.verify_conservation().is_ok());
    }

    #[test]
    fn tampered_snapshot_is_rejected() {
        let ledger = Ledger::new(LedgerConfig::default()).unwrap();
        let mut snapshot = ledger.snapshot();
        snapshot.global.total_supply += 1;
        assert!(matches!(
            Ledger::restore(LedgerConfig::default(), snapshot),
            Err(LedgerError::InvariantViolation(_))
        ));
    }
}
