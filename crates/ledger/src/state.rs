//! Ledger aggregate: pools, balances, sessions, discoveries and validators.
//!
//! ## Key Invariants
//! - `total_supply - total_burned == Σ pools + Σ participant balances`
//! - Session and discovery ids are dense and start at 1
//! - The staking pool always covers the stake of every active validator
//! - Mutation happens only through `LedgerState::apply`

use crate::errors::{LedgerError, Result};
use crate::staged::ChangeSet;
use eureka_treasury::{AccountLedger, InMemoryAccountLedger, PoolBalances, PoolKind, RewardSink};
use eureka_types::{
    Address, BlockHeight, Discovery, DiscoveryId, MicroEka, MiningSession, SessionId, Validator,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Ledger-wide counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GlobalLedgerState {
    pub total_supply: MicroEka,
    pub total_burned: MicroEka,
    pub total_research_value: MicroEka,
    pub next_discovery_id: u64,
    pub cumulative_emission: MicroEka,
    pub block_height: BlockHeight,
}

impl GlobalLedgerState {
    pub fn genesis(total_supply: MicroEka) -> Self {
        Self {
            total_supply,
            next_discovery_id: 1,
            ..Default::default()
        }
    }

    /// Value that must be held across pools and participant accounts.
    pub fn circulating(&self) -> Option<MicroEka> {
        self.total_supply.checked_sub(self.total_burned)
    }
}

#[derive(Debug, Clone, Default)]
pub struct LedgerState {
    pub(crate) pools: PoolBalances,
    pub(crate) accounts: InMemoryAccountLedger,
    pub(crate) sessions: Vec<MiningSession>,
    pub(crate) discoveries: Vec<Discovery>,
    pub(crate) validators: BTreeMap<Address, Validator>,
    pub(crate) global: GlobalLedgerState,
    pub(crate) reward_sink: RewardSink,
    /// Derived: active session ids per miner.
    active_by_miner: BTreeMap<Address, BTreeSet<SessionId>>,
}

impl LedgerState {
    pub(crate) fn from_parts(
        pools: PoolBalances,
        accounts: InMemoryAccountLedger,
        sessions: Vec<MiningSession>,
        discoveries: Vec<Discovery>,
        validators: BTreeMap<Address, Validator>,
        global: GlobalLedgerState,
        reward_sink: RewardSink,
    ) -> Self {
        let mut state = Self {
            pools,
            accounts,
            sessions,
            discoveries,
            validators,
            global,
            reward_sink,
            active_by_miner: BTreeMap::new(),
        };
        state.rebuild_index();
        state
    }

    fn rebuild_index(&mut self) {
        self.active_by_miner.clear();
        for session in self.sessions.iter().filter(|s| s.active) {
            self.active_by_miner
                .entry(session.miner)
                .or_default()
                .insert(session.id);
        }
    }

    pub fn session(&self, id: SessionId) -> Option<&MiningSession> {
        let index = id.0.checked_sub(1)?;
        self.sessions.get(usize::try_from(index).ok()?)
    }

    pub fn discovery(&self, id: DiscoveryId) -> Option<&Discovery> {
        let index = id.0.checked_sub(1)?;
        self.discoveries.get(usize::try_from(index).ok()?)
    }

    pub fn active_session_count(&self, miner: &Address) -> usize {
        self.active_by_miner.get(miner).map_or(0, |s| s.len())
    }

    pub fn active_sessions_of(&self, miner: &Address) -> Vec<SessionId> {
        self.active_by_miner
            .get(miner)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn pools(&self) -> &PoolBalances {
        &self.pools
    }

    pub fn global(&self) -> &GlobalLedgerState {
        &self.global
    }

    pub fn accounts(&self) -> &InMemoryAccountLedger {
        &self.accounts
    }

    pub fn validators(&self) -> &BTreeMap<Address, Validator> {
        &self.validators
    }

    pub fn sessions(&self) -> &[MiningSession] {
        &self.sessions
    }

    pub fn discoveries(&self) -> &[Discovery] {
        &self.discoveries
    }

    pub fn reward_sink(&self) -> &RewardSink {
        &self.reward_sink
    }

    pub fn balance_of(&self, account: &Address) -> MicroEka {
        self.accounts.balance_of(account)
    }

    /// Stake locked by active validators.
    pub fn locked_stake(&self) -> MicroEka {
        self.validators
            .values()
            .filter(|v| v.active)
            .fold(0u128, |acc, v| acc.saturating_add(v.stake))
    }

    /// Apply a committed change set.
    pub(crate) fn apply(&mut self, changes: ChangeSet) {
        self.pools = changes.pools;
        self.global = changes.global;

        for (account, balance) in changes.balances {
            self.accounts.set_balance(account, balance);
        }

        for session in changes.sessions.into_values() {
            let slot = session.id.0 as usize - 1;
            let miner = session.miner;
            let id = session.id;
            let active = session.active;
            if slot == self.sessions.len() {
                self.sessions.push(session);
            } else {
                self.sessions[slot] = session;
            }
            let set = self.active_by_miner.entry(miner).or_default();
            if active {
                set.insert(id);
            } else {
                set.remove(&id);
                if set.is_empty() {
                    self.active_by_miner.remove(&miner);
                }
            }
        }

        self.discoveries.extend(changes.discoveries);

        for (address, validator) in changes.validators {
            self.validators.insert(address, validator);
        }

        for (discovery, payouts) in changes.payouts {
            self.reward_sink.credit_discovery_payouts(discovery, &payouts);
        }
    }

    /// Full structural and conservation check.
    pub fn verify(&self) -> Result<()> {
        let circulating = self.global.circulating().ok_or_else(|| {
            LedgerError::InvariantViolation("total burned exceeds total supply".into())
        })?;
        let accounts = self.accounts.recomputed_total();
        if accounts != self.accounts.total_balance() {
            return Err(LedgerError::InvariantViolation(format!(
                "account total drifted: tracked {}, actual {}",
                self.accounts.total_balance(),
                accounts
            )));
        }
        let held = self.pools.total().saturating_add(accounts);
        if held != circulating {
            return Err(LedgerError::InvariantViolation(format!(
                "conservation broken: supply - burned = {circulating}, pools + accounts = {held}"
            )));
        }

        if self.pools.get(PoolKind::Staking) < self.locked_stake() {
            return Err(LedgerError::InvariantViolation(
                "staking pool below locked validator stake".into(),
            ));
        }

        for (index, session) in self.sessions.iter().enumerate() {
            if session.id.0 != index as u64 + 1 {
                return Err(LedgerError::InvariantViolation(format!(
                    "session ids not dense at {}",
                    session.id
                )));
            }
        }
        for (index, discovery) in self.discoveries.iter().enumerate() {
            if discovery.id.0 != index as u64 + 1 {
                return Err(LedgerError::InvariantViolation(format!(
                    "discovery ids not dense at {}",
                    discovery.id
                )));
            }
        }
        if self.global.next_discovery_id != self.discoveries.len() as u64 + 1 {
            return Err(LedgerError::InvariantViolation(
                "next discovery id does not follow the registry".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eureka_types::WorkType;

    fn session(id: u64, miner: Address, active: bool) -> MiningSession {
        MiningSession {
            id: SessionId(id),
            miner,
            work_type: WorkType::TwinPrimes,
            difficulty: 1,
            start_time: 0,
            start_height: id,
            active,
            discovery: None,
        }
    }

    #[test]
    fn index_is_rebuilt_from_sessions() {
        let alice = Address::from_label("alice");
        let state = LedgerState::from_parts(
            PoolBalances::new(),
            InMemoryAccountLedger::new(),
            vec![session(1, alice, true), session(2, alice, false), session(3, alice, true)],
            Vec::new(),
            BTreeMap::new(),
            GlobalLedgerState::genesis(0),
            RewardSink::new(),
        );
        assert_eq!(state.active_sessions_of(&alice), vec![SessionId(1), SessionId(3)]);
        assert!(state.session(SessionId(0)).is_none());
        assert!(state.verify().is_ok());
    }

    #[test]
    fn verify_detects_broken_conservation() {
        let mut pools = PoolBalances::new();
        pools.credit(PoolKind::Treasury, 100).unwrap();
        let state = LedgerState::from_parts(
            pools,
            InMemoryAccountLedger::new(),
            Vec::new(),
            Vec::new(),
            BTreeMap::new(),
            GlobalLedgerState::genesis(99),
            RewardSink::new(),
        );
        assert!(matches!(
            state.verify(),
            Err(LedgerError::InvariantViolation(_))
        ));
    }
}
