//! Shared single-writer access to a ledger.
//!
//! Mutations take the write lock for exactly one operation, so operations
//! never interleave. Queries take the read lock and return owned copies.

use crate::engine::Ledger;
use crate::errors::Result;
use crate::snapshot::LedgerSnapshot;
use crate::state::GlobalLedgerState;
use eureka_security::SecurityState;
use eureka_treasury::PoolBalances;
use eureka_types::{Address, Discovery, DiscoveryId, MicroEka, MiningSession, SessionId, Validator};
use parking_lot::RwLock;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct LedgerHandle {
    inner: Arc<RwLock<Ledger>>,
}

impl LedgerHandle {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ledger)),
        }
    }

    /// Run one mutating operation under the write lock.
    pub fn write<T>(&self, op: impl FnOnce(&mut Ledger) -> Result<T>) -> Result<T> {
        let mut ledger = self.inner.write();
        op(&mut ledger)
    }

    /// Run a read-only query under the read lock.
    pub fn read<T>(&self, query: impl FnOnce(&Ledger) -> T) -> T {
        let ledger = self.inner.read();
        query(&ledger)
    }

    pub fn start_session(&self, participant: Address, work_type: u8, difficulty: u8) -> Result<SessionId> {
        self.write(|l| l.start_session(participant, work_type, difficulty))
    }

    pub fn submit_proof(
        &self,
        caller: Address,
        session: SessionId,
        nonce: u32,
        target_hash: u128,
        complexity: u8,
        significance_tier: u8,
    ) -> Result<DiscoveryId> {
        self.write(|l| l.submit_proof(caller, session, nonce, target_hash, complexity, significance_tier))
    }

    pub fn submit_discovery(
        &self,
        researcher: Address,
        work_type: u8,
        complexity: u8,
        significance_tier: u8,
    ) -> Result<DiscoveryId> {
        self.write(|l| l.submit_discovery(researcher, work_type, complexity, significance_tier))
    }

    pub fn emergency_pause(&self, caller: Address) -> Result<()> {
        self.write(|l| l.emergency_pause(caller))
    }

    pub fn emergency_unpause(&self, caller: Address) -> Result<()> {
        self.write(|l| l.emergency_unpause(caller))
    }

    pub fn update_network_health(&self, caller: Address, score: u16) -> Result<SecurityState> {
        self.write(|l| l.update_network_health(caller, score))
    }

    pub fn register_validator(&self, address: Address, stake: MicroEka) -> Result<()> {
        self.write(|l| l.register_validator(address, stake))
    }

    pub fn deactivate_validator(&self, caller: Address, address: Address) -> Result<MicroEka> {
        self.write(|l| l.deactivate_validator(caller, address))
    }

    pub fn transfer(&self, from: Address, to: Address, amount: MicroEka) -> Result<MicroEka> {
        self.write(|l| l.transfer(from, to, amount))
    }

    pub fn get_session(&self, id: SessionId) -> Option<MiningSession> {
        self.read(|l| l.get_session(id))
    }

    pub fn get_discovery(&self, id: DiscoveryId) -> Option<Discovery> {
        self.read(|l| l.get_discovery(id))
    }

    pub fn get_validator(&self, address: &Address) -> Option<Validator> {
        self.read(|l| l.get_validator(address))
    }

    pub fn pool_balances(&self) -> PoolBalances {
        self.read(|l| l.pool_balances())
    }

    pub fn global_state(&self) -> GlobalLedgerState {
        self.read(|l| l.global_state())
    }

    pub fn security_state(&self) -> SecurityState {
        self.read(|l| l.security_state())
    }

    pub fn balance_of(&self, participant: &Address) -> MicroEka {
        self.read(|l| l.balance_of(participant))
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        self.read(|l| l.snapshot())
    }
}
