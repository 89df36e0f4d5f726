//! Staged transaction overlay.
//!
//! An operation reads the committed `LedgerState` and writes only into a
//! `Staged` overlay. On success the overlay becomes a `ChangeSet` applied in
//! one step; on any error the overlay is dropped and nothing changes.

use crate::state::{GlobalLedgerState, LedgerState};
use eureka_treasury::{AccountLedger, InMemoryAccountLedger, Payouts, PoolBalances, TreasuryError};
use eureka_types::{
    Address, BlockHeight, Discovery, DiscoveryId, MicroEka, MiningSession, SessionId, Validator,
};
use std::collections::BTreeMap;

/// Account balances written through on top of the committed ledger.
#[derive(Debug)]
pub(crate) struct AccountOverlay<'a> {
    base: &'a InMemoryAccountLedger,
    changes: BTreeMap<Address, MicroEka>,
    credited: MicroEka,
    debited: MicroEka,
}

impl<'a> AccountOverlay<'a> {
    fn new(base: &'a InMemoryAccountLedger) -> Self {
        Self {
            base,
            changes: BTreeMap::new(),
            credited: 0,
            debited: 0,
        }
    }
}

impl AccountLedger for AccountOverlay<'_> {
    fn credit(&mut self, account: &Address, amount: MicroEka) -> Result<(), TreasuryError> {
        let next = self
            .balance_of(account)
            .checked_add(amount)
            .ok_or_else(|| TreasuryError::Overflow(account.to_string()))?;
        self.credited = self
            .credited
            .checked_add(amount)
            .ok_or_else(|| TreasuryError::Overflow("staged credits".to_string()))?;
        self.changes.insert(*account, next);
        Ok(())
    }

    fn debit(&mut self, account: &Address, amount: MicroEka) -> Result<(), TreasuryError> {
        let current = self.balance_of(account);
        if current < amount {
            return Err(TreasuryError::InsufficientBalance {
                account: *account,
                needed: amount,
                available: current,
            });
        }
        self.debited = self.debited.saturating_add(amount);
        self.changes.insert(*account, current - amount);
        Ok(())
    }

    fn balance_of(&self, account: &Address) -> MicroEka {
        self.changes
            .get(account)
            .copied()
            .unwrap_or_else(|| self.base.balance_of(account))
    }

    fn total_balance(&self) -> MicroEka {
        // debits never exceed what was there before, so this cannot underflow
        (self.base.total_balance() + self.credited) - self.debited
    }
}

/// Everything a successful operation changes.
#[derive(Debug)]
pub(crate) struct ChangeSet {
    pub pools: PoolBalances,
    pub global: GlobalLedgerState,
    pub balances: BTreeMap<Address, MicroEka>,
    pub sessions: BTreeMap<SessionId, MiningSession>,
    pub discoveries: Vec<Discovery>,
    pub validators: BTreeMap<Address, Validator>,
    pub payouts: Vec<(DiscoveryId, Payouts)>,
}

#[derive(Debug)]
pub(crate) struct Staged<'a> {
    base: &'a LedgerState,
    pub pools: PoolBalances,
    pub global: GlobalLedgerState,
    pub accounts: AccountOverlay<'a>,
    sessions: BTreeMap<SessionId, MiningSession>,
    new_sessions: u64,
    discoveries: Vec<Discovery>,
    validators: BTreeMap<Address, Validator>,
    payouts: Vec<(DiscoveryId, Payouts)>,
}

impl<'a> Staged<'a> {
    pub fn new(base: &'a LedgerState) -> Self {
        Self {
            base,
            pools: *base.pools(),
            global: *base.global(),
            accounts: AccountOverlay::new(base.accounts()),
            sessions: BTreeMap::new(),
            new_sessions: 0,
            discoveries: Vec::new(),
            validators: BTreeMap::new(),
            payouts: Vec::new(),
        }
    }

    /// Advance the step counter; returns the height of this operation.
    pub fn advance_height(&mut self) -> BlockHeight {
        self.global.block_height = self.global.block_height.saturating_add(1);
        self.global.block_height
    }

    pub fn session(&self, id: SessionId) -> Option<MiningSession> {
        self.sessions
            .get(&id)
            .cloned()
            .or_else(|| self.base.session(id).cloned())
    }

    pub fn allocate_session_id(&mut self) -> SessionId {
        self.new_sessions += 1;
        SessionId(self.base.sessions().len() as u64 + self.new_sessions)
    }

    pub fn put_session(&mut self, session: MiningSession) {
        self.sessions.insert(session.id, session);
    }

    pub fn allocate_discovery_id(&mut self) -> DiscoveryId {
        let id = DiscoveryId(self.global.next_discovery_id);
        self.global.next_discovery_id += 1;
        id
    }

    pub fn push_discovery(&mut self, discovery: Discovery) {
        self.discoveries.push(discovery);
    }

    /// A discovery created inside this transaction.
    pub fn staged_discovery_mut(&mut self, id: DiscoveryId) -> Option<&mut Discovery> {
        self.discoveries.iter_mut().find(|d| d.id == id)
    }

    pub fn validator(&self, address: &Address) -> Option<Validator> {
        self.validators
            .get(address)
            .cloned()
            .or_else(|| self.base.validators().get(address).cloned())
    }

    pub fn put_validator(&mut self, validator: Validator) {
        self.validators.insert(validator.address, validator);
    }

    /// Active validators in address order, staged changes included.
    pub fn active_validators(&self) -> Vec<Validator> {
        let mut merged: BTreeMap<Address, Validator> = self.base.validators().clone();
        for (address, validator) in &self.validators {
            merged.insert(*address, validator.clone());
        }
        merged.into_values().filter(|v| v.active).collect()
    }

    pub fn locked_stake(&self) -> MicroEka {
        self.active_validators()
            .iter()
            .fold(0u128, |acc, v| acc.saturating_add(v.stake))
    }

    pub fn record_payouts(&mut self, discovery: DiscoveryId, payouts: Payouts) {
        self.payouts.push((discovery, payouts));
    }

    /// `total_supply - total_burned == Σ pools + Σ accounts` for the staged values.
    pub fn conserves(&self) -> bool {
        match self.global.circulating() {
            Some(circulating) => {
                self.pools.total().checked_add(self.accounts.total_balance()) == Some(circulating)
            }
            None => false,
        }
    }

    pub fn into_changes(self) -> ChangeSet {
        ChangeSet {
            pools: self.pools,
            global: self.global,
            balances: self.accounts.changes,
            sessions: self.sessions,
            discoveries: self.discoveries,
            validators: self.validators,
            payouts: self.payouts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eureka_treasury::RewardSink;

    fn base_with(account: Address, balance: MicroEka) -> LedgerState {
        let mut accounts = InMemoryAccountLedger::new();
        accounts.credit(&account, balance).unwrap();
        LedgerState::from_parts(
            PoolBalances::new(),
            accounts,
            Vec::new(),
            Vec::new(),
            BTreeMap::new(),
            GlobalLedgerState::genesis(balance),
            RewardSink::new(),
        )
    }

    #[test]
    fn overlay_reads_through_and_tracks_totals() {
        let alice = Address::from_label("alice");
        let bob = Address::from_label("bob");
        let base = base_with(alice, 100);

        let mut staged = Staged::new(&base);
        staged.accounts.debit(&alice, 30).unwrap();
        staged.accounts.credit(&bob, 30).unwrap();

        assert_eq!(staged.accounts.balance_of(&alice), 70);
        assert_eq!(staged.accounts.balance_of(&bob), 30);
        assert_eq!(staged.accounts.total_balance(), 100);
        assert!(staged.conserves());
        assert_eq!(base.balance_of(&alice), 100);
    }

    #[test]
    fn dropped_overlay_changes_nothing() {
        let alice = Address::from_label("alice");
        let mut base = base_with(alice, 100);
        {
            let mut staged = Staged::new(&base);
            staged.accounts.debit(&alice, 100).unwrap();
            staged.advance_height();
        }
        assert_eq!(base.balance_of(&alice), 100);
        assert_eq!(base.global().block_height, 0);

        let changes = {
            let mut staged = Staged::new(&base);
            staged.accounts.debit(&alice, 40).unwrap();
            staged.pools.credit(eureka_treasury::PoolKind::Treasury, 40).unwrap();
            staged.advance_height();
            staged.into_changes()
        };
        base.apply(changes);
        assert_eq!(base.balance_of(&alice), 60);
        assert_eq!(base.global().block_height, 1);
        assert!(base.verify().is_ok());
    }

    #[test]
    fn overdraw_is_rejected() {
        let alice = Address::from_label("alice");
        let base = base_with(alice, 10);
        let mut staged = Staged::new(&base);
        assert!(staged.accounts.debit(&alice, 11).is_err());
        assert_eq!(staged.accounts.balance_of(&alice), 10);
    }
}
