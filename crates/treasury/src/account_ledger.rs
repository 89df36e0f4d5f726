//! Participant account ledger
//!
//! Provides a small, deterministic interface for crediting, debiting and
//! tracking participant balances (miners, researchers, validators).
//!
//! Used by the ledger core for reward payouts, burns, stakes and transfers.

use crate::errors::TreasuryError;
use eureka_types::{Address, MicroEka};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Interface for account ledger operations.
pub trait AccountLedger {
    /// Credit an account with µEKA.
    fn credit(&mut self, account: &Address, amount: MicroEka) -> Result<(), TreasuryError>;

    /// Debit an account. Fails without any change if the balance cannot cover it.
    fn debit(&mut self, account: &Address, amount: MicroEka) -> Result<(), TreasuryError>;

    /// Retrieve an account balance (zero for unknown accounts).
    fn balance_of(&self, account: &Address) -> MicroEka;

    /// Sum of all participant balances.
    fn total_balance(&self) -> MicroEka;
}

// -----------------------------------------------------------------------------
// In-memory implementation (ledger state and tests)
// -----------------------------------------------------------------------------
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InMemoryAccountLedger {
    balances: BTreeMap<Address, MicroEka>,
    total: MicroEka,
}

impl InMemoryAccountLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a balance snapshot, recomputing the running total.
    pub fn from_balances(balances: BTreeMap<Address, MicroEka>) -> Result<Self, TreasuryError> {
        let mut total: MicroEka = 0;
        for (account, balance) in &balances {
            total = total
                .checked_add(*balance)
                .ok_or_else(|| TreasuryError::Overflow(account.to_string()))?;
        }
        Ok(Self { balances, total })
    }

    /// Snapshot of every non-zero balance.
    pub fn balances(&self) -> &BTreeMap<Address, MicroEka> {
        &self.balances
    }

    /// Overwrite an account balance, keeping the running total in step.
    pub fn set_balance(&mut self, account: Address, balance: MicroEka) {
        let previous = self.balances.get(&account).copied().unwrap_or(0);
        self.total = self.total - previous + balance;
        if balance == 0 {
            self.balances.remove(&account);
        } else {
            self.balances.insert(account, balance);
        }
    }

    /// Recompute the sum from scratch (used by conservation checks).
    pub fn recomputed_total(&self) -> MicroEka {
        self.balances
            .values()
            .fold(0u128, |acc, balance| acc.saturating_add(*balance))
    }
}

impl AccountLedger for InMemoryAccountLedger {
    fn credit(&mut self, account: &Address, amount: MicroEka) -> Result<(), TreasuryError> {
        let current = self.balance_of(account);
        let next = current
            .checked_add(amount)
            .ok_or_else(|| TreasuryError::Overflow(account.to_string()))?;
        let total = self
            .total
            .checked_add(amount)
            .ok_or_else(|| TreasuryError::Overflow("account total".to_string()))?;
        if next > 0 {
            self.balances.insert(*account, next);
        }
        self.total = total;
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
        self.set_balance(*account, current - amount);
        Ok(())
    }

    fn balance_of(&self, account: &Address) -> MicroEka {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn total_balance(&self) -> MicroEka {
        self.total
    }
}
