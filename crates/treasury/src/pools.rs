//! The seven accounting pools.
//!
//! ## Key Invariants
//! - A pool balance never goes negative: debits that do not fit are rejected
//! - Fresh emission enters the pools only through `apply_emission`
//! - All arithmetic is integer µEKA

use crate::errors::TreasuryError;
use eureka_economics::EmissionAllocation;
use eureka_types::MicroEka;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Named balance buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolKind {
    MiningRewards,
    Staking,
    Governance,
    ResearchAccess,
    TransactionFee,
    Treasury,
    ValidatorReward,
}

impl PoolKind {
    pub const ALL: [PoolKind; 7] = [
        PoolKind::MiningRewards,
        PoolKind::Staking,
        PoolKind::Governance,
        PoolKind::ResearchAccess,
        PoolKind::TransactionFee,
        PoolKind::Treasury,
        PoolKind::ValidatorReward,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            PoolKind::MiningRewards => "mining_rewards",
            PoolKind::Staking => "staking",
            PoolKind::Governance => "governance",
            PoolKind::ResearchAccess => "research_access",
            PoolKind::TransactionFee => "transaction_fee",
            PoolKind::Treasury => "treasury",
            PoolKind::ValidatorReward => "validator_reward",
        }
    }
}

impl fmt::Display for PoolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Balances of all pools, indexed by `PoolKind`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolBalances {
    balances: [MicroEka; 7],
}

impl PoolBalances {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, pool: PoolKind) -> MicroEka {
        self.balances[pool.index()]
    }

    pub fn credit(&mut self, pool: PoolKind, amount: MicroEka) -> Result<(), TreasuryError> {
        let slot = &mut self.balances[pool.index()];
        *slot = slot
            .checked_add(amount)
            .ok_or_else(|| TreasuryError::Overflow(pool.to_string()))?;
        Ok(())
    }

    pub fn debit(&mut self, pool: PoolKind, amount: MicroEka) -> Result<(), TreasuryError> {
        let slot = &mut self.balances[pool.index()];
        if *slot < amount {
            return Err(TreasuryError::InsufficientPoolBalance {
                pool,
                needed: amount,
                available: *slot,
            });
        }
        *slot -= amount;
        Ok(())
    }

    /// Credit freshly minted emission according to its per-pool allocation.
    pub fn apply_emission(&mut self, allocation: &EmissionAllocation) -> Result<(), TreasuryError> {
        let mut next = *self;
        next.credit(PoolKind::MiningRewards, allocation.mining_rewards)?;
        next.credit(PoolKind::ValidatorReward, allocation.validator_reward)?;
        next.credit(PoolKind::Staking, allocation.staking)?;
        next.credit(PoolKind::ResearchAccess, allocation.research_access)?;
        next.credit(PoolKind::Treasury, allocation.treasury)?;
        next.credit(PoolKind::Governance, allocation.governance)?;
        next.credit(PoolKind::TransactionFee, allocation.transaction_fee)?;
        *self = next;

        debug!(
            target: "treasury",
            "Applied emission of {} µEKA across pools",
            allocation.total()
        );
        Ok(())
    }

    /// Sum of every pool (saturating; real totals stay far below `u128::MAX`).
    pub fn total(&self) -> MicroEka {
        self.balances
            .iter()
            .fold(0u128, |acc, balance| acc.saturating_add(*balance))
    }

    pub fn iter(&self) -> impl Iterator<Item = (PoolKind, MicroEka)> + '_ {
        PoolKind::ALL.iter().map(move |pool| (*pool, self.get(*pool)))
    }
}
