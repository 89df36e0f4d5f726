//! Ledger construction parameters.

use crate::errors::{LedgerError, Result};
use eureka_economics::EconomicsParams;
use eureka_security::HealthPolicy;
use eureka_treasury::PoolKind;
use eureka_types::{eka, Address, MicroEka};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How proof submissions are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationMode {
    /// Target hash must match the proof digest and fall under the difficulty threshold.
    #[default]
    Strict,
    /// Skip both checks. Needs the `relaxed-verification` feature.
    Relaxed,
}

impl VerificationMode {
    /// Whether this build may run in the given mode.
    pub fn is_available(self) -> bool {
        match self {
            VerificationMode::Strict => true,
            VerificationMode::Relaxed => cfg!(feature = "relaxed-verification"),
        }
    }
}

/// Initial pool allocations and participant balances; together they form the
/// genesis total supply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenesisConfig {
    pub pools: BTreeMap<PoolKind, MicroEka>,
    pub accounts: BTreeMap<Address, MicroEka>,
}

impl Default for GenesisConfig {
    fn default() -> Self {
        let pools = [
            (PoolKind::MiningRewards, eka(10_000_000)),
            (PoolKind::ValidatorReward, eka(2_000_000)),
            (PoolKind::Staking, eka(1_000_000)),
            (PoolKind::ResearchAccess, eka(1_000_000)),
            (PoolKind::Treasury, eka(5_000_000)),
            (PoolKind::Governance, eka(500_000)),
            (PoolKind::TransactionFee, 0),
        ]
        .into_iter()
        .collect();
        Self {
            pools,
            accounts: BTreeMap::new(),
        }
    }
}

impl GenesisConfig {
    /// Genesis with every pool and account empty.
    pub fn empty() -> Self {
        Self {
            pools: BTreeMap::new(),
            accounts: BTreeMap::new(),
        }
    }

    pub fn with_account(mut self, account: Address, balance: MicroEka) -> Self {
        self.accounts.insert(account, balance);
        self
    }

    pub fn with_pool(mut self, pool: PoolKind, balance: MicroEka) -> Self {
        self.pools.insert(pool, balance);
        self
    }

    pub fn total_supply(&self) -> Option<MicroEka> {
        self.pools
            .values()
            .chain(self.accounts.values())
            .try_fold(0u128, |acc, v| acc.checked_add(*v))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Address allowed to pause, unpause and update network health.
    pub operator: Address,
    /// Concurrent active sessions allowed per miner.
    pub max_active_sessions: usize,
    pub min_validator_stake: MicroEka,
    pub health_policy: HealthPolicy,
    pub verification: VerificationMode,
    pub economics: EconomicsParams,
    pub genesis: GenesisConfig,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            operator: Address::from_label("operator"),
            max_active_sessions: 5,
            min_validator_stake: eka(1_000),
            health_policy: HealthPolicy::default(),
            verification: VerificationMode::Strict,
            economics: EconomicsParams::default(),
            genesis: GenesisConfig::default(),
        }
    }
}

impl LedgerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_active_sessions == 0 {
            return Err(LedgerError::InvalidConfig(
                "max_active_sessions must be positive".into(),
            ));
        }
        if self.min_validator_stake == 0 {
            return Err(LedgerError::InvalidConfig(
                "min_validator_stake must be positive".into(),
            ));
        }
        if !self.verification.is_available() {
            return Err(LedgerError::InvalidConfig(
                "relaxed verification requires the relaxed-verification feature".into(),
            ));
        }
        self.health_policy
            .validate()
            .map_err(|e| LedgerError::InvalidConfig(e.to_string()))?;
        self.economics
            .validate()
            .map_err(|e| LedgerError::InvalidConfig(e.to_string()))?;
        if self.genesis.total_supply().is_none() {
            return Err(LedgerError::InvalidConfig(
                "genesis allocations overflow".into(),
            ));
        }
        Ok(())
    }
}
