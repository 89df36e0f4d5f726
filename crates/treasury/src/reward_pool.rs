//! Validator reward staging
//!
//! Records the validator payouts made for each verified discovery so rewards
//! can be audited per discovery and totalled per validator.

use crate::account_ledger::AccountLedger;
use crate::errors::TreasuryError;
use eureka_types::{Address, DiscoveryId, MicroEka};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Payouts map from validator address to amount
pub type Payouts = BTreeMap<Address, MicroEka>;

/// Per-discovery record of validator payouts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardSink {
    /// discovery → (validator → µEKA)
    pub discoveries: BTreeMap<DiscoveryId, Payouts>,
    /// Total rewards distributed across all discoveries
    pub total_distributed_micro: MicroEka,
}

impl RewardSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the payouts made for a verified discovery.
    ///
    /// Each discovery is credited at most once; a second call for the same id
    /// leaves the sink untouched and returns `false`.
    pub fn credit_discovery_payouts(&mut self, discovery: DiscoveryId, payouts: &Payouts) -> bool {
        if payouts.is_empty() {
            debug!(target: "treasury", "{}: no validator payouts to record", discovery);
            return false;
        }
        if self.discoveries.contains_key(&discovery) {
            return false;
        }

        let total: MicroEka = payouts.values().sum();
        self.total_distributed_micro = self.total_distributed_micro.saturating_add(total);
        self.discoveries.insert(discovery, payouts.clone());

        info!(
            target: "treasury",
            "{}: credited {} µEKA across {} validators",
            discovery,
            total,
            payouts.len()
        );
        true
    }

    /// Total reward accrued by a validator across all discoveries
    pub fn validator_total(&self, validator: &Address) -> MicroEka {
        self.discoveries
            .values()
            .filter_map(|p| p.get(validator))
            .sum()
    }

    pub fn total_distributed(&self) -> MicroEka {
        self.total_distributed_micro
    }

    /// Pay every amount in `payouts` into `accounts`.
    ///
    /// Stops at the first failing credit; callers run this against a staged
    /// ledger so a failure discards the partial settlement.
    pub fn settle_to_accounts(
        payouts: &Payouts,
        accounts: &mut dyn AccountLedger,
    ) -> Result<MicroEka, TreasuryError> {
        let mut settled: MicroEka = 0;
        for (validator, amount) in payouts {
            accounts.credit(validator, *amount)?;
            settled = settled.saturating_add(*amount);
            debug!(target: "treasury", "Settled {} µEKA to validator {}", amount, validator);
        }
        Ok(settled)
    }
}
