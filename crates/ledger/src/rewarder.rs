//! Automatic validator rewarder.
//!
//! Runs inside the transaction of every accepted proof or direct discovery.
//! Each active validator receives the same per-discovery reward, paid from
//! the validator-reward pool or, when that cannot cover the total, from the
//! unlocked part of the staking pool.

use crate::errors::{LedgerError, Result};
use crate::staged::Staged;
use eureka_economics::{validator_reward, EconomicsParams};
use eureka_treasury::{Payouts, PoolKind, RewardSink};
use eureka_types::{DiscoveryId, MicroEka, Verification, WorkCategory};
use tracing::{debug, info};

/// Pick the pool that pays `total`, without touching locked stake.
fn funding_pool(staged: &Staged<'_>, total: MicroEka) -> Result<PoolKind> {
    let validator_pool = staged.pools.get(PoolKind::ValidatorReward);
    if validator_pool >= total {
        return Ok(PoolKind::ValidatorReward);
    }
    let unlocked_staking = staged
        .pools
        .get(PoolKind::Staking)
        .saturating_sub(staged.locked_stake());
    if unlocked_staking >= total {
        return Ok(PoolKind::Staking);
    }
    Err(LedgerError::InsufficientBalance {
        holder: "validator_reward and staking pools".into(),
        needed: total,
        available: validator_pool.max(unlocked_staking),
    })
}

/// Reward every active validator for `discovery` and record the verification.
pub(crate) fn reward_validators(
    staged: &mut Staged<'_>,
    discovery: DiscoveryId,
    tier: u8,
    category: WorkCategory,
    scaling_rate_bps: u32,
    params: &EconomicsParams,
) -> Result<Verification> {
    let validators = staged.active_validators();

    if validators.is_empty() {
        debug!(target: "ledger", "{}: no active validators, reward stays pooled", discovery);
        return record(staged, discovery, Verification::default());
    }

    let per_validator = validator_reward(
        tier,
        category,
        staged.global.total_research_value,
        scaling_rate_bps,
        params,
    )?;
    let total = per_validator
        .checked_mul(validators.len() as u128)
        .ok_or_else(|| LedgerError::Overflow("validator reward total".into()))?;

    let mut payouts = Payouts::new();
    if total > 0 {
        let pool = funding_pool(staged, total)?;
        staged.pools.debit(pool, total)?;
        payouts.extend(validators.iter().map(|v| (v.address, per_validator)));
        RewardSink::settle_to_accounts(&payouts, &mut staged.accounts)?;
        info!(
            target: "ledger",
            "{}: paid {} µEKA to {} validators from {} pool",
            discovery,
            total,
            validators.len(),
            pool
        );
    }

    for mut validator in validators.iter().cloned() {
        validator.total_validations += 1;
        staged.put_validator(validator);
    }

    let verification = Verification {
        validators: validators.len() as u32,
        total_reward: total,
    };
    if !payouts.is_empty() {
        staged.record_payouts(discovery, payouts);
    }
    record(staged, discovery, verification)
}

fn record(
    staged: &mut Staged<'_>,
    discovery: DiscoveryId,
    verification: Verification,
) -> Result<Verification> {
    let written = staged
        .staged_discovery_mut(discovery)
        .map(|d| d.record_verification(verification))
        .unwrap_or(false);
    if !written {
        return Err(LedgerError::InvariantViolation(format!(
            "{discovery} cannot take a verification"
        )));
    }
    Ok(verification)
}
