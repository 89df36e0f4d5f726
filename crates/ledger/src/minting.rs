//! Emission and burn bookkeeping against the staged ledger.

use crate::errors::{LedgerError, Result};
use crate::staged::Staged;
use eureka_economics::{burn_amount, emission_for_event, split_emission, EconomicsParams, EmissionResult};
use eureka_treasury::AccountLedger;
use eureka_types::{Address, BlockHeight, MicroEka, WorkCategory};
use tracing::debug;

/// Mint the emission due at `height` into the pools.
///
/// Uses cumulative research value as it stands before the triggering
/// discovery is registered.
pub(crate) fn mint_for_event(
    staged: &mut Staged<'_>,
    height: BlockHeight,
    params: &EconomicsParams,
) -> Result<EmissionResult> {
    let result = emission_for_event(
        height,
        staged.global.total_research_value,
        staged.global.cumulative_emission,
        params,
    )?;

    if result.emission_micro > 0 {
        let allocation = split_emission(result.emission_micro, &params.emission_split);
        staged.pools.apply_emission(&allocation)?;
        staged.global.total_supply = staged
            .global
            .total_supply
            .checked_add(result.emission_micro)
            .ok_or_else(|| LedgerError::Overflow("total supply".into()))?;
    }
    staged.global.cumulative_emission = result.cumulative_after_micro;

    debug!(
        target: "ledger",
        "Minted {} µEKA at height {} (cumulative {})",
        result.emission_micro,
        height,
        result.cumulative_after_micro
    );
    Ok(result)
}

/// Burn the category share of `research_value` from `researcher`.
pub(crate) fn burn_for_discovery(
    staged: &mut Staged<'_>,
    researcher: &Address,
    research_value: MicroEka,
    category: WorkCategory,
) -> Result<MicroEka> {
    let burn = burn_amount(research_value, category)?;
    staged.accounts.debit(researcher, burn)?;
    staged.global.total_burned = staged
        .global
        .total_burned
        .checked_add(burn)
        .ok_or_else(|| LedgerError::Overflow("total burned".into()))?;
    Ok(burn)
}
