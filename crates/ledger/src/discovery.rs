//! Discovery registry.
//!
//! Both the proof path and the direct path end here: the research value is
//! computed, fresh emission is minted, the discovery is appended with the
//! next global id and the validator rewarder runs in the same transaction.

use crate::errors::{LedgerError, Result};
use crate::minting::mint_for_event;
use crate::rewarder::reward_validators;
use crate::staged::Staged;
use eureka_economics::EconomicsParams;
use eureka_types::{
    Address, BlockHeight, Discovery, DiscoveryId, DiscoveryOrigin, MicroEka, WorkType,
};

/// Inputs for a discovery about to be registered.
#[derive(Debug, Clone, Copy)]
pub(crate) struct NewDiscovery {
    pub work_type: WorkType,
    pub complexity: u8,
    pub significance_tier: u8,
    pub research_value: MicroEka,
    pub researcher: Address,
    pub origin: DiscoveryOrigin,
}

pub(crate) fn register(
    staged: &mut Staged<'_>,
    new: NewDiscovery,
    height: BlockHeight,
    timestamp: i64,
    scaling_rate_bps: u32,
    params: &EconomicsParams,
) -> Result<DiscoveryId> {
    mint_for_event(staged, height, params)?;

    staged.global.total_research_value = staged
        .global
        .total_research_value
        .checked_add(new.research_value)
        .ok_or_else(|| LedgerError::Overflow("total research value".into()))?;

    let id = staged.allocate_discovery_id();
    staged.push_discovery(Discovery {
        id,
        work_type: new.work_type,
        complexity: new.complexity,
        significance_tier: new.significance_tier,
        research_value: new.research_value,
        researcher: new.researcher,
        origin: new.origin,
        timestamp,
        block_height: height,
        verification: None,
    });

    reward_validators(
        staged,
        id,
        new.significance_tier,
        new.work_type.category(),
        scaling_rate_bps,
        params,
    )?;
    Ok(id)
}
