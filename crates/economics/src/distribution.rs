//! Splitting fresh emission across the accounting pools, and transfer fees.

use crate::params::{EconomicsParams, EmissionSplit, BPS_DENOM};
use eureka_types::MicroEka;
use serde::{Deserialize, Serialize};

/// Per-pool share of one emission event (µEKA).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmissionAllocation {
    pub mining_rewards: MicroEka,
    pub validator_reward: MicroEka,
    pub staking: MicroEka,
    pub research_access: MicroEka,
    pub treasury: MicroEka,
    pub governance: MicroEka,
    pub transaction_fee: MicroEka,
}

impl EmissionAllocation {
    pub fn total(&self) -> MicroEka {
        self.mining_rewards
            + self.validator_reward
            + self.staking
            + self.research_access
            + self.treasury
            + self.governance
            + self.transaction_fee
    }
}

fn share(amount: MicroEka, bps: u16) -> MicroEka {
    // amount ≤ soft cap, so the product cannot overflow u128.
    amount.saturating_mul(bps as u128) / BPS_DENOM
}

/// Split `amount` by the configured basis points. Rounding dust goes to the treasury,
/// so the allocation always sums to exactly `amount`.
pub fn split_emission(amount: MicroEka, split: &EmissionSplit) -> EmissionAllocation {
    let mut allocation = EmissionAllocation {
        mining_rewards: share(amount, split.mining_rewards_bps),
        validator_reward: share(amount, split.validator_reward_bps),
        staking: share(amount, split.staking_bps),
        research_access: share(amount, split.research_access_bps),
        treasury: share(amount, split.treasury_bps),
        governance: share(amount, split.governance_bps),
        transaction_fee: share(amount, split.transaction_fee_bps),
    };
    let remainder = amount.saturating_sub(allocation.total());
    allocation.treasury = allocation.treasury.saturating_add(remainder);
    allocation
}

/// Fee withheld from a participant transfer.
pub fn transfer_fee(amount: MicroEka, p: &EconomicsParams) -> MicroEka {
    share(amount, p.transfer_fee_bps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use eureka_types::eka;

    #[test]
    fn split_follows_basis_points() {
        let allocation = split_emission(eka(100), &EmissionSplit::default());
        assert_eq!(allocation.mining_rewards, eka(40));
        assert_eq!(allocation.validator_reward, eka(20));
        assert_eq!(allocation.staking, eka(10));
        assert_eq!(allocation.research_access, eka(10));
        assert_eq!(allocation.treasury, eka(10));
        assert_eq!(allocation.governance, eka(5));
        assert_eq!(allocation.transaction_fee, eka(5));
        assert_eq!(allocation.total(), eka(100));
    }

    #[test]
    fn dust_goes_to_treasury() {
        let allocation = split_emission(7, &EmissionSplit::default());
        assert_eq!(allocation.total(), 7);
        assert_eq!(allocation.mining_rewards, 2);
        assert_eq!(allocation.validator_reward, 1);
        assert_eq!(allocation.treasury, 4);

        let single = split_emission(1, &EmissionSplit::default());
        assert_eq!(single.treasury, 1);
        assert_eq!(single.total(), 1);
    }

    #[test]
    fn transfer_fee_is_ten_bps() {
        let params = EconomicsParams::default();
        assert_eq!(transfer_fee(eka(1_000), &params), eka(1));
        assert_eq!(transfer_fee(999, &params), 0);
    }
}
