//! Economic parameters fixed at ledger construction.
//!
//! The emission constants (`E0`, `λ`, `α`) and reward bases are chosen once
//! when the ledger is created; nothing in the core mutates them afterwards.

use crate::errors::EconomicsError;
use eureka_types::{eka, MicroEka};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Basis-point denominator (10 000 = 100%).
pub const BPS_DENOM: u128 = 10_000;
/// Milli denominator for multipliers (1 000 = 1.0x).
pub const MILLI_DENOM: u128 = 1_000;

/// How freshly minted emission is spread over the accounting pools (basis points).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmissionSplit {
    pub mining_rewards_bps: u16,
    pub validator_reward_bps: u16,
    pub staking_bps: u16,
    pub research_access_bps: u16,
    pub treasury_bps: u16,
    pub governance_bps: u16,
    pub transaction_fee_bps: u16,
}

impl Default for EmissionSplit {
    fn default() -> Self {
        Self {
            mining_rewards_bps: 4_000,
            validator_reward_bps: 2_000,
            staking_bps: 1_000,
            research_access_bps: 1_000,
            treasury_bps: 1_000,
            governance_bps: 500,
            transaction_fee_bps: 500,
        }
    }
}

impl EmissionSplit {
    pub fn total_bps(&self) -> u32 {
        [
            self.mining_rewards_bps,
            self.validator_reward_bps,
            self.staking_bps,
            self.research_access_bps,
            self.treasury_bps,
            self.governance_bps,
            self.transaction_fee_bps,
        ]
        .iter()
        .map(|bps| *bps as u32)
        .sum()
    }
}

/// Parameters controlling emission, rewards and fees.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EconomicsParams {
    /// Emission at block height 0 with no research value (E0), in µEKA.
    pub initial_emission_micro: MicroEka,
    /// Exponential decay per block height (λ).
    pub decay_lambda: Decimal,
    /// Research boost per µEKA of cumulative research value (α).
    pub research_alpha: Decimal,
    /// Ceiling on cumulative emission in µEKA.
    pub soft_cap_micro: MicroEka,
    /// Miner reward before complexity, significance, difficulty and health scaling.
    pub base_miner_reward_micro: MicroEka,
    /// Validator reward before significance, collaboration and health scaling.
    pub base_validator_reward_micro: MicroEka,
    /// Validators also earn `total_research_value / research_contribution_divisor` (0.1%).
    pub research_contribution_divisor: u128,
    /// Added to the 1.0x significance multiplier per tier (milli).
    pub significance_step_milli: u32,
    /// Added to the 1.0x difficulty factor per difficulty point (milli).
    pub difficulty_step_milli: u32,
    /// Multiplier for group work (milli); solo work is always 1.0x.
    pub collaboration_bonus_milli: u32,
    /// Fee charged on participant transfers, routed to the transaction-fee pool.
    pub transfer_fee_bps: u16,
    pub emission_split: EmissionSplit,
}

impl Default for EconomicsParams {
    fn default() -> Self {
        Self {
            initial_emission_micro: eka(50),
            // 0.00001 per block
            decay_lambda: Decimal::new(1, 5),
            // 1e-12 per µEKA: 1 000 EKA of research adds 10% emission
            research_alpha: Decimal::new(1, 12),
            // 100 million EKA
            soft_cap_micro: eka(100_000_000),
            base_miner_reward_micro: eka(10),
            base_validator_reward_micro: eka(1),
            research_contribution_divisor: 1_000,
            significance_step_milli: 250,
            difficulty_step_milli: 100,
            collaboration_bonus_milli: 1_500,
            // 0.1%
            transfer_fee_bps: 10,
            emission_split: EmissionSplit::default(),
        }
    }
}

impl EconomicsParams {
    /// Reject parameter sets that would break emission or pool accounting.
    pub fn validate(&self) -> Result<(), EconomicsError> {
        if self.initial_emission_micro == 0 {
            return Err(EconomicsError::InvalidParameter(
                "initial_emission_micro must be positive",
            ));
        }
        if self.decay_lambda.is_sign_negative() {
            return Err(EconomicsError::InvalidParameter(
                "decay_lambda must not be negative",
            ));
        }
        if self.research_alpha.is_sign_negative() {
            return Err(EconomicsError::InvalidParameter(
                "research_alpha must not be negative",
            ));
        }
        if self.research_contribution_divisor == 0 {
            return Err(EconomicsError::InvalidParameter(
                "research_contribution_divisor must be positive",
            ));
        }
        if self.emission_split.total_bps() != BPS_DENOM as u32 {
            return Err(EconomicsError::InvalidParameter(
                "emission split must total 10000 bps",
            ));
        }
        if self.transfer_fee_bps as u128 > BPS_DENOM {
            return Err(EconomicsError::InvalidParameter(
                "transfer_fee_bps cannot exceed 10000",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let params = EconomicsParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.emission_split.total_bps(), 10_000);
        assert_eq!(params.initial_emission_micro, eka(50));
    }

    #[test]
    fn rejects_unbalanced_split() {
        let mut params = EconomicsParams::default();
        params.emission_split.treasury_bps += 1;
        assert_eq!(
            params.validate(),
            Err(EconomicsError::InvalidParameter(
                "emission split must total 10000 bps"
            ))
        );
    }

    #[test]
    fn rejects_negative_decay() {
        let params = EconomicsParams {
            decay_lambda: Decimal::new(-1, 3),
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn params_survive_json() {
        let params = EconomicsParams::default();
        let json = serde_json::to_string(&params).unwrap();
        let back: EconomicsParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
    }
}
