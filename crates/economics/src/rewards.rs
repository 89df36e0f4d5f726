//! Research value, miner reward and validator reward formulas.
//!
//! All multipliers are integer fixed-point: milli (1000 = 1.0x) or basis points
//! (10000 = 100%). Each step floors, so rewards never exceed the exact value.

use crate::errors::EconomicsError;
use crate::params::{EconomicsParams, BPS_DENOM, MILLI_DENOM};
use eureka_types::{
    eka, MicroEka, WorkCategory, WorkType, MAX_COMPLEXITY, MAX_DIFFICULTY,
    MAX_SIGNIFICANCE_TIER, MIN_DIFFICULTY,
};

/// Research value of a category before complexity and significance scaling.
pub const fn base_research_value(category: WorkCategory) -> MicroEka {
    match category {
        WorkCategory::Millennium => eka(1_000),
        WorkCategory::MajorTheorem => eka(500),
        WorkCategory::StandardResearch => eka(100),
        WorkCategory::Collaborative => eka(250),
    }
}

pub fn validate_complexity(complexity: u8) -> Result<(), EconomicsError> {
    if complexity > MAX_COMPLEXITY {
        return Err(EconomicsError::InvalidComplexity(complexity));
    }
    Ok(())
}

pub fn validate_difficulty(difficulty: u8) -> Result<(), EconomicsError> {
    if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&difficulty) {
        return Err(EconomicsError::InvalidDifficulty(difficulty));
    }
    Ok(())
}

/// `1.0 + step · tier`, in milli.
pub fn significance_multiplier_milli(
    tier: u8,
    p: &EconomicsParams,
) -> Result<u32, EconomicsError> {
    if tier > MAX_SIGNIFICANCE_TIER {
        return Err(EconomicsError::InvalidSignificance(tier));
    }
    Ok(MILLI_DENOM as u32 + p.significance_step_milli * tier as u32)
}

/// `1.0 + step · difficulty`, in milli.
pub fn difficulty_factor_milli(difficulty: u8, p: &EconomicsParams) -> Result<u32, EconomicsError> {
    validate_difficulty(difficulty)?;
    Ok(MILLI_DENOM as u32 + p.difficulty_step_milli * difficulty as u32)
}

/// Group work earns the collaboration bonus; solo work is 1.0x.
pub fn collaboration_bonus_milli(category: WorkCategory, p: &EconomicsParams) -> u32 {
    if category.is_collaborative() {
        p.collaboration_bonus_milli
    } else {
        MILLI_DENOM as u32
    }
}

fn scale(value: MicroEka, numer: u128, denom: u128, what: &'static str) -> Result<MicroEka, EconomicsError> {
    value
        .checked_mul(numer)
        .map(|v| v / denom)
        .ok_or(EconomicsError::CalculationOverflow(what))
}

/// `base · (100 + complexity)/100 · significance`.
fn complexity_and_significance(
    base: MicroEka,
    complexity: u8,
    tier: u8,
    p: &EconomicsParams,
) -> Result<MicroEka, EconomicsError> {
    validate_complexity(complexity)?;
    let multiplier = significance_multiplier_milli(tier, p)?;
    let value = scale(base, 100 + complexity as u128, 100, "complexity scaling")?;
    scale(value, multiplier as u128, MILLI_DENOM, "significance scaling")
}

/// Research value credited for a discovery.
pub fn research_value(
    work_type: WorkType,
    complexity: u8,
    tier: u8,
    p: &EconomicsParams,
) -> Result<MicroEka, EconomicsError> {
    complexity_and_significance(base_research_value(work_type.category()), complexity, tier, p)
}

/// Miner reward before difficulty and health scaling.
pub fn base_miner_reward(
    complexity: u8,
    tier: u8,
    p: &EconomicsParams,
) -> Result<MicroEka, EconomicsError> {
    complexity_and_significance(p.base_miner_reward_micro, complexity, tier, p)
}

/// `baseMinerReward × difficultyFactor × healthScaling`.
pub fn miner_reward(
    complexity: u8,
    tier: u8,
    difficulty: u8,
    scaling_rate_bps: u32,
    p: &EconomicsParams,
) -> Result<MicroEka, EconomicsError> {
    let base = base_miner_reward(complexity, tier, p)?;
    let factor = difficulty_factor_milli(difficulty, p)?;
    let with_difficulty = scale(base, factor as u128, MILLI_DENOM, "difficulty scaling")?;
    scale(with_difficulty, scaling_rate_bps as u128, BPS_DENOM, "health scaling")
}

/// `0.1%` of cumulative research value (with the default divisor).
pub fn research_contribution(total_research_value: MicroEka, p: &EconomicsParams) -> MicroEka {
    total_research_value / p.research_contribution_divisor.max(1)
}

/// Reward paid to each active validator for one accepted discovery:
/// `base × significance × collaboration × healthScaling + researchContribution`.
pub fn validator_reward(
    tier: u8,
    category: WorkCategory,
    total_research_value: MicroEka,
    scaling_rate_bps: u32,
    p: &EconomicsParams,
) -> Result<MicroEka, EconomicsError> {
    let significance = significance_multiplier_milli(tier, p)?;
    let collaboration = collaboration_bonus_milli(category, p);

    let base = scale(
        p.base_validator_reward_micro,
        significance as u128,
        MILLI_DENOM,
        "validator significance",
    )?;
    let base = scale(base, collaboration as u128, MILLI_DENOM, "collaboration bonus")?;
    let base = scale(base, scaling_rate_bps as u128, BPS_DENOM, "validator health scaling")?;

    base.checked_add(research_contribution(total_research_value, p))
        .ok_or(EconomicsError::CalculationOverflow("validator reward"))
}
