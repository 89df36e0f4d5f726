//! Category-tiered burn rates for direct discovery submissions.

use crate::errors::EconomicsError;
use crate::params::BPS_DENOM;
use eureka_types::{MicroEka, WorkCategory};

/// Fixed burn table (basis points of research value).
pub const fn burn_rate_bps(category: WorkCategory) -> u16 {
    match category {
        WorkCategory::Millennium => 2_500,
        WorkCategory::MajorTheorem => 1_500,
        WorkCategory::StandardResearch => 1_000,
        WorkCategory::Collaborative => 1_200,
    }
}

/// Tokens a researcher must burn to register a discovery of `research_value`.
pub fn burn_amount(
    research_value: MicroEka,
    category: WorkCategory,
) -> Result<MicroEka, EconomicsError> {
    research_value
        .checked_mul(burn_rate_bps(category) as u128)
        .map(|v| v / BPS_DENOM)
        .ok_or(EconomicsError::CalculationOverflow("burn amount"))
}
