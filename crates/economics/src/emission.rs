//! Asymptotic emission for discovery events.
//!
//! Formula:
//! `E(h) = max(1, E0 · e^(−λ·h) · (1 + α·R))`
//!
//! where:
//! - `E0` = initial_emission_micro
//! - `λ`  = decay_lambda
//! - `h`  = block height at the event
//! - `α`  = research_alpha
//! - `R`  = cumulative research value (µEKA)
//!
//! The result is then clipped to the room left under the soft cap.

use crate::errors::EconomicsError;
use crate::params::EconomicsParams;
use eureka_types::{BlockHeight, MicroEka};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};

/// Past this exponent `e^(−λh)` is far below one µEKA for any sane `E0`.
const MAX_DECAY_EXPONENT: u32 = 60;

/// Emission outcome for a single event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmissionResult {
    pub block_height: BlockHeight,
    /// Curve value before soft-cap clipping.
    pub raw_emission_micro: MicroEka,
    /// Amount actually minted.
    pub emission_micro: MicroEka,
    pub cumulative_after_micro: MicroEka,
    pub remaining_cap_micro: MicroEka,
}

/// One sample of the emission curve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmissionCurvePoint {
    pub block_height: BlockHeight,
    pub emission_micro: MicroEka,
}

fn to_decimal(value: u128, what: &'static str) -> Result<Decimal, EconomicsError> {
    Decimal::from_u128(value).ok_or(EconomicsError::CalculationOverflow(what))
}

/// `e^x` for `0 ≤ x ≤ MAX_DECAY_EXPONENT`.
///
/// The Taylor series only converges well on `[0, 1)`, so the integer part is
/// taken as a power of `e` and only the fraction goes through the series.
fn exp_positive(x: Decimal) -> Option<Decimal> {
    let whole = x.trunc();
    let fraction = x.checked_sub(whole)?;
    let integer_part = Decimal::E.checked_powu(whole.to_u64()?)?;
    let fraction_part = if fraction.is_zero() {
        Decimal::ONE
    } else {
        fraction.checked_exp()?
    };
    integer_part.checked_mul(fraction_part)
}

/// Curve value at `height` for the given cumulative research value, ignoring the soft cap.
pub fn emission_at(
    height: BlockHeight,
    total_research_value: MicroEka,
    p: &EconomicsParams,
) -> Result<MicroEka, EconomicsError> {
    let exponent = p
        .decay_lambda
        .checked_mul(Decimal::from(height))
        .ok_or(EconomicsError::CalculationOverflow("decay exponent"))?;

    if exponent > Decimal::from(MAX_DECAY_EXPONENT) {
        return Ok(1);
    }

    let e0 = to_decimal(p.initial_emission_micro, "initial emission")?;
    let decayed = if exponent.is_zero() {
        e0
    } else {
        // e^(−x) as 1 / e^x keeps the series on the positive side.
        let growth = exp_positive(exponent)
            .ok_or(EconomicsError::CalculationOverflow("decay exponential"))?;
        e0.checked_div(growth)
            .ok_or(EconomicsError::CalculationOverflow("decay division"))?
    };

    let research = to_decimal(total_research_value, "research value")?;
    let boost = p
        .research_alpha
        .checked_mul(research)
        .and_then(|r| r.checked_add(Decimal::ONE))
        .ok_or(EconomicsError::CalculationOverflow("research boost"))?;

    let value = decayed
        .checked_mul(boost)
        .ok_or(EconomicsError::CalculationOverflow("boosted emission"))?;

    let micro = value
        .floor()
        .to_u128()
        .ok_or(EconomicsError::CalculationOverflow("emission to integer"))?;

    Ok(micro.max(1))
}

/// Clamp a requested emission to the room left under the soft cap.
/// Returns `(allowed_emission, remaining_after)`.
pub fn clamp_to_soft_cap(
    requested: MicroEka,
    already_emitted: MicroEka,
    p: &EconomicsParams,
) -> (MicroEka, MicroEka) {
    let remaining = p.soft_cap_micro.saturating_sub(already_emitted);
    let allowed = requested.min(remaining);
    (allowed, remaining.saturating_sub(allowed))
}

/// Emission for an event at `height`, clipped so cumulative emission never passes the soft cap.
pub fn emission_for_event(
    height: BlockHeight,
    total_research_value: MicroEka,
    cumulative_emission: MicroEka,
    p: &EconomicsParams,
) -> Result<EmissionResult, EconomicsError> {
    if cumulative_emission > p.soft_cap_micro {
        return Err(EconomicsError::SoftCapExceeded {
            cap: p.soft_cap_micro,
            issued: cumulative_emission,
        });
    }

    let raw = emission_at(height, total_research_value, p)?;
    let (allowed, remaining) = clamp_to_soft_cap(raw, cumulative_emission, p);

    if allowed < raw {
        tracing::warn!(
            target: "economics",
            "Emission at height {} clipped by soft cap: {} -> {}",
            height,
            raw,
            allowed
        );
    }

    let cumulative_after = cumulative_emission
        .checked_add(allowed)
        .ok_or(EconomicsError::CalculationOverflow("cumulative emission"))?;

    Ok(EmissionResult {
        block_height: height,
        raw_emission_micro: raw,
        emission_micro: allowed,
        cumulative_after_micro: cumulative_after,
        remaining_cap_micro: remaining,
    })
}

/// Sample the curve from `start` to `end` (inclusive) every `step` heights.
pub fn emission_curve(
    start: BlockHeight,
    end: BlockHeight,
    step: BlockHeight,
    total_research_value: MicroEka,
    p: &EconomicsParams,
) -> Result<Vec<EmissionCurvePoint>, EconomicsError> {
    if step == 0 {
        return Err(EconomicsError::InvalidParameter("curve step must be positive"));
    }

    let mut points = Vec::new();
    let mut height = start;
    while height <= end {
        points.push(EmissionCurvePoint {
            block_height: height,
            emission_micro: emission_at(height, total_research_value, p)?,
        });
        height = match height.checked_add(step) {
            Some(next) => next,
            None => break,
        };
    }
    Ok(points)
}
