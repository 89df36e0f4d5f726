//! Health-driven reward circuit breaker.
//!
//! Network health (0..=100) throttles every reward payout. At or above the
//! configured floor payouts run at full rate; below it they scale down in
//! proportion to health, reaching zero at health 0.

use serde::{Deserialize, Serialize};

/// Full payout rate in basis points.
pub const FULL_SCALING_BPS: u32 = 10_000;
/// Highest accepted health score.
pub const MAX_HEALTH_SCORE: u16 = 100;

/// Configuration for the circuit breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthPolicy {
    /// Health at or above which rewards are not throttled.
    pub health_floor: u16,
}

impl Default for HealthPolicy {
    fn default() -> Self {
        Self { health_floor: 50 }
    }
}

/// Coarse view of the breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CircuitBreakerState {
    /// Rewards paid in full.
    Closed,
    /// Rewards scaled down proportionally.
    Throttled,
    /// Health is zero; reward payouts are zero.
    Open,
}

impl HealthPolicy {
    /// Reward scaling for a health score, in basis points.
    ///
    /// Monotonic non-decreasing in `health`.
    pub fn scaling_rate_bps(&self, health: u16) -> u32 {
        let health = health.min(MAX_HEALTH_SCORE);
        if self.health_floor == 0 || health >= self.health_floor {
            return FULL_SCALING_BPS;
        }
        FULL_SCALING_BPS * health as u32 / self.health_floor as u32
    }

    pub fn state_for(&self, health: u16) -> CircuitBreakerState {
        match self.scaling_rate_bps(health) {
            FULL_SCALING_BPS => CircuitBreakerState::Closed,
            0 => CircuitBreakerState::Open,
            _ => CircuitBreakerState::Throttled,
        }
    }

    pub fn validate(&self) -> Result<(), crate::SecurityError> {
        if self.health_floor > MAX_HEALTH_SCORE {
            return Err(crate::SecurityError::InvalidHealthScore(self.health_floor));
        }
        Ok(())
    }
}
