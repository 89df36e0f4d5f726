//! Security state: emergency pause, network health and reward scaling.
//!
//! Held as named fields; packed into a single `u64` only when serialized:
//!
//! | bits   | field          |
//! |--------|----------------|
//! | 0      | paused         |
//! | 8..24  | health score   |
//! | 32..64 | scaling rate   |

use crate::circuit_breaker::{HealthPolicy, FULL_SCALING_BPS, MAX_HEALTH_SCORE};
use crate::SecurityError;
use serde::{Deserialize, Serialize};

const PAUSED_BIT: u64 = 1;
const HEALTH_SHIFT: u32 = 8;
const HEALTH_MASK: u64 = 0xFFFF;
const SCALING_SHIFT: u32 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct SecurityState {
    pub paused: bool,
    pub health_score: u16,
    /// Reward scaling in basis points, derived from `health_score`.
    pub scaling_rate: u32,
}

impl Default for SecurityState {
    fn default() -> Self {
        Self {
            paused: false,
            health_score: MAX_HEALTH_SCORE,
            scaling_rate: FULL_SCALING_BPS,
        }
    }
}

impl SecurityState {
    /// Reject mutating work while the emergency pause is set.
    pub fn ensure_active(&self) -> Result<(), SecurityError> {
        if self.paused {
            return Err(SecurityError::ContractPaused);
        }
        Ok(())
    }

    /// Store a new health score and recompute the scaling rate.
    pub fn set_health(&mut self, score: u16, policy: &HealthPolicy) -> Result<(), SecurityError> {
        if score > MAX_HEALTH_SCORE {
            return Err(SecurityError::InvalidHealthScore(score));
        }
        self.health_score = score;
        self.scaling_rate = policy.scaling_rate_bps(score);
        Ok(())
    }

    pub fn pack(&self) -> u64 {
        let mut packed = 0u64;
        if self.paused {
            packed |= PAUSED_BIT;
        }
        packed |= (self.health_score as u64 & HEALTH_MASK) << HEALTH_SHIFT;
        packed |= (self.scaling_rate as u64) << SCALING_SHIFT;
        packed
    }

    pub fn unpack(packed: u64) -> Result<Self, SecurityError> {
        let state = Self {
            paused: packed & PAUSED_BIT != 0,
            health_score: ((packed >> HEALTH_SHIFT) & HEALTH_MASK) as u16,
            scaling_rate: (packed >> SCALING_SHIFT) as u32,
        };
        if state.health_score > MAX_HEALTH_SCORE || state.scaling_rate > FULL_SCALING_BPS {
            return Err(SecurityError::CorruptState(packed));
        }
        Ok(state)
    }
}

impl From<SecurityState> for u64 {
    fn from(state: SecurityState) -> Self {
        state.pack()
    }
}

impl TryFrom<u64> for SecurityState {
    type Error = SecurityError;

    fn try_from(packed: u64) -> Result<Self, Self::Error> {
        SecurityState::unpack(packed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_healthy_and_unpaused() {
        let state = SecurityState::default();
        assert!(!state.paused);
        assert_eq!(state.health_score, 100);
        assert_eq!(state.scaling_rate, FULL_SCALING_BPS);
        assert!(state.ensure_active().is_ok());
    }

    #[test]
    fn pack_layout() {
        let state = SecurityState {
            paused: true,
            health_score: 40,
            scaling_rate: 8_000,
        };
        assert_eq!(state.pack(), 1 | (40 << 8) | (8_000u64 << 32));
        assert_eq!(SecurityState::unpack(state.pack()).unwrap(), state);
    }

    #[test]
    fn unpack_rejects_out_of_range_fields() {
        assert!(SecurityState::unpack(101 << 8).is_err());
        assert!(SecurityState::unpack(10_001u64 << 32).is_err());
    }

    #[test]
    fn serializes_as_packed_integer() {
        let state = SecurityState {
            paused: false,
            health_score: 20,
            scaling_rate: 4_000,
        };
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(json, state.pack().to_string());
        let back: SecurityState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn health_update_rescales_and_validates() {
        let mut state = SecurityState::default();
        let policy = HealthPolicy::default();
        state.set_health(25, &policy).unwrap();
        assert_eq!(state.scaling_rate, 5_000);
        assert_eq!(
            state.set_health(101, &policy),
            Err(SecurityError::InvalidHealthScore(101))
        );
        assert_eq!(state.health_score, 25);
    }

    #[test]
    fn paused_state_rejects_work() {
        let state = SecurityState {
            paused: true,
            ..Default::default()
        };
        assert_eq!(state.ensure_active(), Err(SecurityError::ContractPaused));
    }
}
