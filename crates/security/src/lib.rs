//! Eureka security controls
//!
//! Owns the emergency pause switch, the network-health score and the reward
//! scaling it drives, plus the operator role that may change them. Every
//! control action (and every refused one) lands in the audit trail.
//!
//! ## Key Invariants
//! - While paused, only `emergency_unpause` changes the state
//! - Health stays within 0..=100 and scaling is always derived from it
//! - Only the configured operator may pause, unpause or update health

pub mod audit;
pub mod circuit_breaker;
pub mod state;

pub use audit::{AuditEvent, AuditLog, SecurityEvent, Severity, DEFAULT_AUDIT_CAPACITY};
pub use circuit_breaker::{
    CircuitBreakerState, HealthPolicy, FULL_SCALING_BPS, MAX_HEALTH_SCORE,
};
pub use state::SecurityState;

use eureka_types::Address;
use tracing::info;

/// Security-related errors
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SecurityError {
    #[error("contract is paused")]
    ContractPaused,
    #[error("{caller} is not authorized to {action}")]
    Unauthorized { caller: Address, action: &'static str },
    #[error("health score {0} outside 0..=100")]
    InvalidHealthScore(u16),
    #[error("corrupt packed security state {0:#018x}")]
    CorruptState(u64),
}

/// Security manager coordinating pause, health and the audit trail
#[derive(Debug, Clone)]
pub struct SecurityManager {
    state: SecurityState,
    policy: HealthPolicy,
    operator: Address,
    audit: AuditLog,
}

impl SecurityManager {
    pub fn new(operator: Address, policy: HealthPolicy) -> Result<Self, SecurityError> {
        Self::with_state(SecurityState::default(), operator, policy)
    }

    /// Resume from a persisted state.
    pub fn with_state(
        state: SecurityState,
        operator: Address,
        policy: HealthPolicy,
    ) -> Result<Self, SecurityError> {
        policy.validate()?;
        Ok(Self {
            state,
            policy,
            operator,
            audit: AuditLog::default(),
        })
    }

    pub fn state(&self) -> SecurityState {
        self.state
    }

    pub fn operator(&self) -> Address {
        self.operator
    }

    pub fn policy(&self) -> HealthPolicy {
        self.policy
    }

    pub fn scaling_rate_bps(&self) -> u32 {
        self.state.scaling_rate
    }

    pub fn circuit_state(&self) -> CircuitBreakerState {
        self.policy.state_for(self.state.health_score)
    }

    pub fn ensure_active(&self) -> Result<(), SecurityError> {
        self.state.ensure_active()
    }

    fn authorize(&mut self, caller: &Address, action: &'static str) -> Result<(), SecurityError> {
        if caller != &self.operator {
            self.audit.record(SecurityEvent::UnauthorizedControl {
                caller: *caller,
                action: action.to_string(),
            });
            return Err(SecurityError::Unauthorized {
                caller: *caller,
                action,
            });
        }
        Ok(())
    }

    /// Set the pause bit. Pausing an already paused ledger is a no-op.
    pub fn emergency_pause(&mut self, caller: &Address) -> Result<(), SecurityError> {
        self.authorize(caller, "emergency_pause")?;
        if !self.state.paused {
            self.state.paused = true;
            self.audit.record(SecurityEvent::EmergencyPaused { by: *caller });
        }
        Ok(())
    }

    /// Clear the pause bit. Unpausing a running ledger is a no-op.
    pub fn emergency_unpause(&mut self, caller: &Address) -> Result<(), SecurityError> {
        self.authorize(caller, "emergency_unpause")?;
        if self.state.paused {
            self.state.paused = false;
            self.audit.record(SecurityEvent::EmergencyUnpaused { by: *caller });
        }
        Ok(())
    }

    /// Store a new health score (0..=100) and recompute reward scaling.
    pub fn update_network_health(
        &mut self,
        caller: &Address,
        score: u16,
    ) -> Result<SecurityState, SecurityError> {
        self.state.ensure_active()?;
        self.authorize(caller, "update_network_health")?;

        let old_score = self.state.health_score;
        let mut next = self.state;
        next.set_health(score, &self.policy)?;
        self.state = next;

        info!(
            target: "security",
            "Network health {} -> {} (scaling {} bps)",
            old_score,
            score,
            next.scaling_rate
        );
        self.audit.record(SecurityEvent::HealthUpdated {
            by: *caller,
            old_score,
            new_score: score,
            scaling_rate: next.scaling_rate,
        });
        Ok(next)
    }

    pub fn record(&mut self, event: SecurityEvent) {
        self.audit.record(event);
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }
}
