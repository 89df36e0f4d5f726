use chrono::Utc;
use eureka_types::Address;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Default number of events retained in memory.
pub const DEFAULT_AUDIT_CAPACITY: usize = 1_024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

/// Security-relevant ledger control events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SecurityEvent {
    EmergencyPaused {
        by: Address,
    },
    EmergencyUnpaused {
        by: Address,
    },
    HealthUpdated {
        by: Address,
        old_score: u16,
        new_score: u16,
        scaling_rate: u32,
    },
    UnauthorizedControl {
        caller: Address,
        action: String,
    },
    RelaxedVerificationEnabled,
}

impl SecurityEvent {
    pub fn severity(&self) -> Severity {
        match self {
            SecurityEvent::EmergencyPaused { .. } => Severity::Critical,
            SecurityEvent::EmergencyUnpaused { .. } => Severity::High,
            SecurityEvent::HealthUpdated { new_score, .. } => {
                if *new_score == 0 {
                    Severity::High
                } else if *new_score < 50 {
                    Severity::Medium
                } else {
                    Severity::Info
                }
            }
            SecurityEvent::UnauthorizedControl { .. } => Severity::High,
            SecurityEvent::RelaxedVerificationEnabled => Severity::High,
        }
    }

    /// Address that triggered the event, if any
    pub fn actor(&self) -> Option<Address> {
        match self {
            SecurityEvent::EmergencyPaused { by }
            | SecurityEvent::EmergencyUnpaused { by }
            | SecurityEvent::HealthUpdated { by, .. } => Some(*by),
            SecurityEvent::UnauthorizedControl { caller, .. } => Some(*caller),
            SecurityEvent::RelaxedVerificationEnabled => None,
        }
    }
}

/// Audit record wrapping a security event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: Uuid,
    /// Unix seconds.
    pub timestamp: i64,
    pub severity: Severity,
    pub event: SecurityEvent,
}

/// Bounded in-memory audit trail; the oldest entries are dropped first.
#[derive(Debug, Clone)]
pub struct AuditLog {
    events: VecDeque<AuditEvent>,
    capacity: usize,
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_AUDIT_CAPACITY)
    }
}

impl AuditLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Log a security event
    pub fn record(&mut self, event: SecurityEvent) -> &AuditEvent {
        let audit_event = AuditEvent {
            id: Uuid::new_v4(),
            timestamp: Utc::now().timestamp(),
            severity: event.severity(),
            event,
        };

        let rendered = serde_json::to_string(&audit_event.event)
            .unwrap_or_else(|_| format!("{:?}", audit_event.event));
        match audit_event.severity {
            Severity::Critical | Severity::High => {
                error!(target: "security", "Security event: {}", rendered)
            }
            Severity::Medium => warn!(target: "security", "Security event: {}", rendered),
            Severity::Low | Severity::Info => {
                info!(target: "security", "Security event: {}", rendered)
            }
        }

        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(audit_event);
        &self.events[self.events.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Most recent `limit` events, newest last.
    pub fn recent(&self, limit: usize) -> Vec<AuditEvent> {
        let skip = self.events.len().saturating_sub(limit);
        self.events.iter().skip(skip).cloned().collect()
    }

    pub fn at_least(&self, severity: Severity) -> impl Iterator<Item = &AuditEvent> + '_ {
        self.events.iter().filter(move |e| e.severity >= severity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_security_event_severity() {
        let operator = Address::from_label("operator");
        assert_eq!(
            SecurityEvent::EmergencyPaused { by: operator }.severity(),
            Severity::Critical
        );
        let degraded = SecurityEvent::HealthUpdated {
            by: operator,
            old_score: 100,
            new_score: 20,
            scaling_rate: 4_000,
        };
        assert_eq!(degraded.severity(), Severity::Medium);
        assert_eq!(degraded.actor(), Some(operator));
        assert_eq!(SecurityEvent::RelaxedVerificationEnabled.actor(), None);
    }

    #[test]
    fn test_log_is_bounded() {
        let mut log = AuditLog::with_capacity(2);
        let operator = Address::from_label("operator");
        for score in [90, 80, 70] {
            log.record(SecurityEvent::HealthUpdated {
                by: operator,
                old_score: 100,
                new_score: score,
                scaling_rate: 10_000,
            });
        }
        assert_eq!(log.len(), 2);
        let recent = log.recent(10);
        assert!(matches!(
            &recent[0].event,
            SecurityEvent::HealthUpdated { new_score: 80, .. }
        ));
    }

    #[test]
    fn test_severity_filter() {
        let mut log = AuditLog::default();
        let caller = Address::from_label("mallory");
        log.record(SecurityEvent::UnauthorizedControl {
            caller,
            action: "emergency_pause".into(),
        });
        log.record(SecurityEvent::HealthUpdated {
            by: Address::from_label("operator"),
            old_score: 100,
            new_score: 90,
            scaling_rate: 10_000,
        });
        assert_eq!(log.at_least(Severity::High).count(), 1);
        assert_eq!(log.recent(1)[0].severity, Severity::Info);
    }
}
