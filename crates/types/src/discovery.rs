//! Discovery records produced by accepted proofs or direct submissions.

use crate::{Address, BlockHeight, MicroEka, WorkType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Global, strictly increasing discovery identifier (first discovery is 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiscoveryId(pub u64);

impl fmt::Display for DiscoveryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "discovery#{}", self.0)
    }
}

/// Path through which a discovery entered the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryOrigin {
    /// Created by an accepted proof-of-work submission.
    FromProof,
    /// Created by a direct research submission.
    Direct,
}

/// Verification outcome written once by the automatic validator rewarder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Verification {
    /// Active validators that were rewarded for this discovery.
    pub validators: u32,
    /// Total µEKA paid to those validators.
    pub total_reward: MicroEka,
}

/// Immutable record of a verified unit of research value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discovery {
    pub id: DiscoveryId,
    pub work_type: WorkType,
    pub complexity: u8,
    pub significance_tier: u8,
    pub research_value: MicroEka,
    pub researcher: Address,
    pub origin: DiscoveryOrigin,
    /// Unix seconds at creation.
    pub timestamp: i64,
    pub block_height: BlockHeight,
    /// Set exactly once, in the same transaction that creates the discovery.
    pub verification: Option<Verification>,
}

impl Discovery {
    pub fn is_verified(&self) -> bool {
        self.verification.is_some()
    }

    /// Record the verification outcome. Returns `false` if it was already set.
    pub fn record_verification(&mut self, verification: Verification) -> bool {
        if self.verification.is_some() {
            return false;
        }
        self.verification = Some(verification);
        true
    }
}
