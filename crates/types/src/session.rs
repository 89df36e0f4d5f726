//! Mining session records.

use crate::{Address, BlockHeight, WorkType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Monotonic mining-session identifier (first session is 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session#{}", self.0)
    }
}

/// A reserved slot in which one miner may submit exactly one proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiningSession {
    pub id: SessionId,
    pub miner: Address,
    pub work_type: WorkType,
    /// 1..=50; divides the acceptance threshold.
    pub difficulty: u8,
    /// Unix seconds when the session was opened.
    pub start_time: i64,
    pub start_height: BlockHeight,
    pub active: bool,
    /// Discovery produced by the accepted proof, once completed.
    pub discovery: Option<crate::DiscoveryId>,
}

impl MiningSession {
    pub fn is_owned_by(&self, who: &Address) -> bool {
        &self.miner == who
    }
}
