//! Validator registry records.

use crate::{Address, BlockHeight, MicroEka};
use serde::{Deserialize, Serialize};

/// A staked participant that is rewarded for every accepted discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    pub address: Address,
    /// µEKA locked in the staking pool.
    pub stake: MicroEka,
    pub active: bool,
    pub total_validations: u64,
    pub registered_at: BlockHeight,
}

impl Validator {
    pub fn new(address: Address, stake: MicroEka, registered_at: BlockHeight) -> Self {
        Self {
            address,
            stake,
            active: true,
            total_validations: 0,
            registered_at,
        }
    }
}
