//! Eureka Economics: Asymptotic Emission, Burns & Reward Tables
//!
//! Implements the economic rules of discovery mining:
//! - Per-event emission decaying with block height and boosted by cumulative research value
//! - Soft-cap enforcement on cumulative emission
//! - Category-tiered burn rates for direct discoveries
//! - Miner and validator reward formulas (integer fixed-point, no floats on balances)
//! - Deterministic split of fresh emission across the accounting pools

pub mod burn;
pub mod distribution;
pub mod emission;
pub mod errors;
pub mod params;
pub mod rewards;

pub use burn::*;
pub use distribution::*;
pub use emission::*;
pub use errors::*;
pub use params::*;
pub use rewards::*;

/// Module version for API introspection
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
