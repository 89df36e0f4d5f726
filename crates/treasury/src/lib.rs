//! Eureka Treasury Module
//!
//! Holds the seven accounting pools, participant balances and the per-discovery
//! record of validator payouts. Every debit is checked; nothing here ever
//! clamps a balance at zero.

pub mod account_ledger;
pub mod errors;
pub mod pools;
pub mod reward_pool;

pub use account_ledger::{AccountLedger, InMemoryAccountLedger};
pub use errors::TreasuryError;
pub use pools::{PoolBalances, PoolKind};
pub use reward_pool::{Payouts, RewardSink};
