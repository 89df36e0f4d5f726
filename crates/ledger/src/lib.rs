//! Eureka discovery-mining ledger
//!
//! Deterministic state machine that turns submitted computational proofs
//! into token emission, burns and validator rewards:
//!
//! `start_session` → `submit_proof` → miner reward + emission → discovery
//! registry → automatic validator rewards → pool and global state update.
//!
//! Direct submissions (`submit_discovery`) skip the session and burn part of
//! the research value instead of earning a miner reward.
//!
//! ## Key Invariants
//! - `total_supply - total_burned == Σ pool balances + Σ participant balances`
//! - Every operation is all-or-nothing; no balance is ever clamped at zero
//! - A session accepts at most one proof; only its miner may submit it
//! - While paused, every mutating call except unpause fails with `ContractPaused`

pub mod config;
mod discovery;
pub mod engine;
pub mod errors;
pub mod handle;
mod minting;
pub mod pow;
mod rewarder;
pub mod sessions;
pub mod snapshot;
mod staged;
pub mod state;

pub use config::{GenesisConfig, LedgerConfig, VerificationMode};
pub use engine::Ledger;
pub use errors::{LedgerError, Result};
pub use handle::LedgerHandle;
pub use pow::{find_nonce, proof_hash, threshold, verify_proof};
pub use sessions::parse_work_type;
pub use snapshot::{LedgerSnapshot, SNAPSHOT_VERSION};
pub use state::GlobalLedgerState;
