//! Error types for the discovery-mining ledger

use eureka_economics::EconomicsError;
use eureka_security::SecurityError;
use eureka_treasury::TreasuryError;
use eureka_types::{Address, MicroEka, SessionId};
use thiserror::Error;

/// Every rejection a ledger operation can return. A rejected operation
/// leaves the ledger exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("invalid work type code {0}")]
    InvalidWorkType(u8),

    #[error("invalid difficulty {0} (expected 1..=50)")]
    InvalidDifficulty(u8),

    #[error("contract is paused")]
    ContractPaused,

    #[error("{miner} already holds {limit} active sessions")]
    TooManyActiveSessions { miner: Address, limit: usize },

    #[error("{0} not found")]
    SessionNotFound(SessionId),

    #[error("{0} is not active")]
    SessionNotActive(SessionId),

    #[error("{caller} is not authorized to {action}")]
    Unauthorized { caller: Address, action: String },

    #[error("proof for {session} rejected: {reason}")]
    ProofRejected {
        session: SessionId,
        reason: &'static str,
    },

    #[error("insufficient balance in {holder}: needed {needed}, available {available}")]
    InsufficientBalance {
        holder: String,
        needed: MicroEka,
        available: MicroEka,
    },

    #[error("invalid complexity {0} (expected 0..=100)")]
    InvalidComplexity(u8),

    #[error("invalid significance tier {0} (expected 0..=10)")]
    InvalidSignificance(u8),

    #[error("invalid health score {0} (expected 0..=100)")]
    InvalidHealthScore(u16),

    #[error("amount must be positive")]
    InvalidAmount,

    #[error("stake {stake} below minimum {minimum}")]
    StakeTooLow { stake: MicroEka, minimum: MicroEka },

    #[error("validator {0} is already registered")]
    ValidatorAlreadyRegistered(Address),

    #[error("validator {0} not found")]
    ValidatorNotFound(Address),

    #[error("invalid ledger configuration: {0}")]
    InvalidConfig(String),

    #[error("economics error: {0}")]
    Economics(EconomicsError),

    #[error("arithmetic overflow: {0}")]
    Overflow(String),

    #[error("ledger invariant violated: {0}")]
    InvariantViolation(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;

impl From<EconomicsError> for LedgerError {
    fn from(err: EconomicsError) -> Self {
        match err {
            EconomicsError::InvalidComplexity(c) => LedgerError::InvalidComplexity(c),
            EconomicsError::InvalidSignificance(t) => LedgerError::InvalidSignificance(t),
            EconomicsError::InvalidDifficulty(d) => LedgerError::InvalidDifficulty(d),
            other => LedgerError::Economics(other),
        }
    }
}

impl From<TreasuryError> for LedgerError {
    fn from(err: TreasuryError) -> Self {
        match err {
            TreasuryError::InsufficientBalance {
                account,
                needed,
                available,
            } => LedgerError::InsufficientBalance {
                holder: account.to_string(),
                needed,
                available,
            },
            TreasuryError::InsufficientPoolBalance {
                pool,
                needed,
                available,
            } => LedgerError::InsufficientBalance {
                holder: format!("{pool} pool"),
                needed,
                available,
            },
            TreasuryError::Overflow(what) => LedgerError::Overflow(what),
        }
    }
}

impl From<SecurityError> for LedgerError {
    fn from(err: SecurityError) -> Self {
        match err {
            SecurityError::ContractPaused => LedgerError::ContractPaused,
            SecurityError::Unauthorized { caller, action } => LedgerError::Unauthorized {
                caller,
                action: action.to_string(),
            },
            SecurityError::InvalidHealthScore(score) => LedgerError::InvalidHealthScore(score),
            SecurityError::CorruptState(packed) => {
                LedgerError::InvariantViolation(format!("corrupt security state {packed:#x}"))
            }
        }
    }
}
