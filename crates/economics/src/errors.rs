use eureka_types::MicroEka;
use thiserror::Error;

/// Errors that can occur while computing emission, burns and rewards.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EconomicsError {
    #[error("invalid economics parameter: {0}")]
    InvalidParameter(&'static str),

    #[error("complexity {0} is outside 0..=100")]
    InvalidComplexity(u8),

    #[error("significance tier {0} is outside 0..=10")]
    InvalidSignificance(u8),

    #[error("difficulty {0} is outside 1..=50")]
    InvalidDifficulty(u8),

    #[error("cumulative emission {issued} exceeds soft cap {cap}")]
    SoftCapExceeded { cap: MicroEka, issued: MicroEka },

    #[error("arithmetic overflow while performing economics calculation: {0}")]
    CalculationOverflow(&'static str),
}
