use crate::pools::PoolKind;
use eureka_types::{Address, MicroEka};
use thiserror::Error;

/// Balance movement failures. Any of these aborts the surrounding operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreasuryError {
    #[error("insufficient balance for {account}: needed {needed}, available {available}")]
    InsufficientBalance {
        account: Address,
        needed: MicroEka,
        available: MicroEka,
    },

    #[error("insufficient balance in {pool} pool: needed {needed}, available {available}")]
    InsufficientPoolBalance {
        pool: PoolKind,
        needed: MicroEka,
        available: MicroEka,
    },

    #[error("balance overflow while crediting {0}")]
    Overflow(String),
}
