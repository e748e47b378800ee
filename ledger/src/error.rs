use custos_types::TokenAmount;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("insufficient balance: need {needed}, have {available}")]
    InsufficientBalance {
        needed: TokenAmount,
        available: TokenAmount,
    },

    #[error("unknown account: {0}")]
    UnknownAccount(String),

    #[error("invalid account identifier: {0}")]
    InvalidAccount(String),
}
