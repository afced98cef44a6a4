use diva_crypto::PermitError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("insufficient balance: {account} has {available}, needs {needed}")]
    InsufficientBalance {
        account: String,
        available: u128,
        needed: u128,
    },

    #[error("insufficient allowance: {spender} may spend {available} of {owner}, needs {needed}")]
    InsufficientAllowance {
        owner: String,
        spender: String,
        available: u128,
        needed: u128,
    },

    #[error("authorization expired at {deadline} (now {now})")]
    ExpiredAuthorization { deadline: u64, now: u64 },

    #[error("invalid permit signature: {0}")]
    InvalidSignature(String),

    #[error("{0} is not an authorized minter")]
    Unauthorized(String),

    #[error("arithmetic overflow")]
    Overflow,
}

impl From<PermitError> for LedgerError {
    fn from(e: PermitError) -> Self {
        LedgerError::InvalidSignature(e.to_string())
    }
}
