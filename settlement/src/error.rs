use diva_ledger::LedgerError;
use diva_store::StoreError;
use diva_types::ParamsError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettlementError {
    #[error("voter {0} is not registered")]
    VoterNotRegistered(String),

    #[error("voter {0} is already registered")]
    AlreadyRegistered(String),

    #[error("claim {0} not found")]
    ClaimNotFound(String),

    #[error("claim {0} already exists")]
    DuplicateClaim(String),

    #[error("stake {stake} is below the minimum {min}")]
    StakeTooLow { stake: u128, min: u128 },

    #[error("stake {stake} is above the maximum {max}")]
    StakeTooHigh { stake: u128, max: u128 },

    #[error("post stake must be exactly {required}, got {stake}")]
    InvalidPostStake { stake: u128, required: u128 },

    #[error("authorization expired at {deadline} (now {now})")]
    ExpiredAuthorization { deadline: u64, now: u64 },

    #[error("invalid authorization signature: {0}")]
    InvalidSignature(String),

    #[error("insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error("rewards already distributed for claim {0}")]
    AlreadyDistributed(String),

    #[error("vote already withdrawn on claim {0}")]
    AlreadyWithdrawn(String),

    #[error("voter {voter} has already voted on claim {claim}")]
    AlreadyVoted { claim: String, voter: String },

    #[error("no vote by {voter} on claim {claim}")]
    VoteNotFound { claim: String, voter: String },

    #[error("choice must be true or fake")]
    InvalidChoice,

    #[error("voting is closed on claim {0}")]
    VotingClosed(String),

    #[error("{0} is not authorized for this operation")]
    NotAuthorized(String),

    #[error("amount must be non-zero")]
    ZeroAmount,

    #[error("arithmetic overflow")]
    Overflow,

    #[error("invalid parameters: {0}")]
    Params(#[from] ParamsError),

    #[error("ledger error: {0}")]
    Ledger(LedgerError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl From<LedgerError> for SettlementError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::ExpiredAuthorization { deadline, now } => {
                SettlementError::ExpiredAuthorization { deadline, now }
            }
            LedgerError::InvalidSignature(reason) => SettlementError::InvalidSignature(reason),
            LedgerError::InsufficientBalance { .. } | LedgerError::InsufficientAllowance { .. } => {
                SettlementError::InsufficientFunds(e.to_string())
            }
            LedgerError::Overflow => SettlementError::Overflow,
            other => SettlementError::Ledger(other),
        }
    }
}
