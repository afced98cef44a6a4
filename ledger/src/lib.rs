//! Token ledgers.
//!
//! The settlement engine moves stake and reference-currency tokens only
//! through the [`TokenLedger`] capability. [`PermitLedger`] is the in-memory
//! implementation used for the staking token ("DivaToken") and the reference
//! currency ("MockUSDC").

pub mod error;
pub mod genesis;
pub mod permit_ledger;
pub mod token;

pub use error::LedgerError;
pub use genesis::{
    GenesisConfig, TokenMetadata, DIVA_GENESIS_ALLOCATION, DIVA_TOKEN_ADDRESS, MOCK_USDC_ADDRESS,
};
pub use permit_ledger::PermitLedger;
pub use token::TokenLedger;
