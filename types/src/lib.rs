//! Fundamental types for the DIVA protocol.
//!
//! This crate defines the records shared by every other crate in the workspace:
//! addresses, claim identifiers, timestamps, key material, token units, the
//! claim/vote/voter records, and the settlement parameters.

pub mod address;
pub mod amount;
pub mod claim;
pub mod error;
pub mod hash;
pub mod keys;
pub mod params;
pub mod time;
pub mod voter;

pub use address::Address;
pub use amount::{rescale, DIVA_DECIMALS, DIVA_UNIT, USDC_DECIMALS, USDC_UNIT};
pub use claim::{Choice, Claim, ClaimStatus, SideTally, VoteRecord};
pub use hash::ClaimId;
pub use keys::{KeyPair, PrivateKey, PublicKey, Signature};
pub use error::ParamsError;
pub use params::SettlementParams;
pub use time::Timestamp;
pub use voter::Voter;
