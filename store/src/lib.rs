//! Storage for claims, votes and the voter registry.
//!
//! The settlement engine depends only on the [`ClaimStore`] and
//! [`VoterDirectory`] traits; the in-memory implementations back tests and
//! single-process deployments.

pub mod claim;
pub mod error;
pub mod memory;
pub mod voter;

pub use claim::ClaimStore;
pub use error::StoreError;
pub use memory::{MemoryClaimStore, MemoryVoterRegistry};
pub use voter::VoterDirectory;
