//! Cryptographic primitives for the DIVA protocol.
//!
//! - **Ed25519** for signing permits and verifying them
//! - **Blake2b** for claim identifiers and permit digests
//! - Address derivation with `diva_` prefix and base32 encoding
//! - EIP-2612-style **permits**: offline, single-use spending authorizations

pub mod address;
pub mod hash;
pub mod keys;
pub mod permit;
pub mod sign;

pub use address::{decode_address, derive_address, validate_address};
pub use hash::{blake2b_256, blake2b_256_multi, claim_id_for_url};
pub use keys::{generate_keypair, keypair_from_private, keypair_from_seed, public_from_private};
pub use permit::{permit_digest, sign_permit, verify_permit, Permit, PermitDomain, PermitError};
pub use sign::{sign_message, verify_signature};
