//! Offline spending authorizations ("permits").
//!
//! A permit lets `owner` grant `spender` a one-time allowance of `value` on a
//! specific ledger without a prior approval transaction. The owner signs a
//! digest binding the ledger's domain (name, version, chain, ledger address)
//! to the permit fields, including the owner's current nonce, so a signature
//! is valid for exactly one ledger and exactly one use.
//!
//! Verification here is pure: time and nonce checks belong to the ledger.

use crate::address::decode_address;
use crate::hash::blake2b_256_multi;
use crate::sign::{sign_message, verify_signature};
use diva_types::{Address, PrivateKey, PublicKey, Signature, Timestamp};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DOMAIN_TAG: &[u8] = b"diva-permit-domain:v1";
const PERMIT_TAG: &[u8] = b"diva-permit:v1";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PermitError {
    #[error("permit owner {0} has no recoverable public key")]
    UnknownSigner(String),

    #[error("invalid permit signature")]
    InvalidSignature,
}

/// Identifies the ledger a permit is valid on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermitDomain {
    pub name: String,
    pub version: String,
    pub chain_id: u64,
    pub verifying_ledger: Address,
}

impl PermitDomain {
    pub fn new(name: impl Into<String>, chain_id: u64, verifying_ledger: Address) -> Self {
        Self {
            name: name.into(),
            version: "1".to_string(),
            chain_id,
            verifying_ledger,
        }
    }

    /// Hash of the domain fields, mixed into every permit digest.
    pub fn separator(&self) -> [u8; 32] {
        blake2b_256_multi(&[
            DOMAIN_TAG,
            &len_prefix(self.name.as_bytes()),
            self.name.as_bytes(),
            &len_prefix(self.version.as_bytes()),
            self.version.as_bytes(),
            &self.chain_id.to_be_bytes(),
            &len_prefix(self.verifying_ledger.as_str().as_bytes()),
            self.verifying_ledger.as_str().as_bytes(),
        ])
    }
}

/// The signed message of a permit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permit {
    pub owner: Address,
    pub spender: Address,
    pub value: u128,
    pub nonce: u64,
    pub deadline: Timestamp,
}

/// The 32-byte digest an owner signs.
pub fn permit_digest(domain: &PermitDomain, permit: &Permit) -> [u8; 32] {
    let owner = permit.owner.as_str().as_bytes();
    let spender = permit.spender.as_str().as_bytes();
    blake2b_256_multi(&[
        PERMIT_TAG,
        &domain.separator(),
        &len_prefix(owner),
        owner,
        &len_prefix(spender),
        spender,
        &permit.value.to_be_bytes(),
        &permit.nonce.to_be_bytes(),
        &permit.deadline.as_secs().to_be_bytes(),
    ])
}

/// Sign a permit with the owner's private key.
pub fn sign_permit(domain: &PermitDomain, permit: &Permit, owner_key: &PrivateKey) -> Signature {
    sign_message(&permit_digest(domain, permit), owner_key)
}

/// Check a permit signature and return the signer.
///
/// The signer's public key is recovered from the owner address itself, so the
/// returned address always equals `permit.owner` on success.
pub fn verify_permit(
    domain: &PermitDomain,
    permit: &Permit,
    signature: &Signature,
) -> Result<Address, PermitError> {
    let key = decode_address(permit.owner.as_str())
        .ok_or_else(|| PermitError::UnknownSigner(permit.owner.to_string()))?;
    if verify_signature(&permit_digest(domain, permit), signature, &PublicKey(key)) {
        Ok(permit.owner.clone())
    } else {
        Err(PermitError::InvalidSignature)
    }
}

fn len_prefix(bytes: &[u8]) -> [u8; 4] {
    (bytes.len() as u32).to_be_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::derive_address;
    use crate::keys::keypair_from_seed;

    fn domain() -> PermitDomain {
        PermitDomain::new("DivaToken", 31337, Address::new("diva_token"))
    }

    fn permit(owner: Address) -> Permit {
        Permit {
            owner,
            spender: Address::new("diva_engine"),
            value: 10,
            nonce: 0,
            deadline: Timestamp::new(5_000),
        }
    }

    #[test]
    fn valid_permit_returns_owner() {
        let kp = keypair_from_seed(&[1u8; 32]);
        let owner = derive_address(&kp.public);
        let p = permit(owner.clone());
        let sig = sign_permit(&domain(), &p, &kp.private);
        assert_eq!(verify_permit(&domain(), &p, &sig), Ok(owner));
    }

    #[test]
    fn tampered_fields_fail() {
        let kp = keypair_from_seed(&[1u8; 32]);
        let p = permit(derive_address(&kp.public));
        let sig = sign_permit(&domain(), &p, &kp.private);

        let mut more = p.clone();
        more.value = 11;
        assert_eq!(verify_permit(&domain(), &more, &sig), Err(PermitError::InvalidSignature));

        let mut next = p.clone();
        next.nonce = 1;
        assert_eq!(verify_permit(&domain(), &next, &sig), Err(PermitError::InvalidSignature));

        let mut later = p.clone();
        later.deadline = Timestamp::new(5_001);
        assert_eq!(verify_permit(&domain(), &later, &sig), Err(PermitError::InvalidSignature));
    }

    #[test]
    fn signature_is_bound_to_domain() {
        let kp = keypair_from_seed(&[1u8; 32]);
        let p = permit(derive_address(&kp.public));
        let sig = sign_permit(&domain(), &p, &kp.private);
        let usdc = PermitDomain::new("MockUSDC", 31337, Address::new("diva_usdc"));
        assert_eq!(verify_permit(&usdc, &p, &sig), Err(PermitError::InvalidSignature));

        let mut other_chain = domain();
        other_chain.chain_id = 1;
        assert_eq!(verify_permit(&other_chain, &p, &sig), Err(PermitError::InvalidSignature));
    }

    #[test]
    fn someone_elses_signature_fails() {
        let owner = keypair_from_seed(&[1u8; 32]);
        let thief = keypair_from_seed(&[2u8; 32]);
        let p = permit(derive_address(&owner.public));
        let sig = sign_permit(&domain(), &p, &thief.private);
        assert_eq!(verify_permit(&domain(), &p, &sig), Err(PermitError::InvalidSignature));
    }

    #[test]
    fn service_owner_is_unknown_signer() {
        let kp = keypair_from_seed(&[1u8; 32]);
        let p = permit(Address::new("diva_treasury"));
        let sig = sign_permit(&domain(), &p, &kp.private);
        assert!(matches!(
            verify_permit(&domain(), &p, &sig),
            Err(PermitError::UnknownSigner(_))
        ));
    }
}
