//! Raw Ed25519 signing over byte strings. Permits sign their digest with
//! these; nothing else in the protocol signs.

use diva_types::{PrivateKey, PublicKey, Signature};
use ed25519_dalek::{Signer, SigningKey, VerifyingKey};

pub fn sign_message(message: &[u8], private_key: &PrivateKey) -> Signature {
    let key = SigningKey::from_bytes(&private_key.0);
    Signature(key.sign(message).to_bytes())
}

/// Strict verification: non-canonical signatures and small-order keys are
/// rejected, so a permit has exactly one valid signature per signer.
pub fn verify_signature(message: &[u8], signature: &Signature, public_key: &PublicKey) -> bool {
    match VerifyingKey::from_bytes(&public_key.0) {
        Ok(key) => key
            .verify_strict(message, &ed25519_dalek::Signature::from_bytes(&signature.0))
            .is_ok(),
        Err(_) => false,
    }
}
