//! Blake2b hashing for claim identifiers and permit digests.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use diva_types::ClaimId;

type Blake2b256 = Blake2b<U32>;

/// Compute a 256-bit Blake2b hash of arbitrary data.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(data);
    let mut output = [0u8; 32];
    output.copy_from_slice(&hasher.finalize());
    output
}

/// Hash multiple byte slices in sequence (avoids concatenation allocation).
pub fn blake2b_256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    let mut output = [0u8; 32];
    output.copy_from_slice(&hasher.finalize());
    output
}

/// Derive the claim identifier for a content URL.
///
/// The URL is hashed byte-for-byte; callers that want `http://x` and
/// `http://x/` to collide must normalise first.
pub fn claim_id_for_url(content_url: &str) -> ClaimId {
    ClaimId::new(blake2b_256_multi(&[b"diva-claim:", content_url.as_bytes()]))
}
