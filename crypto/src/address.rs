//! Participant address derivation from public keys.
//!
//! Format: `diva_` + base32(public_key) (52 chars) + base32(checksum) (8 chars),
//! 65 characters in total. The checksum is the first 5 bytes of
//! Blake2b-256(public_key). The alphabet is Nano's, which drops the visually
//! ambiguous `0`, `2`, `l` and `v`.

use diva_types::{Address, PublicKey};

const ALPHABET: &[u8; 32] = b"13456789abcdefghijkmnopqrstuwxyz";

const KEY_CHARS: usize = 52;
const CHECKSUM_CHARS: usize = 8;
const CHECKSUM_BYTES: usize = 5;

/// Derive the `diva_` address of a public key.
pub fn derive_address(public_key: &PublicKey) -> Address {
    let checksum = checksum(public_key.as_bytes());
    let mut out = String::with_capacity(Address::PREFIX.len() + KEY_CHARS + CHECKSUM_CHARS);
    out.push_str(Address::PREFIX);
    base32::encode_into(public_key.as_bytes(), &mut out);
    base32::encode_into(&checksum, &mut out);
    Address::new(out)
}

/// Recover the public key from an address.
///
/// Returns `None` for service addresses, malformed input, or a bad checksum.
/// Permit verification relies on this to find the signer's key.
pub fn decode_address(address: &str) -> Option<[u8; 32]> {
    let body = address.strip_prefix(Address::PREFIX)?;
    if body.len() != KEY_CHARS + CHECKSUM_CHARS || !body.is_ascii() {
        return None;
    }
    let (key_part, sum_part) = body.split_at(KEY_CHARS);
    let key: [u8; 32] = base32::decode(key_part)?;
    let sum: [u8; CHECKSUM_BYTES] = base32::decode(sum_part)?;
    (sum == checksum(&key)).then_some(key)
}

/// Whether an address string is a well-formed, checksummed key address.
pub fn validate_address(address: &str) -> bool {
    decode_address(address).is_some()
}

fn checksum(key: &[u8; 32]) -> [u8; CHECKSUM_BYTES] {
    let digest = crate::blake2b_256(key);
    let mut out = [0u8; CHECKSUM_BYTES];
    out.copy_from_slice(&digest[..CHECKSUM_BYTES]);
    out
}

mod base32 {
    use super::ALPHABET;

    fn value_of(c: u8) -> Option<u8> {
        ALPHABET.iter().position(|&a| a == c).map(|p| p as u8)
    }

    /// Append the base32 encoding of `bytes`, zero-padding the final group.
    pub fn encode_into(bytes: &[u8], out: &mut String) {
        let mut acc: u32 = 0;
        let mut bits = 0u32;
        for &b in bytes {
            acc = (acc << 8) | u32::from(b);
            bits += 8;
            while bits >= 5 {
                bits -= 5;
                out.push(ALPHABET[((acc >> bits) & 0x1F) as usize] as char);
            }
            acc &= (1 << bits) - 1;
        }
        if bits > 0 {
            out.push(ALPHABET[((acc << (5 - bits)) & 0x1F) as usize] as char);
        }
    }

    /// Decode exactly `N` bytes; trailing padding bits are ignored.
    pub fn decode<const N: usize>(s: &str) -> Option<[u8; N]> {
        let mut out = [0u8; N];
        let mut filled = 0;
        let mut acc: u32 = 0;
        let mut bits = 0u32;
        for c in s.bytes() {
            acc = (acc << 5) | u32::from(value_of(c)?);
            bits += 5;
            if bits >= 8 {
                bits -= 8;
                if filled < N {
                    out[filled] = (acc >> bits) as u8;
                    filled += 1;
                }
            }
            acc &= (1 << bits) - 1;
        }
        (filled == N).then_some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{generate_keypair, keypair_from_seed};

    #[test]
    fn derived_addresses_validate() {
        let kp = generate_keypair();
        let addr = derive_address(&kp.public);
        assert!(addr.as_str().starts_with("diva_"));
        assert_eq!(addr.as_str().len(), 65);
        assert!(validate_address(addr.as_str()));
        assert_eq!(decode_address(addr.as_str()), Some(kp.public.0));
    }

    #[test]
    fn derivation_is_deterministic() {
        let kp = keypair_from_seed(&[7u8; 32]);
        assert_eq!(derive_address(&kp.public), derive_address(&kp.public));
    }

    #[test]
    fn service_addresses_do_not_decode() {
        assert!(decode_address("diva_escrow").is_none());
        assert!(!validate_address("diva_"));
        assert!(!validate_address("nano_1111"));
    }

    #[test]
    fn corrupted_checksum_rejected() {
        let addr = derive_address(&generate_keypair().public);
        let mut bad = addr.as_str().to_string();
        let last = bad.pop().unwrap();
        bad.push(if last == '1' { '3' } else { '1' });
        assert!(!validate_address(&bad));
    }

    #[test]
    fn base32_roundtrip_odd_length() {
        let data = [0xDE, 0xAD, 0xBE, 0xEF, 0x42];
        let mut s = String::new();
        base32::encode_into(&data, &mut s);
        assert_eq!(s.len(), 8);
        assert_eq!(base32::decode::<5>(&s), Some(data));
    }
}
