#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use diva_crypto::{verify_permit, Permit, PermitDomain};
use diva_types::{Address, Signature, Timestamp};

#[derive(Debug, Arbitrary)]
struct Input {
    owner: String,
    spender: String,
    value: u128,
    nonce: u64,
    deadline: u64,
    chain_id: u64,
    signature: Vec<u8>,
}

// Arbitrary owners and signatures must be rejected cleanly, never panic.
fuzz_target!(|input: Input| {
    let domain = PermitDomain::new("DivaToken", input.chain_id, Address::new("diva_divatoken"));
    let permit = Permit {
        owner: Address::new(input.owner),
        spender: Address::new(input.spender),
        value: input.value,
        nonce: input.nonce,
        deadline: Timestamp::new(input.deadline),
    };
    let mut bytes = [0u8; 64];
    for (dst, src) in bytes.iter_mut().zip(input.signature.iter()) {
        *dst = *src;
    }
    let _ = verify_permit(&domain, &permit, &Signature(bytes));
});
