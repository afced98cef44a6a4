//! Permit-funded token pulls.
//!
//! Callers never approve the engine ahead of time. Each paying operation
//! carries an [`Authorization`]: a deadline and the caller's signature over a
//! permit for exactly the amount being paid, at the caller's current nonce.
//! The engine rebuilds that permit, presents it to the ledger and pulls the
//! tokens into escrow.

use crate::SettlementError;
use diva_crypto::{derive_address, sign_permit, Permit};
use diva_ledger::TokenLedger;
use diva_types::{Address, KeyPair, Signature, Timestamp};
use serde::{Deserialize, Serialize};

/// The caller-supplied half of a permit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authorization {
    pub deadline: Timestamp,
    pub signature: Signature,
}

/// Sign an authorization letting `spender` pull `value` from the key
/// holder's account on `ledger`.
pub fn sign_authorization<T: TokenLedger>(
    ledger: &T,
    owner: &KeyPair,
    spender: &Address,
    value: u128,
    deadline: Timestamp,
) -> Authorization {
    let owner_address = derive_address(&owner.public);
    let permit = Permit {
        nonce: ledger.nonces(&owner_address),
        owner: owner_address,
        spender: spender.clone(),
        value,
        deadline,
    };
    Authorization {
        deadline,
        signature: sign_permit(ledger.domain(), &permit, &owner.private),
    }
}

/// Check an authorization can fund `amount` without touching the ledger.
pub(crate) fn check_funding<T: TokenLedger>(
    ledger: &T,
    owner: &Address,
    amount: u128,
    auth: &Authorization,
    now: Timestamp,
) -> Result<(), SettlementError> {
    if now > auth.deadline {
        return Err(SettlementError::ExpiredAuthorization {
            deadline: auth.deadline.as_secs(),
            now: now.as_secs(),
        });
    }
    let balance = ledger.balance_of(owner);
    if balance < amount {
        return Err(SettlementError::InsufficientFunds(format!(
            "{owner} holds {balance} {}, needs {amount}",
            ledger.symbol()
        )));
    }
    Ok(())
}

/// Apply the permit and move `amount` from `owner` into `escrow`.
///
/// Funding is checked first, so once the permit is accepted the transfer
/// cannot fail for lack of balance or allowance.
pub(crate) fn pull_with_permit<T: TokenLedger>(
    ledger: &mut T,
    owner: &Address,
    escrow: &Address,
    amount: u128,
    auth: &Authorization,
    now: Timestamp,
) -> Result<(), SettlementError> {
    check_funding(ledger, owner, amount, auth, now)?;
    let permit = Permit {
        owner: owner.clone(),
        spender: escrow.clone(),
        value: amount,
        nonce: ledger.nonces(owner),
        deadline: auth.deadline,
    };
    ledger.permit(&permit, &auth.signature, now)?;
    ledger.transfer_from(escrow, owner, escrow, amount)?;
    Ok(())
}
