//! The token ledger capability the settlement engine consumes.

use crate::LedgerError;
use diva_crypto::{Permit, PermitDomain};
use diva_types::{Address, Signature, Timestamp};

/// An account-balance ledger with allowances and offline permits.
///
/// Implementations must make every mutating call all-or-nothing: on `Err`,
/// no balance, allowance or nonce has changed.
pub trait TokenLedger {
    fn name(&self) -> &str;
    fn symbol(&self) -> &str;
    fn decimals(&self) -> u8;

    /// The domain permits for this ledger must be signed under.
    fn domain(&self) -> &PermitDomain;

    /// The ledger's own address (the domain's verifying ledger).
    fn address(&self) -> &Address {
        &self.domain().verifying_ledger
    }

    fn total_supply(&self) -> u128;
    fn balance_of(&self, account: &Address) -> u128;
    fn allowance(&self, owner: &Address, spender: &Address) -> u128;

    /// Next permit nonce expected from `owner`.
    fn nonces(&self, owner: &Address) -> u64;

    fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), LedgerError>;

    /// Move `amount` from `from` to `to`, spending `spender`'s allowance.
    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), LedgerError>;

    /// Pay several recipients out of `from` in one step. Either every
    /// payment is applied or none is.
    fn transfer_many(&mut self, from: &Address, payouts: &[(Address, u128)]) -> Result<(), LedgerError>;

    /// Apply a signed permit: check the deadline, nonce and signature, consume
    /// the nonce and set `allowance(owner, spender) = value`.
    fn permit(&mut self, permit: &Permit, signature: &Signature, now: Timestamp) -> Result<(), LedgerError>;

    /// Create new tokens. Only accounts for which [`is_minter`](Self::is_minter)
    /// holds may call this.
    fn mint(&mut self, minter: &Address, to: &Address, amount: u128) -> Result<(), LedgerError>;

    fn is_minter(&self, account: &Address) -> bool;

    fn burn(&mut self, from: &Address, amount: u128) -> Result<(), LedgerError>;
}
