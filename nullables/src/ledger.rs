//! Nullable token ledger.
//!
//! Behaves like a real ledger for balances, allowances, nonces and minting,
//! but never checks permit signatures: any signature is accepted as long as
//! the deadline and nonce are right. Every successful movement is recorded,
//! and permits or batch payouts can be made to fail on demand.

use diva_crypto::{Permit, PermitDomain};
use diva_ledger::{LedgerError, TokenLedger};
use diva_types::{Address, Signature, Timestamp};
use std::collections::{HashMap, HashSet};

/// One recorded token movement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferRecord {
    pub from: Address,
    pub to: Address,
    pub amount: u128,
}

pub struct NullLedger {
    symbol: String,
    decimals: u8,
    domain: PermitDomain,
    supply: u128,
    balances: HashMap<Address, u128>,
    allowances: HashMap<(Address, Address), u128>,
    nonces: HashMap<Address, u64>,
    minters: HashSet<Address>,
    transfers: Vec<TransferRecord>,
    permits_applied: u64,
    reject_permits: bool,
    fail_batches: bool,
}

impl NullLedger {
    pub fn new(symbol: &str, decimals: u8) -> Self {
        let ledger_address = Address::new(format!("diva_null{}", symbol.to_lowercase()));
        Self {
            symbol: symbol.to_string(),
            decimals,
            domain: PermitDomain::new(symbol, 0, ledger_address),
            supply: 0,
            balances: HashMap::new(),
            allowances: HashMap::new(),
            nonces: HashMap::new(),
            minters: HashSet::new(),
            transfers: Vec::new(),
            permits_applied: 0,
            reject_permits: false,
            fail_batches: false,
        }
    }

    /// An 18-decimal staking token.
    pub fn stake_token() -> Self {
        Self::new("DIVA", 18)
    }

    /// A 6-decimal reference currency.
    pub fn reference_token() -> Self {
        Self::new("MUSDC", 6)
    }

    /// Credit `amount` out of thin air (supply grows with it).
    pub fn fund(&mut self, account: &Address, amount: u128) {
        *self.balances.entry(account.clone()).or_default() += amount;
        self.supply += amount;
    }

    pub fn allow_minter(&mut self, account: &Address) {
        self.minters.insert(account.clone());
    }

    /// Make every permit fail with `InvalidSignature`.
    pub fn reject_permits(&mut self, reject: bool) {
        self.reject_permits = reject;
    }

    /// Make every `transfer_many` fail without moving anything.
    pub fn fail_batches(&mut self, fail: bool) {
        self.fail_batches = fail;
    }

    pub fn transfers(&self) -> &[TransferRecord] {
        &self.transfers
    }

    pub fn permits_applied(&self) -> u64 {
        self.permits_applied
    }

    fn move_balance(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), LedgerError> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                account: from.to_string(),
                available,
                needed: amount,
            });
        }
        self.balances.insert(from.clone(), available - amount);
        *self.balances.entry(to.clone()).or_default() += amount;
        self.transfers.push(TransferRecord {
            from: from.clone(),
            to: to.clone(),
            amount,
        });
        Ok(())
    }
}

impl TokenLedger for NullLedger {
    fn name(&self) -> &str {
        &self.symbol
    }

    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn decimals(&self) -> u8 {
        self.decimals
    }

    fn domain(&self) -> &PermitDomain {
        &self.domain
    }

    fn total_supply(&self) -> u128 {
        self.supply
    }

    fn balance_of(&self, account: &Address) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.allowances
            .get(&(owner.clone(), spender.clone()))
            .copied()
            .unwrap_or(0)
    }

    fn nonces(&self, owner: &Address) -> u64 {
        self.nonces.get(owner).copied().unwrap_or(0)
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), LedgerError> {
        self.move_balance(from, to, amount)
    }

    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), LedgerError> {
        let available = self.allowance(from, spender);
        if available < amount {
            return Err(LedgerError::InsufficientAllowance {
                owner: from.to_string(),
                spender: spender.to_string(),
                available,
                needed: amount,
            });
        }
        self.move_balance(from, to, amount)?;
        self.allowances
            .insert((from.clone(), spender.clone()), available - amount);
        Ok(())
    }

    fn transfer_many(&mut self, from: &Address, payouts: &[(Address, u128)]) -> Result<(), LedgerError> {
        let total: u128 = payouts.iter().map(|(_, amount)| amount).sum();
        let available = self.balance_of(from);
        if self.fail_batches || available < total {
            return Err(LedgerError::InsufficientBalance {
                account: from.to_string(),
                available,
                needed: total,
            });
        }
        for (to, amount) in payouts {
            self.move_balance(from, to, *amount)?;
        }
        Ok(())
    }

    fn permit(&mut self, permit: &Permit, _signature: &Signature, now: Timestamp) -> Result<(), LedgerError> {
        if now > permit.deadline {
            return Err(LedgerError::ExpiredAuthorization {
                deadline: permit.deadline.as_secs(),
                now: now.as_secs(),
            });
        }
        if self.reject_permits || permit.nonce != self.nonces(&permit.owner) {
            return Err(LedgerError::InvalidSignature("rejected by null ledger".into()));
        }
        *self.nonces.entry(permit.owner.clone()).or_default() += 1;
        self.allowances
            .insert((permit.owner.clone(), permit.spender.clone()), permit.value);
        self.permits_applied += 1;
        Ok(())
    }

    fn mint(&mut self, minter: &Address, to: &Address, amount: u128) -> Result<(), LedgerError> {
        if !self.is_minter(minter) {
            return Err(LedgerError::Unauthorized(minter.to_string()));
        }
        self.fund(to, amount);
        Ok(())
    }

    fn is_minter(&self, account: &Address) -> bool {
        self.minters.contains(account)
    }

    fn burn(&mut self, from: &Address, amount: u128) -> Result<(), LedgerError> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                account: from.to_string(),
                available,
                needed: amount,
            });
        }
        self.balances.insert(from.clone(), available - amount);
        self.supply -= amount;
        Ok(())
    }
}
