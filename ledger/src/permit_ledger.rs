//! In-memory reference ledger.

use crate::genesis::{GenesisConfig, TokenMetadata};
use crate::{LedgerError, TokenLedger};
use diva_crypto::{verify_permit, Permit, PermitDomain};
use diva_types::{Address, Signature, Timestamp};
use std::collections::{HashMap, HashSet};

/// A complete token ledger held in memory: balances, allowances, permit
/// nonces and a minter set.
///
/// Every mutating operation validates before it writes, so a failed call
/// leaves the ledger untouched.
#[derive(Clone, Debug)]
pub struct PermitLedger {
    metadata: TokenMetadata,
    domain: PermitDomain,
    total_supply: u128,
    balances: HashMap<Address, u128>,
    allowances: HashMap<(Address, Address), u128>,
    nonces: HashMap<Address, u64>,
    minters: HashSet<Address>,
}

impl PermitLedger {
    /// An empty ledger.
    pub fn new(metadata: TokenMetadata, domain: PermitDomain) -> Self {
        Self {
            metadata,
            domain,
            total_supply: 0,
            balances: HashMap::new(),
            allowances: HashMap::new(),
            nonces: HashMap::new(),
            minters: HashSet::new(),
        }
    }

    /// Build a ledger from a genesis configuration.
    pub fn from_genesis(config: GenesisConfig) -> Result<Self, LedgerError> {
        let domain = PermitDomain::new(
            config.metadata.name.clone(),
            config.chain_id,
            config.ledger_address,
        );
        let mut ledger = Self::new(config.metadata, domain);
        for (holder, amount) in config.allocations {
            ledger.credit(&holder, amount)?;
        }
        ledger.minters.extend(config.minters);
        Ok(ledger)
    }

    /// Authorize (or de-authorize) an account to mint.
    pub fn set_minter(&mut self, account: &Address, authorized: bool) {
        if authorized {
            self.minters.insert(account.clone());
        } else {
            self.minters.remove(account);
        }
    }

    /// Approve `spender` directly, without a permit.
    pub fn approve(&mut self, owner: &Address, spender: &Address, value: u128) {
        self.allowances
            .insert((owner.clone(), spender.clone()), value);
    }

    fn credit(&mut self, account: &Address, amount: u128) -> Result<(), LedgerError> {
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        let balance = self
            .balance_of(account)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        self.total_supply = supply;
        self.balances.insert(account.clone(), balance);
        Ok(())
    }

    fn check_allowance(
        &self,
        owner: &Address,
        spender: &Address,
        amount: u128,
    ) -> Result<u128, LedgerError> {
        let available = self.allowance(owner, spender);
        if available < amount {
            return Err(LedgerError::InsufficientAllowance {
                owner: owner.to_string(),
                spender: spender.to_string(),
                available,
                needed: amount,
            });
        }
        Ok(available - amount)
    }
}

/// Apply `from -> to` to a staging map layered over the committed balances.
fn stage_transfer(
    staged: &mut HashMap<Address, u128>,
    committed: &HashMap<Address, u128>,
    from: &Address,
    to: &Address,
    amount: u128,
) -> Result<(), LedgerError> {
    let lookup = |staged: &HashMap<Address, u128>, who: &Address| {
        staged
            .get(who)
            .or_else(|| committed.get(who))
            .copied()
            .unwrap_or(0)
    };

    let available = lookup(staged, from);
    if available < amount {
        return Err(LedgerError::InsufficientBalance {
            account: from.to_string(),
            available,
            needed: amount,
        });
    }
    staged.insert(from.clone(), available - amount);

    let received = lookup(staged, to)
        .checked_add(amount)
        .ok_or(LedgerError::Overflow)?;
    staged.insert(to.clone(), received);
    Ok(())
}

impl TokenLedger for PermitLedger {
    fn name(&self) -> &str {
        &self.metadata.name
    }

    fn symbol(&self) -> &str {
        &self.metadata.symbol
    }

    fn decimals(&self) -> u8 {
        self.metadata.decimals
    }

    fn domain(&self) -> &PermitDomain {
        &self.domain
    }

    fn total_supply(&self) -> u128 {
        self.total_supply
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
        let mut staged = HashMap::new();
        stage_transfer(&mut staged, &self.balances, from, to, amount)?;
        self.balances.extend(staged);
        Ok(())
    }

    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), LedgerError> {
        let remaining = self.check_allowance(from, spender, amount)?;
        let mut staged = HashMap::new();
        stage_transfer(&mut staged, &self.balances, from, to, amount)?;
        self.balances.extend(staged);
        self.allowances
            .insert((from.clone(), spender.clone()), remaining);
        tracing::debug!(
            ledger = %self.metadata.symbol,
            from = %from,
            to = %to,
            amount = %amount,
            "transfer_from"
        );
        Ok(())
    }

    fn transfer_many(&mut self, from: &Address, payouts: &[(Address, u128)]) -> Result<(), LedgerError> {
        let mut staged = HashMap::new();
        for (to, amount) in payouts {
            stage_transfer(&mut staged, &self.balances, from, to, *amount)?;
        }
        self.balances.extend(staged);
        tracing::debug!(
            ledger = %self.metadata.symbol,
            from = %from,
            payouts = payouts.len(),
            "batch transfer applied"
        );
        Ok(())
    }

    fn permit(&mut self, permit: &Permit, signature: &Signature, now: Timestamp) -> Result<(), LedgerError> {
        if now > permit.deadline {
            return Err(LedgerError::ExpiredAuthorization {
                deadline: permit.deadline.as_secs(),
                now: now.as_secs(),
            });
        }
        let expected = self.nonces(&permit.owner);
        if permit.nonce != expected {
            return Err(LedgerError::InvalidSignature(format!(
                "nonce {} does not match expected {expected}",
                permit.nonce
            )));
        }
        let signer = verify_permit(&self.domain, permit, signature)?;
        let next = expected.checked_add(1).ok_or(LedgerError::Overflow)?;

        self.nonces.insert(signer.clone(), next);
        self.approve(&signer, &permit.spender, permit.value);
        tracing::debug!(
            ledger = %self.metadata.symbol,
            owner = %signer,
            spender = %permit.spender,
            value = %permit.value,
            "permit applied"
        );
        Ok(())
    }

    fn mint(&mut self, minter: &Address, to: &Address, amount: u128) -> Result<(), LedgerError> {
        if !self.is_minter(minter) {
            return Err(LedgerError::Unauthorized(minter.to_string()));
        }
        self.credit(to, amount)
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
        self.total_supply = self.total_supply.saturating_sub(amount);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genesis::DIVA_GENESIS_ALLOCATION;
    use diva_crypto::{derive_address, keypair_from_seed, sign_permit};
    use diva_types::KeyPair;

    fn addr(s: &str) -> Address {
        Address::new(format!("diva_{s}"))
    }

    fn diva() -> PermitLedger {
        PermitLedger::from_genesis(GenesisConfig::diva_token(
            31337,
            &[addr("g1"), addr("g2"), addr("g3")],
        ))
        .unwrap()
    }

    fn signer(seed: u8) -> (KeyPair, Address) {
        let kp = keypair_from_seed(&[seed; 32]);
        let address = derive_address(&kp.public);
        (kp, address)
    }

    fn signed(ledger: &PermitLedger, kp: &KeyPair, owner: &Address, value: u128, deadline: u64) -> (Permit, Signature) {
        let permit = Permit {
            owner: owner.clone(),
            spender: addr("engine"),
            value,
            nonce: ledger.nonces(owner),
            deadline: Timestamp::new(deadline),
        };
        let sig = sign_permit(ledger.domain(), &permit, &kp.private);
        (permit, sig)
    }

    #[test]
    fn genesis_premints_each_holder() {
        let l = diva();
        assert_eq!(l.name(), "DivaToken");
        assert_eq!(l.symbol(), "DIVA");
        assert_eq!(l.decimals(), 18);
        for h in ["g1", "g2", "g3"] {
            assert_eq!(l.balance_of(&addr(h)), DIVA_GENESIS_ALLOCATION);
        }
        assert_eq!(l.total_supply(), 3 * DIVA_GENESIS_ALLOCATION);
    }

    #[test]
    fn mock_usdc_owner_mints() {
        let owner = addr("owner");
        let mut usdc = PermitLedger::from_genesis(GenesisConfig::mock_usdc(1, &owner)).unwrap();
        assert_eq!(usdc.symbol(), "MUSDC");
        assert_eq!(usdc.balance_of(&owner), 0);
        usdc.mint(&owner, &owner, 100_000_000).unwrap();
        assert_eq!(usdc.balance_of(&owner), 100_000_000);

        let err = usdc.mint(&addr("stranger"), &owner, 1).unwrap_err();
        assert!(matches!(err, LedgerError::Unauthorized(_)));
    }

    #[test]
    fn transfer_moves_balance() {
        let mut l = diva();
        l.transfer(&addr("g1"), &addr("bob"), 7).unwrap();
        assert_eq!(l.balance_of(&addr("bob")), 7);
        assert_eq!(l.balance_of(&addr("g1")), DIVA_GENESIS_ALLOCATION - 7);
    }

    #[test]
    fn transfer_insufficient_balance_changes_nothing() {
        let mut l = diva();
        let err = l.transfer(&addr("bob"), &addr("g1"), 1).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientBalance { .. }));
        assert_eq!(l.balance_of(&addr("g1")), DIVA_GENESIS_ALLOCATION);
    }

    #[test]
    fn self_transfer_is_a_no_op() {
        let mut l = diva();
        l.transfer(&addr("g1"), &addr("g1"), 10).unwrap();
        assert_eq!(l.balance_of(&addr("g1")), DIVA_GENESIS_ALLOCATION);
    }

    #[test]
    fn transfer_from_spends_allowance() {
        let mut l = diva();
        l.approve(&addr("g1"), &addr("engine"), 10);
        l.transfer_from(&addr("engine"), &addr("g1"), &addr("escrow"), 4).unwrap();
        assert_eq!(l.allowance(&addr("g1"), &addr("engine")), 6);
        assert_eq!(l.balance_of(&addr("escrow")), 4);

        let err = l
            .transfer_from(&addr("engine"), &addr("g1"), &addr("escrow"), 7)
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientAllowance { .. }));
        assert_eq!(l.allowance(&addr("g1"), &addr("engine")), 6);
    }

    #[test]
    fn transfer_many_is_all_or_nothing() {
        let mut l = diva();
        l.transfer(&addr("g1"), &addr("escrow"), 100).unwrap();

        let too_much = vec![(addr("a"), 60), (addr("b"), 50)];
        assert!(l.transfer_many(&addr("escrow"), &too_much).is_err());
        assert_eq!(l.balance_of(&addr("escrow")), 100);
        assert_eq!(l.balance_of(&addr("a")), 0);

        let ok = vec![(addr("a"), 60), (addr("b"), 40)];
        l.transfer_many(&addr("escrow"), &ok).unwrap();
        assert_eq!(l.balance_of(&addr("escrow")), 0);
        assert_eq!(l.balance_of(&addr("a")), 60);
        assert_eq!(l.balance_of(&addr("b")), 40);
    }

    #[test]
    fn transfer_many_accumulates_repeated_recipient() {
        let mut l = diva();
        l.transfer(&addr("g1"), &addr("escrow"), 10).unwrap();
        l.transfer_many(&addr("escrow"), &[(addr("a"), 3), (addr("a"), 4)])
            .unwrap();
        assert_eq!(l.balance_of(&addr("a")), 7);
        assert_eq!(l.balance_of(&addr("escrow")), 3);
    }

    #[test]
    fn permit_sets_allowance_and_bumps_nonce() {
        let mut l = diva();
        let (kp, owner) = signer(1);
        let (permit, sig) = signed(&l, &kp, &owner, 10, 500);
        l.permit(&permit, &sig, Timestamp::new(100)).unwrap();
        assert_eq!(l.allowance(&owner, &addr("engine")), 10);
        assert_eq!(l.nonces(&owner), 1);
    }

    #[test]
    fn permit_deadline_is_inclusive() {
        let mut l = diva();
        let (kp, owner) = signer(1);
        let (permit, sig) = signed(&l, &kp, &owner, 10, 500);
        assert!(l.permit(&permit, &sig, Timestamp::new(500)).is_ok());
    }

    #[test]
    fn expired_permit_rejected() {
        let mut l = diva();
        let (kp, owner) = signer(1);
        let (permit, sig) = signed(&l, &kp, &owner, 10, 500);
        let err = l.permit(&permit, &sig, Timestamp::new(501)).unwrap_err();
        assert_eq!(err, LedgerError::ExpiredAuthorization { deadline: 500, now: 501 });
        assert_eq!(l.nonces(&owner), 0);
    }

    #[test]
    fn replayed_permit_rejected() {
        let mut l = diva();
        let (kp, owner) = signer(1);
        let (permit, sig) = signed(&l, &kp, &owner, 10, 500);
        l.permit(&permit, &sig, Timestamp::new(100)).unwrap();
        let err = l.permit(&permit, &sig, Timestamp::new(100)).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidSignature(_)));
    }

    #[test]
    fn forged_permit_rejected() {
        let mut l = diva();
        let (_, owner) = signer(1);
        let (thief, _) = signer(2);
        let (permit, sig) = signed(&l, &thief, &owner, 10, 500);
        let err = l.permit(&permit, &sig, Timestamp::new(100)).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidSignature(_)));
        assert_eq!(l.allowance(&owner, &addr("engine")), 0);
    }

    #[test]
    fn permit_for_other_ledger_rejected() {
        let mut l = diva();
        let usdc = PermitLedger::from_genesis(GenesisConfig::mock_usdc(31337, &addr("owner"))).unwrap();
        let (kp, owner) = signer(1);
        let (permit, sig) = signed(&usdc, &kp, &owner, 10, 500);
        assert!(l.permit(&permit, &sig, Timestamp::new(100)).is_err());
    }

    #[test]
    fn burn_reduces_supply() {
        let mut l = diva();
        l.burn(&addr("g1"), 5).unwrap();
        assert_eq!(l.total_supply(), 3 * DIVA_GENESIS_ALLOCATION - 5);
        assert!(l.burn(&addr("nobody"), 1).is_err());
    }
}
