//! Onboarding: buy staking tokens with the reference currency.
//!
//! The buyer signs a permit on the reference ledger; the engine pulls the
//! reference amount into escrow, mints staking tokens at the configured rate
//! and registers first-time buyers as voters.

use crate::authorization::{check_funding, pull_with_permit, Authorization};
use crate::engine::{log_rejection, SettlementEngine};
use crate::error::SettlementError;
use crate::events::SettlementEvent;
use diva_ledger::TokenLedger;
use diva_store::{ClaimStore, VoterDirectory};
use diva_types::{rescale, Address, Timestamp};

impl<L, R, V, S> SettlementEngine<L, R, V, S>
where
    L: TokenLedger,
    R: TokenLedger,
    V: VoterDirectory,
    S: ClaimStore,
{
    /// Staking tokens minted for `reference_amount` raw reference units:
    /// rescaled to the staking token's decimals, times the conversion rate.
    pub fn divas_for(&self, reference_amount: u128) -> Result<u128, SettlementError> {
        rescale(
            reference_amount,
            self.params.reference_token_decimals,
            self.params.stake_token_decimals,
        )
        .and_then(|scaled| scaled.checked_mul(u128::from(self.params.conversion_rate)))
        .ok_or(SettlementError::Overflow)
    }

    /// Buy staking tokens. Returns the amount minted to the caller.
    pub fn purchase_divas(
        &mut self,
        caller: &Address,
        reference_amount: u128,
        auth: &Authorization,
        now: Timestamp,
    ) -> Result<u128, SettlementError> {
        let result = self.try_purchase(caller, reference_amount, auth, now);
        log_rejection("purchase_divas", caller, result)
    }

    fn try_purchase(
        &mut self,
        caller: &Address,
        reference_amount: u128,
        auth: &Authorization,
        now: Timestamp,
    ) -> Result<u128, SettlementError> {
        if reference_amount == 0 {
            return Err(SettlementError::ZeroAmount);
        }
        check_funding(&self.reference_ledger, caller, reference_amount, auth, now)?;
        let minted = self.divas_for(reference_amount)?;
        if minted == 0 {
            return Err(SettlementError::ZeroAmount);
        }
        if !self.stake_ledger.is_minter(&self.accounts.escrow) {
            return Err(SettlementError::NotAuthorized(self.accounts.escrow.to_string()));
        }
        self.stake_ledger
            .total_supply()
            .checked_add(minted)
            .ok_or(SettlementError::Overflow)?;
        self.stake_ledger
            .balance_of(caller)
            .checked_add(minted)
            .ok_or(SettlementError::Overflow)?;

        pull_with_permit(
            &mut self.reference_ledger,
            caller,
            &self.accounts.escrow,
            reference_amount,
            auth,
            now,
        )?;
        self.stake_ledger
            .mint(&self.accounts.escrow, caller, minted)?;
        if !self.voters.is_registered(caller)? {
            self.register(caller)?;
        }

        tracing::info!(
            buyer = %caller,
            paid = %reference_amount,
            minted = %minted,
            "divas purchased"
        );
        self.events.push(SettlementEvent::DivasPurchased {
            to: caller.clone(),
            value: minted,
            reference_amount,
        });
        Ok(minted)
    }
}
