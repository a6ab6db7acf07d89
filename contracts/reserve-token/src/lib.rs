//! USDC Reserve Token
//!
//! In-memory 6-decimal fungible token used as the CHICKS reserve asset in
//! local deployments and tests. Implements the `ReserveToken` surface the
//! ledger consumes, plus `approve` and a minter-gated faucet `mint`.

use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use tracing::debug;

use chicks_common::{
    constants::reserve,
    errors::{AmountErrorReason, LedgerError, LedgerResult},
    reserve_token::ReserveToken,
    types::Address,
};

// ============ Token State ============

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct UsdcToken {
    /// Only this address may mint
    minter: Address,
    total_supply: u128,
    balances: BTreeMap<Address, u128>,
    allowances: BTreeMap<(Address, Address), u128>,
}

impl UsdcToken {
    /// Create an empty token with `minter` as the faucet authority
    pub fn new(minter: Address) -> Self {
        Self {
            minter,
            total_supply: 0,
            balances: BTreeMap::new(),
            allowances: BTreeMap::new(),
        }
    }

    pub fn symbol() -> &'static str {
        reserve::SYMBOL
    }

    pub fn decimals() -> u8 {
        reserve::DECIMALS
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    pub fn approve(&mut self, owner: &Address, spender: &Address, amount: u128) {
        self.allowances.insert((*owner, *spender), amount);
    }

    /// Faucet mint, minter only
    pub fn mint(&mut self, caller: &Address, to: &Address, amount: u128) -> LedgerResult<()> {
        if caller != &self.minter {
            return Err(LedgerError::Unauthorized {
                expected: self.minter,
                actual: *caller,
            });
        }
        if amount == 0 {
            return Err(LedgerError::InvalidAmount { amount, reason: AmountErrorReason::Zero });
        }

        let new_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        let entry = self.balances.entry(*to).or_insert(0);
        *entry = entry.checked_add(amount).ok_or(LedgerError::Overflow)?;
        self.total_supply = new_supply;

        debug!(amount, new_supply, "usdc minted");
        Ok(())
    }

    fn move_balance(&mut self, from: &Address, to: &Address, amount: u128) -> LedgerResult<()> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(LedgerError::InsufficientBalance { available, requested: amount });
        }
        if from == to || amount == 0 {
            return Ok(());
        }

        let to_balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        self.balances.insert(*from, available - amount);
        self.balances.insert(*to, to_balance);
        Ok(())
    }
}

impl ReserveToken for UsdcToken {
    fn balance_of(&self, owner: &Address) -> u128 {
        self.balances.get(owner).copied().unwrap_or(0)
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.allowances.get(&(*owner, *spender)).copied().unwrap_or(0)
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> LedgerResult<()> {
        self.move_balance(from, to, amount)
    }

    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> LedgerResult<()> {
        let approved = self.allowance(from, spender);
        if approved < amount {
            return Err(LedgerError::InsufficientAllowance { approved, requested: amount });
        }
        self.move_balance(from, to, amount)?;
        self.allowances.insert((*from, *spender), approved - amount);
        Ok(())
    }
}

// ============ Helper Functions ============

/// Split a base-unit amount into (whole, fractional) USDC
pub fn format_amount(amount: u128) -> (u128, u128) {
    (amount / reserve::ONE, amount % reserve::ONE)
}

// ============ Tests ============
