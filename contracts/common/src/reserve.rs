//! Reserve Account
//!
//! Splits the engine's reserve between the on-hand liquidity buffer and
//! the principal swept into the yield venue, and plans the single venue
//! movement each operation needs to bring the buffer back in line.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::errors::{LedgerError, LedgerResult};
use crate::math::{safe_add, safe_sub};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct ReserveAccount {
    /// Reserve held by the engine
    pub balance: u128,
    /// Principal deposited at the venue
    pub swept: u128,
}

/// Net venue movement for one operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepPlan {
    Hold,
    /// Move this much from `balance` to the venue
    Deposit(u128),
    /// Pull this much principal back into `balance`
    Withdraw(u128),
}

impl ReserveAccount {
    /// On hand plus swept
    pub fn total(&self) -> LedgerResult<u128> {
        safe_add(self.balance, self.swept)
    }

    pub fn credit(&mut self, amount: u128) -> LedgerResult<()> {
        self.balance = safe_add(self.balance, amount)?;
        Ok(())
    }

    pub fn debit(&mut self, amount: u128) -> LedgerResult<()> {
        if amount > self.balance {
            return Err(LedgerError::InsufficientLiquidity {
                available: self.balance,
                required: amount,
            });
        }
        self.balance -= amount;
        Ok(())
    }

    /// Plan the venue movement so that after paying `outflow` the on-hand
    /// balance sits at `buffer`.
    ///
    /// Withdrawals are bounded by `swept` and by `supplied`, what the venue
    /// reports it can return. A shortfall against `outflow` itself must fit
    /// in that bound or the plan fails with `InsufficientLiquidity`.
    /// Surplus is only deposited when `deposits_enabled`.
    pub fn plan(
        &self,
        outflow: u128,
        buffer: u128,
        deposits_enabled: bool,
        supplied: u128,
    ) -> LedgerResult<SweepPlan> {
        let withdrawable = self.swept.min(supplied);
        if outflow > self.balance {
            let shortfall = outflow - self.balance;
            if shortfall > withdrawable {
                return Err(LedgerError::InsufficientLiquidity {
                    available: safe_add(self.balance, withdrawable)?,
                    required: outflow,
                });
            }
            let wanted = safe_add(shortfall, buffer)?;
            return Ok(SweepPlan::Withdraw(wanted.min(withdrawable)));
        }

        let remaining = self.balance - outflow;
        if remaining > buffer && deposits_enabled {
            Ok(SweepPlan::Deposit(remaining - buffer))
        } else if remaining < buffer && withdrawable > 0 {
            Ok(SweepPlan::Withdraw((buffer - remaining).min(withdrawable)))
        } else {
            Ok(SweepPlan::Hold)
        }
    }

    /// Book a planned movement
    pub fn apply(&mut self, plan: SweepPlan) -> LedgerResult<()> {
        match plan {
            SweepPlan::Hold => {}
            SweepPlan::Deposit(amount) => {
                self.balance = safe_sub(self.balance, amount)?;
                self.swept = safe_add(self.swept, amount)?;
            }
            SweepPlan::Withdraw(amount) => {
                self.swept = safe_sub(self.swept, amount)?;
                self.balance = safe_add(self.balance, amount)?;
            }
        }
        Ok(())
    }
}
