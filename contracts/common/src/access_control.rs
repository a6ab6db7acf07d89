//! Access Control Module
//!
//! Single-administrator gate for configuration setters, the bootstrap
//! and yield withdrawal.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::constants::addresses;
use crate::errors::{LedgerError, LedgerResult};
use crate::types::Address;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct AdminControl {
    admin: Address,
}

impl AdminControl {
    pub fn new(admin: Address) -> LedgerResult<Self> {
        if admin == addresses::ZERO {
            return Err(LedgerError::InvalidAddress { reason: "admin cannot be zero" });
        }
        Ok(Self { admin })
    }

    pub fn admin(&self) -> Address {
        self.admin
    }

    pub fn is_admin(&self, caller: &Address) -> bool {
        &self.admin == caller
    }

    /// Fails with `Unauthorized` unless `caller` is the admin
    pub fn require_admin(&self, caller: &Address) -> LedgerResult<()> {
        if !self.is_admin(caller) {
            return Err(LedgerError::Unauthorized {
                expected: self.admin,
                actual: *caller,
            });
        }
        Ok(())
    }

    /// Hand the admin role to `new_admin`
    pub fn transfer_admin(&mut self, caller: &Address, new_admin: Address) -> LedgerResult<()> {
        self.require_admin(caller)?;
        if new_admin == addresses::ZERO {
            return Err(LedgerError::InvalidAddress { reason: "admin cannot be zero" });
        }
        self.admin = new_admin;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> Address {
        [1u8; 20]
    }

    #[test]
    fn test_require_admin() {
        let control = AdminControl::new(admin()).unwrap();
        assert!(control.require_admin(&admin()).is_ok());
        assert!(matches!(
            control.require_admin(&[2u8; 20]),
            Err(LedgerError::Unauthorized { .. })
        ));
    }

    #[test]
    fn test_zero_admin_rejected() {
        assert!(matches!(
            AdminControl::new(addresses::ZERO),
            Err(LedgerError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn test_transfer_admin() {
        let mut control = AdminControl::new(admin()).unwrap();
        let next = [5u8; 20];

        assert!(control.transfer_admin(&next, next).is_err());
        control.transfer_admin(&admin(), next).unwrap();
        assert_eq!(control.admin(), next);
        assert!(control.require_admin(&admin()).is_err());
    }
}
