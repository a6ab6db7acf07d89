//! Ledger Events
//!
//! Events are recorded for every committed state change and can be
//! indexed off-chain for UIs, analytics and accounting. Failed operations
//! record nothing.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::types::{Address, CloseReason, LoanId};

/// Event types for indexing and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[borsh(use_discriminant = true)]
#[repr(u8)]
pub enum EventType {
    // Trading Events (0x01 - 0x1F)
    Started = 0x01,
    Bought = 0x02,
    Sold = 0x03,
    Donated = 0x04,

    // Token Events (0x20 - 0x3F)
    Transfer = 0x20,
    Approval = 0x21,

    // Loan Events (0x40 - 0x5F)
    LoanOpened = 0x40,
    LoanIncreased = 0x41,
    LoanExtended = 0x42,
    CollateralRemoved = 0x43,
    LoanRepaid = 0x44,
    LoanClosed = 0x45,
    Liquidated = 0x46,

    // Yield Events (0x60 - 0x7F)
    Swept = 0x60,
    Unswept = 0x61,
    YieldWithdrawn = 0x62,

    // Admin Events (0x80 - 0x9F)
    ConfigUpdated = 0x80,
    AdminChanged = 0x81,
}

/// Configuration field touched by an admin setter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum ConfigParameter {
    FeeAddress,
    MinLiquidityBuffer,
    AavePool,
    AUsdcToken,
    AaveEnabled,
    MinFee,
    RateModel,
}

/// Main event enum
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum LedgerEvent {
    // ============ Trading Events ============

    /// Emitted once by the bootstrap
    Started {
        admin: Address,
        reserve: u128,
        minted: u128,
        timestamp: u64,
    },

    /// Emitted when reserve is exchanged for newly minted CHICKS
    Bought {
        buyer: Address,
        receiver: Address,
        reserve_in: u128,
        minted: u128,
        fee: u128,
        price: u128,
        timestamp: u64,
    },

    /// Emitted when CHICKS are burned for reserve
    Sold {
        seller: Address,
        burned: u128,
        reserve_out: u128,
        fee: u128,
        price: u128,
        timestamp: u64,
    },

    /// Reserve added without minting
    Donated { from: Address, amount: u128 },

    // ============ Token Events ============

    Transfer { from: Address, to: Address, amount: u128 },

    Approval { owner: Address, spender: Address, amount: u128 },

    // ============ Loan Events ============

    LoanOpened {
        loan_id: LoanId,
        borrower: Address,
        collateral: u128,
        borrowed: u128,
        fee: u128,
        end_date: u64,
        leveraged: bool,
    },

    LoanIncreased {
        loan_id: LoanId,
        borrower: Address,
        extra_borrowed: u128,
        extra_collateral: u128,
        fee: u128,
    },

    LoanExtended {
        loan_id: LoanId,
        borrower: Address,
        new_end_date: u64,
        fee: u128,
    },

    CollateralRemoved {
        loan_id: LoanId,
        borrower: Address,
        amount: u128,
    },

    LoanRepaid {
        loan_id: LoanId,
        borrower: Address,
        amount: u128,
        collateral_released: u128,
        remaining: u128,
    },

    LoanClosed {
        loan_id: LoanId,
        borrower: Address,
        reason: CloseReason,
    },

    /// Expired loan seized by `liquidator`
    Liquidated {
        loan_id: LoanId,
        borrower: Address,
        liquidator: Address,
        debt_written_off: u128,
        burned: u128,
        penalty: u128,
        returned: u128,
    },

    // ============ Yield Events ============

    /// Surplus reserve deposited into the venue
    Swept { amount: u128 },

    /// Principal pulled back from the venue
    Unswept { amount: u128 },

    YieldWithdrawn { to: Address, amount: u128 },

    // ============ Admin Events ============

    ConfigUpdated { parameter: ConfigParameter },

    AdminChanged { old_admin: Address, new_admin: Address },
}

impl LedgerEvent {
    /// Get the event type for filtering
    pub fn event_type(&self) -> EventType {
        match self {
            Self::Started { .. } => EventType::Started,
            Self::Bought { .. } => EventType::Bought,
            Self::Sold { .. } => EventType::Sold,
            Self::Donated { .. } => EventType::Donated,
            Self::Transfer { .. } => EventType::Transfer,
            Self::Approval { .. } => EventType::Approval,
            Self::LoanOpened { .. } => EventType::LoanOpened,
            Self::LoanIncreased { .. } => EventType::LoanIncreased,
            Self::LoanExtended { .. } => EventType::LoanExtended,
            Self::CollateralRemoved { .. } => EventType::CollateralRemoved,
            Self::LoanRepaid { .. } => EventType::LoanRepaid,
            Self::LoanClosed { .. } => EventType::LoanClosed,
            Self::Liquidated { .. } => EventType::Liquidated,
            Self::Swept { .. } => EventType::Swept,
            Self::Unswept { .. } => EventType::Unswept,
            Self::YieldWithdrawn { .. } => EventType::YieldWithdrawn,
            Self::ConfigUpdated { .. } => EventType::ConfigUpdated,
            Self::AdminChanged { .. } => EventType::AdminChanged,
        }
    }

    /// Serialize event to bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        borsh::to_vec(self).unwrap_or_default()
    }

    /// Deserialize event from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        borsh::from_slice(bytes).ok()
    }
}

/// Event log for collecting events
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<LedgerEvent>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Emit an event (add to log)
    pub fn emit(&mut self, event: LedgerEvent) {
        self.events.push(event);
    }

    /// Move every event of `other` onto the end of this log
    pub fn append(&mut self, other: EventLog) {
        self.events.extend(other.events);
    }

    /// Get all events
    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    /// Take ownership of all events
    pub fn into_events(self) -> Vec<LedgerEvent> {
        self.events
    }

    /// Filter events by type
    pub fn filter_by_type(&self, event_type: EventType) -> Vec<&LedgerEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Check if any events were emitted
    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// Get number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Clear all events
    pub fn clear(&mut self) {
        self.events.clear();
    }
}
