//! Order model for the Crossbook coprocessor.
//!
//! An [`Order`] is a resting or incoming intent to trade, keyed by
//! `(side, id)`. Field values come straight off the chain: prices and
//! quantities are raw 256-bit EVM words, the owner is the submitting
//! contract address. Validation happens once, at construction — everything
//! downstream may assume a constructed order is well-formed.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::{CrossbookError, Result};

/// Which side of the book an order is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The opposite side of the book.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// Lifecycle status of an order.
///
/// `Closed` covers both on-chain cancellation and full consumption
/// (`amount == matched_amount`); the book only ever holds `Active` orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum OrderStatus {
    Active,
    Closed,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "ACTIVE"),
            Self::Closed => write!(f, "CLOSED"),
        }
    }
}

/// A resting or incoming intent to trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// 1-based id, unique within its side. Id 0 is reserved/invalid.
    pub id: u64,
    /// The contract address the order belongs to.
    pub owner: Address,
    /// Price metric used for ordering; monotonic proxy, not a linear price.
    pub sqrt_price: U256,
    /// Total quantity.
    pub amount: U256,
    /// Cumulative quantity already matched. Invariant: `<= amount`.
    pub matched_amount: U256,
    pub side: Side,
    pub status: OrderStatus,
}

impl Order {
    /// Build a validated order.
    ///
    /// # Errors
    /// Returns `InvalidOrder` unless
    /// `id != 0 && owner != 0 && sqrt_price > 0 && amount > 0 && matched_amount <= amount`.
    pub fn new(
        id: u64,
        owner: Address,
        sqrt_price: U256,
        amount: U256,
        matched_amount: U256,
        side: Side,
        status: OrderStatus,
    ) -> Result<Self> {
        let order = Self {
            id,
            owner,
            sqrt_price,
            amount,
            matched_amount,
            side,
            status,
        };
        order.validate()?;
        Ok(order)
    }

    /// Re-check the construction invariants.
    pub fn validate(&self) -> Result<()> {
        if self.id == 0 {
            return Err(CrossbookError::InvalidOrder {
                reason: "id must be nonzero".into(),
            });
        }
        if self.owner == Address::ZERO {
            return Err(CrossbookError::InvalidOrder {
                reason: "owner must be a nonzero address".into(),
            });
        }
        if self.sqrt_price.is_zero() {
            return Err(CrossbookError::InvalidOrder {
                reason: "sqrt_price must be greater than zero".into(),
            });
        }
        if self.amount.is_zero() {
            return Err(CrossbookError::InvalidOrder {
                reason: "amount must be greater than zero".into(),
            });
        }
        if self.matched_amount > self.amount {
            return Err(CrossbookError::InvalidOrder {
                reason: "matched_amount exceeds amount".into(),
            });
        }
        Ok(())
    }

    /// Quantity still open for matching.
    ///
    /// # Errors
    /// `InvariantViolation` if `matched_amount > amount` — a constructed
    /// order can never reach that state, so hitting it means a bug upstream.
    pub fn remaining(&self) -> Result<U256> {
        self.amount
            .checked_sub(self.matched_amount)
            .ok_or(CrossbookError::InvariantViolation {
                reason: format!("order {} matched_amount exceeds amount", self.id),
            })
    }

    #[must_use]
    pub fn is_fulfilled(&self) -> bool {
        self.amount == self.matched_amount
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == OrderStatus::Active
    }
}

impl std::fmt::Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Order[{} #{}] {}/{} @ {} ({})",
            self.side, self.id, self.matched_amount, self.amount, self.sqrt_price, self.status,
        )
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Order {
    /// An active order with a fixed nonzero owner and no matched quantity.
    pub fn dummy(side: Side, id: u64, sqrt_price: u64, amount: u64) -> Self {
        Self {
            id,
            owner: Address::repeat_byte(0xAB),
            sqrt_price: U256::from(sqrt_price),
            amount: U256::from(amount),
            matched_amount: U256::ZERO,
            side,
            status: OrderStatus::Active,
        }
    }
}
