//! Trade and fill records produced by the matching engine.
//!
//! A [`Trade`] records *which* orders crossed, not the traded quantity —
//! downstream audits recover quantities from the matched-amount deltas the
//! paired [`Fill`]s commit to the repository.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::Side;

/// The outcome of one matching step: the bid and ask that crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Trade {
    pub bid_id: u64,
    pub ask_id: u64,
}

impl Trade {
    #[must_use]
    pub fn new(bid_id: u64, ask_id: u64) -> Self {
        Self { bid_id, ask_id }
    }
}

impl std::fmt::Display for Trade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Trade[bid #{} x ask #{}]", self.bid_id, self.ask_id)
    }
}

/// A matched-amount delta for one order touched by a trade.
///
/// The engine emits one fill per side per trade; the state machine commits
/// them through the repository by `(side, order_id)` — mutation never happens
/// through an aliased record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fill {
    pub side: Side,
    pub order_id: u64,
    /// Quantity consumed from the order in this matching step.
    pub quantity: U256,
}

impl std::fmt::Display for Fill {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Fill[{} #{} +{}]", self.side, self.order_id, self.quantity)
    }
}
