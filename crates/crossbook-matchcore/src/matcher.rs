//! Pure deterministic matching.
//!
//! The core matching function: takes a snapshot [`OrderBook`] and produces
//! the trades plus the matched-amount deltas to commit. This is the **only**
//! function MatchCore exposes — no repository writes, no I/O.
//!
//! ```text
//! match_book(&mut OrderBook) -> MatchOutcome { trades, fills }
//! ```
//!
//! ## Determinism Guarantee
//!
//! Given the same set of orders, this function produces the exact same
//! trade sequence on every replica: heap priority is `(sqrt_price, id)`
//! only, and ids are unique per side, so the consumption order is total.

use std::collections::binary_heap::PeekMut;

use crossbook_types::{CrossbookError, Fill, Result, Side, Trade};

use crate::OrderBook;

/// Everything one matching pass produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    /// Which orders crossed, in consumption order.
    pub trades: Vec<Trade>,
    /// One matched-amount delta per side per trade, in the same order.
    pub fills: Vec<Fill>,
}

/// Match crossing orders by price-time priority.
///
/// Repeats until a queue empties or the top bid prices below the top ask:
/// peek both tops, trade `min(remaining_bid, remaining_ask)`, record the
/// trade and both fills, and pop whichever entries are fully consumed.
///
/// # Errors
/// - `NoMatch` if zero trades were produced — an expected business outcome,
///   not a fault.
/// - `InvariantViolation` if quantity arithmetic would underflow/overflow;
///   entries are validated on book construction, so this indicates a bug.
pub fn match_book(book: &mut OrderBook) -> Result<MatchOutcome> {
    let mut trades: Vec<Trade> = Vec::new();
    let mut fills: Vec<Fill> = Vec::new();

    loop {
        let Some(mut bid) = book.bids.peek_mut() else {
            break;
        };
        let Some(mut ask) = book.asks.peek_mut() else {
            break;
        };

        // A zero-remaining entry cannot trade; drop it without a trade
        // record so the loop always makes progress.
        if bid.0.remaining()?.is_zero() {
            PeekMut::pop(bid);
            continue;
        }
        if ask.0.remaining()?.is_zero() {
            PeekMut::pop(ask);
            continue;
        }

        if bid.0.sqrt_price < ask.0.sqrt_price {
            break;
        }

        let matched_qty = bid.0.remaining()?.min(ask.0.remaining()?);

        trades.push(Trade::new(bid.0.id, ask.0.id));
        bid.0.fill(matched_qty)?;
        ask.0.fill(matched_qty)?;
        fills.push(Fill {
            side: Side::Buy,
            order_id: bid.0.id,
            quantity: matched_qty,
        });
        fills.push(Fill {
            side: Side::Sell,
            order_id: ask.0.id,
            quantity: matched_qty,
        });

        tracing::trace!(
            bid_id = bid.0.id,
            ask_id = ask.0.id,
            quantity = %matched_qty,
            "matched"
        );

        if bid.0.remaining()?.is_zero() {
            PeekMut::pop(bid);
        }
        if ask.0.remaining()?.is_zero() {
            PeekMut::pop(ask);
        }
    }

    if trades.is_empty() {
        return Err(CrossbookError::NoMatch);
    }

    Ok(MatchOutcome { trades, fills })
}
