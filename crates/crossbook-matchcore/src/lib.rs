//! # crossbook-matchcore
//!
//! **Pure price-time-priority matching engine for Crossbook.**
//!
//! MatchCore is the compute plane — it takes a snapshot order book and
//! produces trades plus the matched-amount deltas to commit. It has:
//!
//! - **Zero side effects**: no repository writes, no I/O
//! - **Deterministic output**: same book -> same trades on every replica
//! - **Explicit mutation records**: every matched-amount change leaves the
//!   engine as a [`Fill`](crossbook_types::Fill), committed by the caller

pub mod matcher;
pub mod orderbook;

pub use matcher::{MatchOutcome, match_book};
pub use orderbook::{BookEntry, OrderBook};
