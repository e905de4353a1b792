//! Configuration for the Crossbook coprocessor.
//!
//! Built once from the environment by the composition root and passed down
//! explicitly — no component reads the environment itself.

use serde::{Deserialize, Serialize};

use crate::{CrossbookError, Result, Side, constants};

/// Storage slots of the deployed contract's order arrays and status maps.
///
/// These must match the contract's declared layout; defaults cover the
/// reference deployment but every field is overridable per contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookStorageLayout {
    pub buy_orders_slot: u64,
    pub buy_status_slot: u64,
    pub sell_orders_slot: u64,
    pub sell_status_slot: u64,
}

impl BookStorageLayout {
    /// The `(orders_slot, status_slot)` pair for one side of the book.
    #[must_use]
    pub fn side_slots(&self, side: Side) -> (u64, u64) {
        match side {
            Side::Buy => (self.buy_orders_slot, self.buy_status_slot),
            Side::Sell => (self.sell_orders_slot, self.sell_status_slot),
        }
    }
}

impl Default for BookStorageLayout {
    fn default() -> Self {
        Self {
            buy_orders_slot: constants::DEFAULT_BUY_ORDERS_SLOT,
            buy_status_slot: constants::DEFAULT_BUY_STATUS_SLOT,
            sell_orders_slot: constants::DEFAULT_SELL_ORDERS_SLOT,
            sell_status_slot: constants::DEFAULT_SELL_STATUS_SLOT,
        }
    }
}

/// Full coprocessor configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoprocessorConfig {
    /// Base URL of the rollup HTTP server (`/finish`, `/notice`, `/gio`, ...).
    pub rollup_url: String,
    pub layout: BookStorageLayout,
    /// Delay between polls when nothing is pending.
    pub poll_interval_ms: u64,
    /// Initial transport retry backoff; doubles per attempt.
    pub retry_base_ms: u64,
    /// Transport attempts before the process gives up.
    pub max_retries: u32,
}

impl CoprocessorConfig {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    /// `Configuration` if `ROLLUP_HTTP_SERVER_URL` is unset or any override
    /// fails to parse.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary lookup function.
    ///
    /// The seam exists so parsing is testable without mutating the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let rollup_url = lookup("ROLLUP_HTTP_SERVER_URL").ok_or_else(|| {
            CrossbookError::Configuration("ROLLUP_HTTP_SERVER_URL is not set".into())
        })?;

        let layout = BookStorageLayout {
            buy_orders_slot: parse_or(
                &lookup,
                "CROSSBOOK_BUY_ORDERS_SLOT",
                constants::DEFAULT_BUY_ORDERS_SLOT,
            )?,
            buy_status_slot: parse_or(
                &lookup,
                "CROSSBOOK_BUY_STATUS_SLOT",
                constants::DEFAULT_BUY_STATUS_SLOT,
            )?,
            sell_orders_slot: parse_or(
                &lookup,
                "CROSSBOOK_SELL_ORDERS_SLOT",
                constants::DEFAULT_SELL_ORDERS_SLOT,
            )?,
            sell_status_slot: parse_or(
                &lookup,
                "CROSSBOOK_SELL_STATUS_SLOT",
                constants::DEFAULT_SELL_STATUS_SLOT,
            )?,
        };

        Ok(Self {
            rollup_url,
            layout,
            poll_interval_ms: parse_or(
                &lookup,
                "CROSSBOOK_POLL_INTERVAL_MS",
                constants::DEFAULT_POLL_INTERVAL_MS,
            )?,
            retry_base_ms: parse_or(
                &lookup,
                "CROSSBOOK_RETRY_BASE_MS",
                constants::DEFAULT_RETRY_BASE_MS,
            )?,
            max_retries: parse_or(&lookup, "CROSSBOOK_MAX_RETRIES", constants::DEFAULT_MAX_RETRIES)?,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| CrossbookError::Configuration(format!("{key} is not a valid number: {raw}"))),
    }
}
