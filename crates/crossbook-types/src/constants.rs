//! System-wide constants for the Crossbook coprocessor.

/// Generic-I/O domain tag for "read raw storage word at (block, address, slot)".
pub const STORAGE_READ_DOMAIN: u16 = 0x27;

/// Number of consecutive storage words occupied by one order array element.
pub const WORDS_PER_ORDER: u64 = 4;

/// Default storage slot of the buy-order array (reference contract layout).
pub const DEFAULT_BUY_ORDERS_SLOT: u64 = 8;

/// Default storage slot of the buy-order cancellation map.
pub const DEFAULT_BUY_STATUS_SLOT: u64 = 6;

/// Default storage slot of the sell-order array.
pub const DEFAULT_SELL_ORDERS_SLOT: u64 = 9;

/// Default storage slot of the sell-order cancellation map.
pub const DEFAULT_SELL_STATUS_SLOT: u64 = 7;

/// Delay between polls when the rollup server reports nothing pending.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Initial backoff delay for rollup transport retries; doubles per attempt.
pub const DEFAULT_RETRY_BASE_MS: u64 = 500;

/// Maximum rollup transport attempts before the process gives up.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "Crossbook";
