//! Error types for the Crossbook coprocessor.
//!
//! All errors use the `CB_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Order / validation errors
//! - 2xx: Repository errors
//! - 3xx: Matching errors
//! - 4xx: Storage reconstruction errors
//! - 5xx: Codec / decode errors
//! - 6xx: Rollup transport errors
//! - 9xx: General / internal errors

use thiserror::Error;

use crate::Side;

/// Central error enum for all Crossbook operations.
#[derive(Debug, Error)]
pub enum CrossbookError {
    // =================================================================
    // Order / Validation Errors (1xx)
    // =================================================================
    /// The order failed validation (zero id, zero owner, bad amounts).
    #[error("CB_ERR_100: Invalid order: {reason}")]
    InvalidOrder { reason: String },

    // =================================================================
    // Repository Errors (2xx)
    // =================================================================
    /// The requested order was not found on that side.
    #[error("CB_ERR_200: Order not found: {side} #{id}")]
    OrderNotFound { side: Side, id: u64 },

    /// An order with this id already exists on that side.
    #[error("CB_ERR_201: Order already exists: {side} #{id}")]
    DuplicateOrder { side: Side, id: u64 },

    /// A collection query matched no records. Callers treat this as a
    /// normal empty outcome, not a failure.
    #[error("CB_ERR_202: No orders found")]
    NoOrdersFound,

    /// Committing a fill would push `matched_amount` past `amount`.
    #[error("CB_ERR_203: Fill overflow on {side} #{id}: {quantity} exceeds remaining")]
    FillOverflow {
        side: Side,
        id: u64,
        quantity: String,
    },

    // =================================================================
    // Matching Errors (3xx)
    // =================================================================
    /// The book produced zero trades. An expected business outcome —
    /// upstream reports accept with no notices.
    #[error("CB_ERR_300: No match found")]
    NoMatch,

    // =================================================================
    // Storage Reconstruction Errors (4xx)
    // =================================================================
    /// A storage-word read failed: transport error, non-OK status, or a
    /// protocol-level failure code from the generic-I/O endpoint.
    #[error("CB_ERR_400: Storage read failed: {reason}")]
    StorageReadFailed { reason: String },

    /// The storage word in a response could not be parsed.
    #[error("CB_ERR_401: Malformed storage word: {reason}")]
    MalformedStorageWord { reason: String },

    // =================================================================
    // Codec / Decode Errors (5xx)
    // =================================================================
    /// The outer advance envelope could not be ABI-decoded.
    #[error("CB_ERR_500: Envelope decode failed: {reason}")]
    EnvelopeDecode { reason: String },

    /// The inner order payload could not be ABI-decoded.
    #[error("CB_ERR_501: Order payload decode failed: {reason}")]
    PayloadDecode { reason: String },

    // =================================================================
    // Rollup Transport Errors (6xx)
    // =================================================================
    /// Failure to reach the rollup server. The loop depends on this channel
    /// to make progress, so this class is retried with backoff and treated
    /// as a process-level failure on exhaustion.
    #[error("CB_ERR_600: Rollup transport failure: {reason}")]
    RollupTransport { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// A programming invariant was violated (e.g. checked arithmetic on
    /// quantities failed). Never expected on any input path.
    #[error("CB_ERR_900: Invariant violation: {reason}")]
    InvariantViolation { reason: String },

    /// Configuration error (missing or unparsable environment values).
    #[error("CB_ERR_901: Configuration error: {0}")]
    Configuration(String),
}

impl CrossbookError {
    /// Whether this error belongs to the retried-then-fatal transport class.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::RollupTransport { .. })
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, CrossbookError>;
