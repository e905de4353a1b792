//! # crossbook-coprocessor
//!
//! **The coprocessor's request/response plane.**
//!
//! Drives the cycle
//! `AwaitRequest -> DecodeEnvelope -> DecodeOrder -> IngestAndReconstruct
//! -> Match -> EmitNotices -> Report`, looping forever:
//!
//! - [`rollup`]: HTTP client for the rollup server's control endpoints
//!   (`/finish`, `/notice`, `/exception`)
//! - [`codec`]: ABI codecs for the advance envelope, the inner order
//!   payload, and trade notices
//! - [`machine`]: the state machine — [`AdvanceProcessor`] handles one
//!   request end to end, [`Coprocessor`] owns the poll loop and retry
//!   policy
//!
//! One request is fully processed through its accept/reject report before
//! the next is fetched; replicas fed the same input sequence produce
//! byte-identical outputs.

pub mod codec;
pub mod machine;
pub mod rollup;

pub use codec::{AdvanceEnvelope, OrderSubmission};
pub use machine::{AdvanceProcessor, Coprocessor};
pub use rollup::{FinishStatus, RollupClient};
