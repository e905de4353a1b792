//! # crossbook-types
//!
//! Shared types, errors, and configuration for the **Crossbook** coprocessor.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Order model**: [`Order`], [`Side`], [`OrderStatus`]
//! - **Trade model**: [`Trade`], [`Fill`]
//! - **Configuration**: [`CoprocessorConfig`], [`BookStorageLayout`]
//! - **Errors**: [`CrossbookError`] with `CB_ERR_` prefix codes
//! - **Constants**: protocol domains, storage-layout defaults, retry policy

pub mod config;
pub mod constants;
pub mod error;
pub mod order;
pub mod trade;

// Re-export all primary types at crate root for ergonomic imports:
//   use crossbook_types::{Order, Side, Trade, CrossbookError, ...};

pub use config::*;
pub use error::*;
pub use order::*;
pub use trade::*;

// Constants are accessed via `crossbook_types::constants::FOO`
// (not re-exported to avoid name collisions).
