//! # crossbook-storage
//!
//! **Order state plane**: where order records live and where they come from.
//!
//! Two concerns share this crate:
//!
//! 1. **Repository** ([`OrderRepository`], [`InMemoryOrderRepository`]):
//!    the concurrency-safe store of orders keyed by `(side, id)`. One
//!    readers-writer lock guards both sides; reads run concurrently,
//!    writes are exclusive. Capability trait so a persistent
//!    implementation can replace the in-memory one without touching
//!    callers.
//! 2. **Reconstruction** ([`StorageReader`], [`GioClient`],
//!    [`reconstruct_orders`]): the deterministic protocol client that
//!    rebuilds prior orders from raw blockchain storage words at a pinned
//!    block, via the generic-I/O endpoint.

pub mod gio;
pub mod reconstruct;
pub mod repository;

#[cfg(any(test, feature = "test-helpers"))]
pub mod memory;

pub use gio::{GioClient, GioRequest, GioResponse, StorageReader};
pub use reconstruct::reconstruct_orders;
pub use repository::{InMemoryOrderRepository, OrderRepository};

#[cfg(any(test, feature = "test-helpers"))]
pub use memory::MemoryStorage;
