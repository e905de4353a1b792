//! In-memory [`StorageReader`] over a word map.
//!
//! Absent slots read as zero, matching chain semantics for untouched
//! storage. Individual slots can be marked as failing to exercise the
//! abort-on-read-failure path.

use std::collections::{HashMap, HashSet};

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use crossbook_types::{CrossbookError, Result};

use crate::StorageReader;

/// Deterministic storage snapshot for tests and offline replay.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    words: HashMap<(B256, Address, B256), U256>,
    failing: HashSet<B256>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed one word.
    pub fn insert(&mut self, block_hash: B256, contract: Address, slot: B256, word: U256) {
        self.words.insert((block_hash, contract, slot), word);
    }

    /// Make every read of `slot` fail.
    pub fn fail_at(&mut self, slot: B256) {
        self.failing.insert(slot);
    }
}

#[async_trait]
impl StorageReader for MemoryStorage {
    async fn storage_word(&self, block_hash: B256, contract: Address, slot: B256) -> Result<U256> {
        if self.failing.contains(&slot) {
            return Err(CrossbookError::StorageReadFailed {
                reason: format!("injected failure at slot {slot}"),
            });
        }
        Ok(self
            .words
            .get(&(block_hash, contract, slot))
            .copied()
            .unwrap_or(U256::ZERO))
    }
}
