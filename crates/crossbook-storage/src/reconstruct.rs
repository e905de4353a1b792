//! Deterministic order reconstruction from raw storage words.
//!
//! Layout of one side of the book in the contract's storage:
//!
//! ```text
//! orders_slot                  -> array length N
//! keccak256(pad32(orders_slot)) = base
//! base + 4*i + 0               -> reserved
//! base + 4*i + 1               -> sqrt_price
//! base + 4*i + 2               -> amount
//! base + 4*i + 3               -> matched_amount
//! keccak256(pad32(i) ‖ pad32(status_slot)) -> 1 if cancelled
//! ```
//!
//! Every read of one pass is pinned to a single block hash; a read failure
//! aborts the whole pass — a partial snapshot would make the downstream
//! matching result non-reproducible.

use alloy_primitives::{Address, B256, U256, keccak256};
use crossbook_types::{
    BookStorageLayout, CrossbookError, Order, OrderStatus, Result, Side,
    constants::WORDS_PER_ORDER,
};

use crate::StorageReader;

/// The 32-byte slot word for a small integer slot number.
#[must_use]
pub fn slot_word(slot: u64) -> B256 {
    B256::from(U256::from(slot))
}

/// Storage slot of the `word`-th word of array element `index`.
///
/// Slot arithmetic wraps, matching EVM layout semantics.
#[must_use]
pub fn element_word_slot(orders_slot: u64, index: u64, word: u64) -> B256 {
    let base = U256::from_be_bytes(keccak256(slot_word(orders_slot)).0);
    let offset = U256::from(index) * U256::from(WORDS_PER_ORDER) + U256::from(word);
    B256::from(base.wrapping_add(offset))
}

/// Storage slot of the cancellation flag for array element `index`.
#[must_use]
pub fn status_flag_slot(status_slot: u64, index: u64) -> B256 {
    let mut key = [0u8; 64];
    key[..32].copy_from_slice(slot_word(index).as_slice());
    key[32..].copy_from_slice(slot_word(status_slot).as_slice());
    keccak256(key)
}

/// Rebuild one side's prior orders as recorded on-chain at `block_hash`.
///
/// Returns an empty vec when the array length word is zero — "no prior
/// orders" is a normal outcome, not a failure.
///
/// # Errors
/// Any read failure or malformed word aborts the pass; an element that
/// decodes into an invalid order surfaces as `InvalidOrder`.
pub async fn reconstruct_orders(
    reader: &dyn StorageReader,
    contract: Address,
    block_hash: B256,
    side: Side,
    layout: &BookStorageLayout,
) -> Result<Vec<Order>> {
    let (orders_slot, status_slot) = layout.side_slots(side);

    let length_word = reader
        .storage_word(block_hash, contract, slot_word(orders_slot))
        .await?;
    if length_word.is_zero() {
        tracing::debug!(%side, slot = orders_slot, "no prior orders in storage");
        return Ok(Vec::new());
    }
    let length = u64::try_from(length_word).map_err(|_| CrossbookError::MalformedStorageWord {
        reason: format!("array length at slot {orders_slot} exceeds u64"),
    })?;

    tracing::debug!(%side, count = length, "reconstructing orders");

    let mut orders = Vec::with_capacity(length as usize);
    for index in 0..length {
        let mut words = [U256::ZERO; WORDS_PER_ORDER as usize];
        for (word, target) in words.iter_mut().enumerate() {
            let slot = element_word_slot(orders_slot, index, word as u64);
            *target = reader.storage_word(block_hash, contract, slot).await?;
        }

        let cancelled = reader
            .storage_word(block_hash, contract, status_flag_slot(status_slot, index))
            .await?
            == U256::ONE;

        let sqrt_price = words[1];
        let amount = words[2];
        let matched_amount = words[3];
        let status = if cancelled || amount == matched_amount {
            OrderStatus::Closed
        } else {
            OrderStatus::Active
        };

        // On-chain indexes are 0-based; domain ids are 1-based (id 0 reserved).
        let order = Order::new(
            index + 1,
            contract,
            sqrt_price,
            amount,
            matched_amount,
            side,
            status,
        )?;
        tracing::debug!(%order, "order reconstructed");
        orders.push(order);
    }

    Ok(orders)
}
