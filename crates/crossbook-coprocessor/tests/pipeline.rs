//! End-to-end pipeline tests for the advance state machine.
//!
//! These exercise the full cycle against in-memory capabilities:
//! decode order -> ingest -> reconstruct both sides from synthetic storage
//! words -> match -> commit fills -> encode notices. The rollup transport
//! stays out; everything else is the production code path.

use std::sync::Arc;

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::{SolCall, SolValue};
use crossbook_coprocessor::codec::{self, EvmAdvanceCall};
use crossbook_coprocessor::{AdvanceEnvelope, AdvanceProcessor};
use crossbook_storage::reconstruct::{element_word_slot, slot_word, status_flag_slot};
use crossbook_storage::{InMemoryOrderRepository, MemoryStorage, OrderRepository};
use crossbook_types::{BookStorageLayout, CrossbookError, OrderStatus, Side};

const BLOCK: B256 = B256::repeat_byte(0xB0);
const CONTRACT: Address = Address::repeat_byte(0xC0);

/// The state machine wired to an in-memory repository and storage snapshot.
struct Pipeline {
    repository: Arc<InMemoryOrderRepository>,
    processor: AdvanceProcessor,
}

fn pipeline(storage: MemoryStorage) -> Pipeline {
    let repository = Arc::new(InMemoryOrderRepository::new());
    let processor = AdvanceProcessor::new(
        Arc::clone(&repository) as Arc<dyn OrderRepository>,
        Arc::new(storage),
        BookStorageLayout::default(),
    );
    Pipeline {
        repository,
        processor,
    }
}

/// Seed one side's storage array: `(sqrt_price, amount, matched)` per
/// element plus cancellation flags, exactly as the contract lays them out.
fn seed_side(storage: &mut MemoryStorage, side: Side, elements: &[(u64, u64, u64)], cancelled: &[u64]) {
    let layout = BookStorageLayout::default();
    let (orders_slot, status_slot) = layout.side_slots(side);
    storage.insert(
        BLOCK,
        CONTRACT,
        slot_word(orders_slot),
        U256::from(elements.len() as u64),
    );
    for (index, (price, amount, matched)) in elements.iter().enumerate() {
        for (word, value) in [(1u64, *price), (2, *amount), (3, *matched)] {
            storage.insert(
                BLOCK,
                CONTRACT,
                element_word_slot(orders_slot, index as u64, word),
                U256::from(value),
            );
        }
    }
    for index in cancelled {
        storage.insert(BLOCK, CONTRACT, status_flag_slot(status_slot, *index), U256::ONE);
    }
}

fn submission_payload(index: u64, price: u64, quantity: u64, side_flag: u64) -> Vec<u8> {
    (
        U256::from(index),
        U256::from(price),
        U256::from(quantity),
        U256::from(side_flag),
    )
        .abi_encode_params()
}

fn envelope_with(payload: Vec<u8>) -> AdvanceEnvelope {
    AdvanceEnvelope {
        chain_id: 31337,
        task_manager: Address::repeat_byte(0x11),
        msg_sender: CONTRACT,
        block_hash: BLOCK,
        block_number: 64,
        block_timestamp: 1_700_000_000,
        prev_randao: U256::from(7u64),
        payload: payload.into(),
    }
}

fn decode_notice(raw: &str) -> (Address, u64, u64) {
    let bytes = hex::decode(raw.strip_prefix("0x").unwrap()).unwrap();
    let (recipient, bid_id, ask_id) = <(Address, U256, U256)>::abi_decode_params(&bytes, true).unwrap();
    (
        recipient,
        u64::try_from(bid_id).unwrap(),
        u64::try_from(ask_id).unwrap(),
    )
}

// =============================================================================
// Happy path: an incoming bid crosses two reconstructed asks
// =============================================================================
#[tokio::test]
async fn incoming_buy_crosses_reconstructed_asks() {
    let mut storage = MemoryStorage::new();
    seed_side(&mut storage, Side::Sell, &[(90, 40, 0), (85, 60, 0)], &[]);
    let p = pipeline(storage);

    // Buy #1 @ 100 for 100: consumes ask #2 (85) first, then ask #1 (90).
    let envelope = envelope_with(submission_payload(1, 100, 100, 0));
    let notices = p.processor.handle_advance(&envelope).await.unwrap();

    let decoded: Vec<(Address, u64, u64)> = notices.iter().map(|n| decode_notice(n)).collect();
    assert_eq!(
        decoded,
        vec![(CONTRACT, 0, 1), (CONTRACT, 0, 0)],
        "notices carry 0-based ids, lower ask price served first"
    );

    // Every touched order is fully consumed and closed.
    let bid = p.repository.find_by_id(Side::Buy, 1).unwrap();
    assert_eq!(bid.matched_amount, U256::from(100u64));
    assert_eq!(bid.status, OrderStatus::Closed);
    for id in [1, 2] {
        let ask = p.repository.find_by_id(Side::Sell, id).unwrap();
        assert_eq!(ask.status, OrderStatus::Closed);
        assert!(ask.is_fulfilled());
    }
}

// =============================================================================
// No prior orders, no cross: clean no-op
// =============================================================================
#[tokio::test]
async fn empty_storage_and_no_cross_accepts_with_no_notices() {
    let p = pipeline(MemoryStorage::new());

    let envelope = envelope_with(submission_payload(1, 100, 50, 1));
    let notices = p.processor.handle_advance(&envelope).await.unwrap();
    assert!(notices.is_empty());

    // The submitted sell rests untouched in the repository.
    let sell = p.repository.find_by_id(Side::Sell, 1).unwrap();
    assert_eq!(sell.matched_amount, U256::ZERO);
    assert_eq!(sell.status, OrderStatus::Active);
}

// =============================================================================
// Closed prior orders never enter the book
// =============================================================================
#[tokio::test]
async fn cancelled_and_fulfilled_priors_do_not_match() {
    let mut storage = MemoryStorage::new();
    // Ask #1 cancelled on-chain, ask #2 already fully matched.
    seed_side(&mut storage, Side::Sell, &[(85, 60, 0), (90, 40, 40)], &[0]);
    let p = pipeline(storage);

    let envelope = envelope_with(submission_payload(1, 100, 100, 0));
    let notices = p.processor.handle_advance(&envelope).await.unwrap();
    assert!(notices.is_empty(), "closed orders must not trade");

    let asks = p.repository.find_by_side(Side::Sell).unwrap();
    assert_eq!(asks.len(), 2);
    assert!(asks.iter().all(|o| o.status == OrderStatus::Closed));
}

// =============================================================================
// Error paths
// =============================================================================
#[tokio::test]
async fn duplicate_reconstructed_id_rejects_the_request() {
    let mut storage = MemoryStorage::new();
    // Prior buy #1 on-chain collides with the submission claiming index 1.
    seed_side(&mut storage, Side::Buy, &[(100, 50, 0)], &[]);
    let p = pipeline(storage);

    let envelope = envelope_with(submission_payload(1, 100, 50, 0));
    let err = p.processor.handle_advance(&envelope).await.unwrap_err();
    assert!(matches!(
        err,
        CrossbookError::DuplicateOrder {
            side: Side::Buy,
            id: 1
        }
    ));
}

#[tokio::test]
async fn storage_read_failure_rejects_the_request() {
    let mut storage = MemoryStorage::new();
    seed_side(&mut storage, Side::Sell, &[(90, 40, 0)], &[]);
    // The sell array length read fails mid-reconstruction.
    let (sell_orders_slot, _) = BookStorageLayout::default().side_slots(Side::Sell);
    storage.fail_at(slot_word(sell_orders_slot));
    let p = pipeline(storage);

    let envelope = envelope_with(submission_payload(1, 100, 50, 0));
    let err = p.processor.handle_advance(&envelope).await.unwrap_err();
    assert!(matches!(err, CrossbookError::StorageReadFailed { .. }));
}

#[tokio::test]
async fn malformed_inner_payload_rejects_the_request() {
    let p = pipeline(MemoryStorage::new());
    let envelope = envelope_with(vec![0xAA; 7]);
    let err = p.processor.handle_advance(&envelope).await.unwrap_err();
    assert!(matches!(err, CrossbookError::PayloadDecode { .. }));
}

// =============================================================================
// Full decode path from the raw call input
// =============================================================================
#[tokio::test]
async fn raw_call_input_flows_through_envelope_decoding() {
    let mut storage = MemoryStorage::new();
    seed_side(&mut storage, Side::Sell, &[(90, 50, 0)], &[]);
    let p = pipeline(storage);

    let call = EvmAdvanceCall {
        chainId: U256::from(31337u64),
        taskManager: Address::repeat_byte(0x11),
        msgSender: CONTRACT,
        blockHash: BLOCK,
        blockNumber: U256::from(64u64),
        blockTimestamp: U256::from(1_700_000_000u64),
        prevRandao: U256::from(7u64),
        payload: submission_payload(1, 100, 50, 0).into(),
    };
    let raw = format!("0x{}", hex::encode(call.abi_encode()));

    let envelope = codec::decode_envelope(&raw).unwrap();
    assert_eq!(envelope.msg_sender, CONTRACT);
    assert_eq!(envelope.block_hash, BLOCK);

    let notices = p.processor.handle_advance(&envelope).await.unwrap();
    assert_eq!(notices.len(), 1);
    assert_eq!(decode_notice(&notices[0]), (CONTRACT, 0, 0));
}

// =============================================================================
// Determinism: identical inputs -> identical outputs
// =============================================================================
#[tokio::test]
async fn repeated_runs_produce_identical_notices() {
    let mut outputs = Vec::new();
    for _ in 0..2 {
        let mut storage = MemoryStorage::new();
        seed_side(&mut storage, Side::Sell, &[(90, 40, 0), (85, 60, 0), (95, 20, 5)], &[]);
        seed_side(&mut storage, Side::Buy, &[(88, 30, 0)], &[]);
        let p = pipeline(storage);

        let envelope = envelope_with(submission_payload(2, 100, 100, 0));
        outputs.push(p.processor.handle_advance(&envelope).await.unwrap());
    }
    assert_eq!(outputs[0], outputs[1], "replicas must agree byte for byte");
}
