//! ABI codecs for the coprocessor's three wire shapes.
//!
//! - The outer **advance envelope**: an `EvmAdvance(...)` call whose first
//!   4 bytes are a selector, stripped before decoding.
//! - The inner **order payload**: `(index, price, quantity, sideFlag)`.
//! - The outgoing **trade notice**: `(recipient, bidId, askId)` with ids
//!   translated back to the chain's 0-based convention.

use alloy_primitives::{Address, B256, Bytes, U256};
use alloy_sol_types::{SolCall, SolValue, sol};
use crossbook_types::{CrossbookError, Result, Side, Trade};

sol! {
    /// The advance call relayed by the task manager.
    function EvmAdvance(
        uint256 chainId,
        address taskManager,
        address msgSender,
        bytes32 blockHash,
        uint256 blockNumber,
        uint256 blockTimestamp,
        uint256 prevRandao,
        bytes payload
    );
}

/// Decoded advance envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvanceEnvelope {
    pub chain_id: u64,
    pub task_manager: Address,
    pub msg_sender: Address,
    /// The block every storage read of this request is pinned to.
    pub block_hash: B256,
    pub block_number: u64,
    pub block_timestamp: u64,
    pub prev_randao: U256,
    /// The inner order payload, still ABI-encoded.
    pub payload: Bytes,
}

/// Decoded inner order payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderSubmission {
    /// 1-based order id: the contract submits its array length after the
    /// push, so no translation is needed here.
    pub index: u64,
    pub price: U256,
    pub quantity: U256,
    pub side: Side,
}

fn decode_hex(raw: &str) -> std::result::Result<Vec<u8>, hex::FromHexError> {
    hex::decode(raw.strip_prefix("0x").unwrap_or(raw))
}

/// Decode the raw `/finish` payload hex into an [`AdvanceEnvelope`].
pub fn decode_envelope(raw_hex: &str) -> Result<AdvanceEnvelope> {
    let raw = decode_hex(raw_hex).map_err(|e| CrossbookError::EnvelopeDecode {
        reason: format!("input is not hex: {e}"),
    })?;
    if raw.len() < 4 {
        return Err(CrossbookError::EnvelopeDecode {
            reason: "input shorter than a selector".into(),
        });
    }

    let call = EvmAdvanceCall::abi_decode_raw(&raw[4..], true).map_err(|e| {
        CrossbookError::EnvelopeDecode {
            reason: e.to_string(),
        }
    })?;

    Ok(AdvanceEnvelope {
        chain_id: u256_field(call.chainId, "chainId")?,
        task_manager: call.taskManager,
        msg_sender: call.msgSender,
        block_hash: call.blockHash,
        block_number: u256_field(call.blockNumber, "blockNumber")?,
        block_timestamp: u256_field(call.blockTimestamp, "blockTimestamp")?,
        prev_randao: call.prevRandao,
        payload: call.payload,
    })
}

fn u256_field(value: U256, name: &str) -> Result<u64> {
    u64::try_from(value).map_err(|_| CrossbookError::EnvelopeDecode {
        reason: format!("{name} exceeds u64"),
    })
}

/// Decode the inner order payload: `(index, price, quantity, sideFlag)`.
/// `sideFlag == 0` is a buy, anything else a sell.
pub fn decode_order_payload(payload: &[u8]) -> Result<OrderSubmission> {
    let (index, price, quantity, side_flag) =
        <(U256, U256, U256, U256)>::abi_decode_params(payload, true).map_err(|e| {
            CrossbookError::PayloadDecode {
                reason: e.to_string(),
            }
        })?;

    let index = u64::try_from(index).map_err(|_| CrossbookError::PayloadDecode {
        reason: "order index exceeds u64".into(),
    })?;
    let side = if side_flag.is_zero() {
        Side::Buy
    } else {
        Side::Sell
    };

    Ok(OrderSubmission {
        index,
        price,
        quantity,
        side,
    })
}

/// Encode one trade notice: `(recipient, bidId, askId)`, ids 0-based.
pub fn encode_trade_notice(recipient: Address, trade: &Trade) -> Result<String> {
    let bid_id = trade
        .bid_id
        .checked_sub(1)
        .ok_or(CrossbookError::InvariantViolation {
            reason: "trade carries reserved bid id 0".into(),
        })?;
    let ask_id = trade
        .ask_id
        .checked_sub(1)
        .ok_or(CrossbookError::InvariantViolation {
            reason: "trade carries reserved ask id 0".into(),
        })?;

    let payload = (recipient, U256::from(bid_id), U256::from(ask_id)).abi_encode_params();
    Ok(format!("0x{}", hex::encode(payload)))
}
