//! Generic-I/O protocol client for raw storage-word reads.
//!
//! Each elementary read is a request tagged with the fixed domain `0x27`
//! ("read storage word"). The request id is the ABI packing of
//! `(bytes32 blockHash, address contract, bytes32 slot)` — 96 bytes, the
//! address left-padded — and the response is a single 32-byte word rendered
//! as a hex string.

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::SolValue;
use async_trait::async_trait;
use crossbook_types::{CrossbookError, Result, constants::STORAGE_READ_DOMAIN};
use serde::{Deserialize, Serialize};

/// Wire request for one storage-word read.
#[derive(Debug, Clone, Serialize)]
pub struct GioRequest {
    pub domain: u16,
    /// `"0x" + hex(blockHash ‖ pad32(address) ‖ slot)`.
    pub id: String,
}

/// Wire response carrying the storage word.
#[derive(Debug, Clone, Deserialize)]
pub struct GioResponse {
    pub response_code: u16,
    pub response: String,
}

/// Capability to read one storage word at a pinned block.
///
/// The seam between the layout decoder and the transport: production uses
/// [`GioClient`], tests use an in-memory word map.
#[async_trait]
pub trait StorageReader: Send + Sync {
    /// Read the word at `slot` of `contract`, as of `block_hash`.
    ///
    /// # Errors
    /// `StorageReadFailed` on transport or protocol failure,
    /// `MalformedStorageWord` if the response word cannot be parsed.
    async fn storage_word(&self, block_hash: B256, contract: Address, slot: B256) -> Result<U256>;
}

/// Build the read-request id for `(block_hash, contract, slot)`.
#[must_use]
pub fn read_id(block_hash: B256, contract: Address, slot: B256) -> String {
    let packed = (block_hash, contract, slot).abi_encode_params();
    format!("0x{}", hex::encode(packed))
}

/// Parse a `"0x..."` hex word into a `U256`.
pub(crate) fn parse_word(raw: &str) -> Result<U256> {
    let digits = raw.strip_prefix("0x").unwrap_or(raw);
    if digits.is_empty() || digits.len() > 64 {
        return Err(CrossbookError::MalformedStorageWord {
            reason: format!("bad word length in {raw:?}"),
        });
    }
    U256::from_str_radix(digits, 16).map_err(|_| CrossbookError::MalformedStorageWord {
        reason: format!("not a hex word: {raw:?}"),
    })
}

/// HTTP implementation of [`StorageReader`] against the rollup server's
/// `/gio` endpoint.
#[derive(Debug, Clone)]
pub struct GioClient {
    http: reqwest::Client,
    endpoint: String,
}

impl GioClient {
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: format!("{}/gio", base_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl StorageReader for GioClient {
    async fn storage_word(&self, block_hash: B256, contract: Address, slot: B256) -> Result<U256> {
        let request = GioRequest {
            domain: STORAGE_READ_DOMAIN,
            id: read_id(block_hash, contract, slot),
        };
        tracing::trace!(%block_hash, %contract, %slot, "storage read");

        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| CrossbookError::StorageReadFailed {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrossbookError::StorageReadFailed {
                reason: format!("gio endpoint returned {status}"),
            });
        }

        let body: GioResponse =
            response
                .json()
                .await
                .map_err(|e| CrossbookError::StorageReadFailed {
                    reason: format!("invalid gio response body: {e}"),
                })?;

        parse_word(&body.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_id_packs_block_address_slot() {
        let block_hash = B256::repeat_byte(0x11);
        let contract = Address::repeat_byte(0x22);
        let slot = B256::repeat_byte(0x33);

        let id = read_id(block_hash, contract, slot);
        let bytes = hex::decode(id.strip_prefix("0x").unwrap()).unwrap();
        assert_eq!(bytes.len(), 96);
        assert_eq!(&bytes[..32], block_hash.as_slice());
        // Address occupies the low 20 bytes of its word, left-padded.
        assert_eq!(&bytes[32..44], &[0u8; 12]);
        assert_eq!(&bytes[44..64], contract.as_slice());
        assert_eq!(&bytes[64..], slot.as_slice());
    }

    #[test]
    fn parse_word_accepts_short_and_full_hex() {
        assert_eq!(parse_word("0x0").unwrap(), U256::ZERO);
        assert_eq!(parse_word("0x2a").unwrap(), U256::from(42u64));
        let full = format!("0x{}", "00".repeat(31) + "05");
        assert_eq!(parse_word(&full).unwrap(), U256::from(5u64));
    }

    #[test]
    fn parse_word_rejects_garbage() {
        assert!(parse_word("0x").is_err());
        assert!(parse_word("0xzz").is_err());
        assert!(parse_word(&format!("0x{}", "0".repeat(65))).is_err());
    }

    #[test]
    fn gio_request_wire_shape() {
        let request = GioRequest {
            domain: STORAGE_READ_DOMAIN,
            id: "0xabc123".into(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["domain"], 39);
        assert_eq!(json["id"], "0xabc123");
    }

    #[test]
    fn gio_response_wire_shape() {
        let body: GioResponse =
            serde_json::from_str(r#"{"response_code":200,"response":"0x2a"}"#).unwrap();
        assert_eq!(body.response_code, 200);
        assert_eq!(parse_word(&body.response).unwrap(), U256::from(42u64));
    }
}
