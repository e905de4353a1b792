//! HTTP client for the rollup server's control endpoints.
//!
//! `POST /finish` reports the previous cycle's status and fetches the next
//! pending request (202 = nothing pending). `POST /notice` emits one
//! chain-verifiable result. `POST /exception` surfaces a diagnostic payload
//! when the loop becomes unrecoverable.
//!
//! Every failure to reach the server maps to the `RollupTransport` error
//! class — the caller retries with backoff and treats exhaustion as a
//! process-level failure.

use crossbook_types::{CrossbookError, Result};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// Outcome of one processing cycle, reported via `/finish`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FinishStatus {
    Accept,
    Reject,
}

impl std::fmt::Display for FinishStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Accept => write!(f, "accept"),
            Self::Reject => write!(f, "reject"),
        }
    }
}

#[derive(Debug, Serialize)]
struct FinishRequest {
    status: FinishStatus,
}

/// A pending request returned by `/finish`.
#[derive(Debug, Clone, Deserialize)]
pub struct FinishResponse {
    pub request_type: String,
    pub data: AdvanceData,
}

/// The raw input of a pending advance request.
#[derive(Debug, Clone, Deserialize)]
pub struct AdvanceData {
    /// `"0x"`-prefixed hex of the full ABI call input, selector included.
    pub payload: String,
}

#[derive(Debug, Serialize)]
struct NoticeRequest<'a> {
    payload: &'a str,
}

#[derive(Debug, Serialize)]
struct ExceptionRequest<'a> {
    payload: &'a str,
}

/// Client over the rollup server's control endpoints.
#[derive(Debug, Clone)]
pub struct RollupClient {
    http: reqwest::Client,
    base_url: String,
}

impl RollupClient {
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn post<T: Serialize>(&self, endpoint: &str, body: &T) -> Result<reqwest::Response> {
        self.http
            .post(format!("{}/{endpoint}", self.base_url))
            .json(body)
            .send()
            .await
            .map_err(|e| CrossbookError::RollupTransport {
                reason: format!("{endpoint}: {e}"),
            })
    }

    /// Report `status` for the previous cycle and fetch the next pending
    /// request. `None` means nothing is pending (HTTP 202).
    pub async fn finish(&self, status: FinishStatus) -> Result<Option<FinishResponse>> {
        let response = self.post("finish", &FinishRequest { status }).await?;

        match response.status() {
            StatusCode::ACCEPTED => Ok(None),
            code if code.is_success() => {
                let pending: FinishResponse =
                    response
                        .json()
                        .await
                        .map_err(|e| CrossbookError::RollupTransport {
                            reason: format!("invalid finish response body: {e}"),
                        })?;
                Ok(Some(pending))
            }
            code => Err(CrossbookError::RollupTransport {
                reason: format!("finish returned {code}"),
            }),
        }
    }

    /// Emit one chain-verifiable notice payload (`"0x..."`).
    pub async fn notice(&self, payload: &str) -> Result<()> {
        let response = self.post("notice", &NoticeRequest { payload }).await?;
        let code = response.status();
        if code.is_success() {
            Ok(())
        } else {
            Err(CrossbookError::RollupTransport {
                reason: format!("notice returned {code}"),
            })
        }
    }

    /// Surface a diagnostic payload (`"0x..."`) before giving up.
    pub async fn exception(&self, payload: &str) -> Result<()> {
        let response = self.post("exception", &ExceptionRequest { payload }).await?;
        let code = response.status();
        if code.is_success() {
            Ok(())
        } else {
            Err(CrossbookError::RollupTransport {
                reason: format!("exception returned {code}"),
            })
        }
    }
}
