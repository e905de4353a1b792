//! The coprocessor state machine.
//!
//! [`AdvanceProcessor`] handles one advance request end to end:
//! `DecodeOrder -> IngestAndReconstruct -> Match -> EmitNotices` (encoding
//! only — transport stays out so the whole pipeline runs in tests against
//! in-memory capabilities).
//!
//! [`Coprocessor`] owns the outer loop: `AwaitRequest` polls `/finish` with
//! the previous cycle's status, `DecodeEnvelope` parses the raw input, and
//! `Report` feeds accept/reject back into the next poll. Rollup transport
//! failures retry with exponential backoff; exhaustion ends the process
//! after an `/exception` report. Everything else is a local reject — the
//! loop never stops for a bad request.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::U256;
use crossbook_matchcore::{OrderBook, match_book};
use crossbook_storage::{OrderRepository, StorageReader, reconstruct_orders};
use crossbook_types::{
    BookStorageLayout, CoprocessorConfig, CrossbookError, Order, OrderStatus, Result, Side,
};

use crate::codec::{self, AdvanceEnvelope};
use crate::rollup::{FinishResponse, FinishStatus, RollupClient};

/// Handles one decoded advance request against the repository and the
/// storage-reconstruction client.
pub struct AdvanceProcessor {
    repository: Arc<dyn OrderRepository>,
    reader: Arc<dyn StorageReader>,
    layout: BookStorageLayout,
}

impl AdvanceProcessor {
    #[must_use]
    pub fn new(
        repository: Arc<dyn OrderRepository>,
        reader: Arc<dyn StorageReader>,
        layout: BookStorageLayout,
    ) -> Self {
        Self {
            repository,
            reader,
            layout,
        }
    }

    /// Process one advance request; returns the encoded notice payloads to
    /// emit (empty when the book does not cross).
    ///
    /// # Errors
    /// Any decode, validation, repository, reconstruction, or matching
    /// error — the caller reports the request as rejected.
    pub async fn handle_advance(&self, envelope: &AdvanceEnvelope) -> Result<Vec<String>> {
        // DecodeOrder
        let submission = codec::decode_order_payload(&envelope.payload)?;
        let order = Order::new(
            submission.index,
            envelope.msg_sender,
            submission.price,
            submission.quantity,
            U256::ZERO,
            submission.side,
            OrderStatus::Active,
        )?;
        tracing::info!(%order, block = envelope.block_number, "order submission decoded");

        // IngestAndReconstruct: the incoming order plus both sides' prior
        // orders, all pinned to the envelope's block hash.
        self.repository.create(order)?;
        for side in [Side::Buy, Side::Sell] {
            let prior = reconstruct_orders(
                self.reader.as_ref(),
                envelope.msg_sender,
                envelope.block_hash,
                side,
                &self.layout,
            )
            .await?;
            tracing::info!(%side, count = prior.len(), "prior orders reconstructed");
            for reconstructed in prior {
                self.repository.create(reconstructed)?;
            }
        }

        // Match over every currently active order.
        let bids = self.active_orders(Side::Buy)?;
        let asks = self.active_orders(Side::Sell)?;
        tracing::info!(bids = bids.len(), asks = asks.len(), "matching order book");

        let mut book = OrderBook::from_sides(&bids, &asks)?;
        let outcome = match match_book(&mut book) {
            Err(CrossbookError::NoMatch) => {
                tracing::info!("book does not cross; accepting with no notices");
                return Ok(Vec::new());
            }
            other => other?,
        };

        // Commit every matched-amount delta before emitting anything.
        for fill in &outcome.fills {
            self.repository
                .apply_fill(fill.side, fill.order_id, fill.quantity)?;
        }

        // EmitNotices (encoding; transport belongs to the loop).
        let notices = outcome
            .trades
            .iter()
            .map(|trade| codec::encode_trade_notice(envelope.msg_sender, trade))
            .collect::<Result<Vec<String>>>()?;
        tracing::info!(trades = notices.len(), "match complete");
        Ok(notices)
    }

    /// One side's active orders; an empty side is a normal outcome.
    fn active_orders(&self, side: Side) -> Result<Vec<Order>> {
        match self
            .repository
            .find_by_side_and_status(side, OrderStatus::Active)
        {
            Err(CrossbookError::NoOrdersFound) => Ok(Vec::new()),
            other => other,
        }
    }
}

/// The poll loop: fetch, process, report, forever.
pub struct Coprocessor {
    config: CoprocessorConfig,
    rollup: RollupClient,
    processor: AdvanceProcessor,
}

impl Coprocessor {
    #[must_use]
    pub fn new(config: CoprocessorConfig, rollup: RollupClient, processor: AdvanceProcessor) -> Self {
        Self {
            config,
            rollup,
            processor,
        }
    }

    /// Run the loop until the rollup channel is lost for good.
    ///
    /// # Errors
    /// Only `RollupTransport`, after retries are exhausted. Rejected
    /// requests never surface here.
    pub async fn run(&self) -> Result<()> {
        let mut status = FinishStatus::Accept;
        loop {
            // AwaitRequest (doubles as Report for the previous cycle).
            let pending = self
                .with_retry("finish", || self.rollup.finish(status))
                .await;
            let pending = match pending {
                Ok(pending) => pending,
                Err(err) => return self.give_up(err).await,
            };

            let Some(request) = pending else {
                tracing::debug!("no pending rollup request");
                tokio::time::sleep(Duration::from_millis(self.config.poll_interval_ms)).await;
                status = FinishStatus::Accept;
                continue;
            };

            status = match self.process(&request).await {
                Ok(()) => FinishStatus::Accept,
                Err(err) if err.is_transport() => return self.give_up(err).await,
                Err(err) => {
                    tracing::warn!(error = %err, "request rejected");
                    FinishStatus::Reject
                }
            };
            tracing::info!(%status, "cycle complete");
        }
    }

    /// DecodeEnvelope -> handle -> EmitNotices over the wire.
    async fn process(&self, request: &FinishResponse) -> Result<()> {
        tracing::info!(request_type = %request.request_type, "processing rollup request");
        let envelope = codec::decode_envelope(&request.data.payload)?;
        let notices = self.processor.handle_advance(&envelope).await?;
        for payload in &notices {
            self.with_retry("notice", || self.rollup.notice(payload))
                .await?;
        }
        Ok(())
    }

    /// Retry a transport operation with exponential backoff. Non-transport
    /// errors pass through untouched.
    async fn with_retry<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut delay = Duration::from_millis(self.config.retry_base_ms);
        for attempt in 1..=self.config.max_retries {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transport() && attempt < self.config.max_retries => {
                    tracing::warn!(attempt, error = %err, "{what} failed, backing off");
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
                Err(err) => return Err(err),
            }
        }
        Err(CrossbookError::RollupTransport {
            reason: format!("{what}: retries exhausted"),
        })
    }

    /// Surface the fatal error via `/exception` (best effort) and bubble it.
    async fn give_up(&self, err: CrossbookError) -> Result<()> {
        tracing::error!(error = %err, "rollup channel lost; giving up");
        let payload = format!("0x{}", hex::encode(err.to_string()));
        if let Err(report_err) = self.rollup.exception(&payload).await {
            tracing::warn!(error = %report_err, "exception report also failed");
        }
        Err(err)
    }
}
