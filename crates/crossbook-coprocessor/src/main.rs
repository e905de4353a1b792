//! Crossbook coprocessor binary.
//!
//! Composition root: install the tracing subscriber, read configuration
//! from the environment, then build repository -> storage client -> state
//! machine in that order and run the loop.

use std::sync::Arc;

use crossbook_coprocessor::{AdvanceProcessor, Coprocessor, RollupClient};
use crossbook_storage::{GioClient, InMemoryOrderRepository, OrderRepository, StorageReader};
use crossbook_types::{CoprocessorConfig, constants};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> crossbook_types::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = CoprocessorConfig::from_env()?;
    tracing::info!(
        engine = constants::ENGINE_NAME,
        version = constants::VERSION,
        rollup_url = %config.rollup_url,
        "starting coprocessor"
    );

    let repository: Arc<dyn OrderRepository> = Arc::new(InMemoryOrderRepository::new());
    let reader: Arc<dyn StorageReader> = Arc::new(GioClient::new(&config.rollup_url));
    let processor = AdvanceProcessor::new(repository, reader, config.layout);
    let rollup = RollupClient::new(&config.rollup_url);

    Coprocessor::new(config, rollup, processor).run().await
}
