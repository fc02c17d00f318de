//! Item fetcher
//!
//! Wraps a [`Catalog`] with the crawler's failure policy:
//! - Item fetches are retried a bounded number of times with a fixed delay
//!   between attempts, then reported as a [`FetchError`]
//! - Payload retrieval is best-effort: any failure yields empty payloads so a
//!   single bad item cannot abort the crawl

use crate::catalog::{Catalog, Item, ItemId, ItemPayloads};
use crate::config::CrawlerConfig;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// An item that could not be fetched within the allowed attempts
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to fetch {id} after {attempts} attempts: {message}")]
pub struct FetchError {
    pub id: ItemId,
    pub attempts: u32,
    /// Description of the last failure
    pub message: String,
}

/// Catalog access with retry and best-effort payload semantics
#[derive(Clone)]
pub struct Fetcher {
    catalog: Arc<dyn Catalog>,
    attempts: u32,
    retry_delay: Duration,
}

impl Fetcher {
    /// Creates a fetcher
    ///
    /// # Arguments
    ///
    /// * `catalog` - The catalog to fetch from
    /// * `attempts` - Total attempts per item (at least one is always made)
    /// * `retry_delay` - Pause between consecutive attempts
    pub fn new(catalog: Arc<dyn Catalog>, attempts: u32, retry_delay: Duration) -> Self {
        Self {
            catalog,
            attempts: attempts.max(1),
            retry_delay,
        }
    }

    pub fn from_config(catalog: Arc<dyn Catalog>, config: &CrawlerConfig) -> Self {
        Self::new(
            catalog,
            config.fetch_attempts,
            Duration::from_millis(config.retry_delay_ms),
        )
    }

    /// Fetches an item, retrying failed attempts
    ///
    /// # Retry Logic
    ///
    /// | Attempt outcome | Action |
    /// |-----------------|--------|
    /// | Success | Return the item |
    /// | Failure, attempts left | Sleep `retry_delay`, try again |
    /// | Failure, none left | Return `FetchError` with the last message |
    pub async fn fetch_item(&self, id: &ItemId) -> Result<Item, FetchError> {
        let mut last_error = String::new();

        for attempt in 1..=self.attempts {
            match self.catalog.fetch_item(id).await {
                Ok(item) => {
                    if attempt > 1 {
                        tracing::debug!("Fetched {} on attempt {}", id, attempt);
                    }
                    return Ok(item);
                }
                Err(e) => {
                    tracing::debug!(
                        "Error fetching item {}: {}. Attempt {}/{}",
                        id,
                        e,
                        attempt,
                        self.attempts
                    );
                    last_error = e.to_string();
                    if attempt < self.attempts {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }

        Err(FetchError {
            id: id.clone(),
            attempts: self.attempts,
            message: last_error,
        })
    }

    /// Retrieves an item's payloads, degrading any failure to empty payloads
    pub async fn item_payloads(&self, item: &Item) -> ItemPayloads {
        match self.catalog.item_payloads(item).await {
            Ok(payloads) => payloads,
            Err(e) => {
                tracing::warn!("Could not read payloads of {}: {}", item.id, e);
                ItemPayloads::default()
            }
        }
    }
}
