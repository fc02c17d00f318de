//! Catalog module: access to the content catalog being crawled
//!
//! The crawler only needs two capabilities from a catalog: fetching an item's
//! metadata by id and retrieving the payloads that may reference other items.
//! This module defines that seam as the [`Catalog`] trait and provides:
//! - A REST client for portal catalogs ([`PortalClient`])
//! - Paginated root enumeration over a portal search ([`enumerate_roots`])
//! - An in-memory catalog for tests and embedding callers ([`MemoryCatalog`])

mod item;
mod memory;
mod portal;
mod search;

pub use item::{InvalidItemId, Item, ItemId, ItemPayloads, DUAL_RESOURCE_TYPES, ITEM_ID_LEN};
pub use memory::MemoryCatalog;
pub use portal::{select_story_resources, PortalClient, SearchPage, SearchResult};
pub use search::{enumerate_roots, SearchWindow, SEARCH_PAGE_SIZE, SEARCH_RESULT_LIMIT};

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while talking to a catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Portal error {code}: {message}")]
    Portal { code: i64, message: String },

    #[error("Item not found: {0}")]
    NotFound(ItemId),

    #[error("Malformed response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error("{0}")]
    Unavailable(String),
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Capabilities the crawler consumes from a content catalog
///
/// Implementations must be shareable across tasks: the coordinator walks
/// several roots at once against the same catalog.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Fetches an item's metadata by id (a single attempt, no retry)
    async fn fetch_item(&self, id: &ItemId) -> CatalogResult<Item>;

    /// Retrieves the primary and, for dual-resource types, secondary payloads
    async fn item_payloads(&self, item: &Item) -> CatalogResult<ItemPayloads>;
}
