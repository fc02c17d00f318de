//! Catalog-Relations: a relationship mapper for content catalogs
//!
//! This crate crawls a portal's content catalog, follows the item identifiers
//! embedded in each item's payload, and records every (ancestor, related item)
//! edge together with the full path that reached it.

pub mod catalog;
pub mod config;
pub mod crawler;
pub mod item_type;
pub mod output;
pub mod state;

use thiserror::Error;

/// Main error type for Catalog-Relations operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] catalog::CatalogError),

    #[error("No root items to crawl: {0}")]
    NoRoots(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid item id in config: {0}")]
    InvalidItemId(String),
}

/// Result type alias for Catalog-Relations operations
pub type Result<T> = std::result::Result<T, CrawlError>;

// Re-export commonly used types
pub use catalog::{Catalog, Item, ItemId, ItemPayloads};
pub use config::Config;
pub use crawler::{CrawlReport, Edge, EdgeTable, ItemSummary, MissRecord};
pub use item_type::{classify, TypeLabel};
pub use state::{EdgeStatus, InProcess};
