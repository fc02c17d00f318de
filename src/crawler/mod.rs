//! Relationship crawler
//!
//! This module contains the core crawling logic, including:
//! - Reference extraction from item payloads
//! - Item fetching with bounded retry
//! - Depth-first walking of each root's reference graph
//! - Reconciliation of paused edges
//! - Overall crawl coordination

mod coordinator;
mod edge;
mod extract;
mod fetch;
mod reconcile;
mod walker;

pub use coordinator::{resolve_roots, run_crawl, Coordinator, CrawlReport};
pub use edge::{Edge, EdgeKey, EdgeTable, ItemSummary, MissRecord, MissTable};
pub use extract::{extract_from_payloads, extract_reference_ids, find_ids};
pub use fetch::{FetchError, Fetcher};
pub use reconcile::{reconcile, ReconcileSummary};
pub use walker::{RootFragment, RootTraversal};

use crate::catalog::ItemId;
use crate::config::Config;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Connect to the configured portal
/// 2. Resolve the root items (overrides, config list, or owner search)
/// 3. Walk every root and collect its edges and misses
/// 4. Reconcile paused edges
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `roots` - Root ids that replace the configured ones when non-empty
pub async fn crawl(config: &Config, roots: Vec<ItemId>) -> crate::Result<CrawlReport> {
    run_crawl(config, roots).await
}
