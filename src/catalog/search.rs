//! Root item enumeration
//!
//! Roots are every item an owner created inside a creation-date window,
//! discovered through the portal's paged search. The portal refuses to page
//! past its result limit, so once the offset passes it the window is narrowed
//! to start just after the newest item seen so far and paging starts over.

use crate::catalog::{CatalogResult, ItemId, PortalClient};
use chrono::Utc;
use std::collections::HashSet;

/// Results requested per search page (the portal maximum)
pub const SEARCH_PAGE_SIZE: u32 = 100;

/// Highest 1-based offset the portal will serve for a single query
pub const SEARCH_RESULT_LIMIT: i64 = 10_000;

/// Owner and creation-date range (epoch milliseconds, inclusive) of a root search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchWindow {
    pub owner: String,
    pub from: i64,
    pub to: i64,
}

impl SearchWindow {
    /// Window from `from` up to the current time
    pub fn until_now(owner: impl Into<String>, from: i64) -> Self {
        Self {
            owner: owner.into(),
            from,
            to: Utc::now().timestamp_millis(),
        }
    }

    pub fn query(&self) -> String {
        format!(
            "owner:{} AND created:[{} TO {}]",
            self.owner, self.from, self.to
        )
    }
}

/// Enumerates root item ids in creation order
///
/// # Arguments
///
/// * `client` - The portal client to search with
/// * `window` - Owner and creation-date window to search
/// * `limit` - Stop once this many ids were found
///
/// # Returns
///
/// Distinct ids in the order the search returned them.
pub async fn enumerate_roots(
    client: &PortalClient,
    window: &SearchWindow,
    limit: Option<usize>,
) -> CatalogResult<Vec<ItemId>> {
    let mut window = window.clone();
    let mut found = Vec::new();
    let mut seen = HashSet::new();
    let mut start = 1i64;
    let mut last_created: Option<i64> = None;
    let mut pages = 0u32;

    loop {
        if matches!(limit, Some(max) if found.len() >= max) {
            tracing::info!("Search limit of {} root items reached", found.len());
            break;
        }

        if start > SEARCH_RESULT_LIMIT {
            let Some(created) = last_created else {
                break;
            };
            window.from = created + 1;
            start = 1;
            tracing::debug!("Search window narrowed to {}", window.query());
        }

        let query = window.query();
        tracing::debug!("Query: {} (start {})", query, start);
        let page = client.search(&query, start, SEARCH_PAGE_SIZE).await?;
        pages += 1;

        let returned = page.results.len();
        for result in page.results {
            last_created = Some(result.created);
            if seen.insert(result.id.clone()) {
                found.push(result.id);
            }
        }

        tracing::info!(
            "Total items found: {} in {} search pages",
            found.len(),
            pages
        );

        if returned == 0 || page.next_start <= 0 {
            break;
        }
        start = page.next_start;
    }

    if let Some(max) = limit {
        found.truncate(max);
    }

    Ok(found)
}
