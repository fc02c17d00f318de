//! Crawler coordinator - main crawl orchestration logic
//!
//! This module drives a whole crawl run:
//! - Resolving the root set (command line, config, or owner search)
//! - Walking roots as independent tasks, bounded by `max-concurrent-roots`
//! - Merging each root's fragment in root order so every subtree stays
//!   contiguous in the edge table
//! - Reconciling paused edges once every root is done

use crate::catalog::{enumerate_roots, Catalog, ItemId, PortalClient, SearchWindow};
use crate::config::{Config, CrawlerConfig, SearchConfig};
use crate::crawler::edge::{Edge, EdgeTable, ItemSummary, MissRecord, MissTable};
use crate::crawler::fetch::Fetcher;
use crate::crawler::reconcile::{reconcile, ReconcileSummary};
use crate::crawler::walker::{RootFragment, RootTraversal};
use crate::state::EdgeStatus;
use crate::CrawlError;
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{self, JoinError, JoinSet};

/// Final result of a crawl run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Edges in root order, reconciled and deduplicated
    pub edges: Vec<Edge>,
    pub misses: Vec<MissRecord>,
    /// Roots that were fetched, in walk order
    pub roots: Vec<ItemSummary>,
    /// Every id that served as a root
    pub root_ids: BTreeSet<ItemId>,
    /// Roots handed to the coordinator after deduplication and limits
    pub roots_requested: usize,
    pub cycles_pruned: usize,
    pub reconcile: ReconcileSummary,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlReport {
    pub fn count_status(&self, status: EdgeStatus) -> usize {
        self.edges.iter().filter(|e| e.status == status).count()
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Main crawler coordinator structure
pub struct Coordinator {
    fetcher: Fetcher,
    max_concurrent_roots: usize,
    max_root_items: Option<usize>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `catalog` - Where items and their payloads come from
    /// * `config` - Retry and concurrency settings
    pub fn new(catalog: Arc<dyn Catalog>, config: &CrawlerConfig) -> Self {
        Self {
            fetcher: Fetcher::from_config(catalog, config),
            max_concurrent_roots: config.max_concurrent_roots.max(1) as usize,
            max_root_items: config.max_root_items,
        }
    }

    /// Walks every root and reconciles the combined edge table
    ///
    /// Duplicate roots are walked once. A root whose task fails is recorded
    /// as a miss; no root can stop the others.
    pub async fn run(&self, roots: Vec<ItemId>) -> CrawlReport {
        let started_at = Utc::now();
        let roots = self.select_roots(roots);
        tracing::info!(
            "Walking {} root items ({} at a time)",
            roots.len(),
            self.max_concurrent_roots
        );

        let fragments = self.walk_roots(&roots).await;

        let mut edges = EdgeTable::new();
        let mut misses = MissTable::new();
        let mut walked = Vec::new();
        let mut root_ids = BTreeSet::new();
        let mut cycles_pruned = 0;

        for fragment in fragments {
            if let Some(root) = fragment.root {
                root_ids.insert(root.id.clone());
                walked.push(root);
            }
            cycles_pruned += fragment.cycles_pruned;
            edges.merge(fragment.edges);
            misses.merge(fragment.misses);
        }

        let mut rows = edges.into_rows();
        let reconciled = reconcile(&mut rows);
        if reconciled.spliced > 0 || reconciled.dangling > 0 {
            tracing::info!(
                "Reconciled {} paused edges ({} rows added, {} dangling)",
                reconciled.spliced,
                reconciled.rows_added,
                reconciled.dangling
            );
        }

        let report = CrawlReport {
            edges: rows,
            misses: misses.into_rows(),
            roots: walked,
            root_ids,
            roots_requested: roots.len(),
            cycles_pruned,
            reconcile: reconciled,
            started_at,
            finished_at: Utc::now(),
        };

        tracing::info!(
            "Crawl completed: {} edges, {} missed items in {}s",
            report.edges.len(),
            report.misses.len(),
            report.duration().num_seconds()
        );

        report
    }

    /// Drops repeated roots, keeping first occurrences, then applies the root limit
    fn select_roots(&self, roots: Vec<ItemId>) -> Vec<ItemId> {
        let mut seen = HashSet::new();
        let mut selected: Vec<ItemId> = roots
            .into_iter()
            .filter(|id| seen.insert(id.clone()))
            .collect();

        if let Some(limit) = self.max_root_items {
            if selected.len() > limit {
                tracing::info!(
                    "Limiting crawl to the first {} of {} roots",
                    limit,
                    selected.len()
                );
                selected.truncate(limit);
            }
        }

        selected
    }

    /// Runs one traversal task per root and returns their fragments in root order
    async fn walk_roots(&self, roots: &[ItemId]) -> Vec<RootFragment> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_roots));
        let mut tasks = JoinSet::new();
        let mut task_roots: HashMap<task::Id, usize> = HashMap::with_capacity(roots.len());

        for (index, root) in roots.iter().enumerate() {
            let fetcher = self.fetcher.clone();
            let semaphore = Arc::clone(&semaphore);
            let root = root.clone();

            let handle = tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => return (index, RootFragment::failed(root, e.to_string())),
                };
                (index, RootTraversal::new(fetcher).run(root).await)
            });
            task_roots.insert(handle.id(), index);
        }

        let mut slots: Vec<Option<RootFragment>> = vec![None; roots.len()];
        let mut completed = 0;

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, fragment)) => {
                    slots[index] = Some(fragment);
                    completed += 1;
                    if completed % 10 == 0 {
                        tracing::info!("Progress: {}/{} roots walked", completed, roots.len());
                    }
                }
                Err(e) => {
                    let Some(&index) = task_roots.get(&e.id()) else {
                        tracing::error!("Unknown root traversal task failed: {}", e);
                        continue;
                    };
                    let root = roots[index].clone();
                    let message = format!("traversal failed: {}", describe_failure(e));
                    tracing::error!("Root {} {}", root, message);
                    slots[index] = Some(RootFragment::failed(root, message));
                }
            }
        }

        slots
            .into_iter()
            .zip(roots)
            .map(|(slot, root)| {
                slot.unwrap_or_else(|| {
                    RootFragment::failed(root.clone(), "traversal never finished")
                })
            })
            .collect()
    }
}

/// Panic message of a failed task, or the join error itself
fn describe_failure(error: JoinError) -> String {
    if !error.is_panic() {
        return error.to_string();
    }

    let payload = error.into_panic();
    if let Some(message) = payload.downcast_ref::<String>() {
        format!("panicked: {}", message)
    } else if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", message)
    } else {
        "panicked".to_string()
    }
}

/// Resolves the roots to walk
///
/// Roots given on the command line win, then roots listed in the config file.
/// Otherwise every item of the search owner created since `start-date` is a
/// root; without a configured owner the token's own user is searched.
pub async fn resolve_roots(
    client: &PortalClient,
    search: &SearchConfig,
    overrides: Vec<ItemId>,
) -> crate::Result<Vec<ItemId>> {
    if !overrides.is_empty() {
        tracing::info!("Using {} root items from the command line", overrides.len());
        return Ok(overrides);
    }

    let configured = search.root_ids()?;
    if !configured.is_empty() {
        tracing::info!("Using {} root items from the config file", configured.len());
        return Ok(configured);
    }

    let owner = match &search.owner {
        Some(owner) => owner.clone(),
        None => client.current_username().await?,
    };
    let window = SearchWindow::until_now(owner, search.start_date);
    tracing::info!("Searching for root items: {}", window.query());

    let roots = enumerate_roots(client, &window, search.max_found_items).await?;
    tracing::info!("Found {} root items", roots.len());
    Ok(roots)
}

/// Runs a complete crawl against the configured portal
///
/// # Arguments
///
/// * `config` - The crawl configuration
/// * `overrides` - Roots to walk instead of the configured or searched ones
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed (individual items may have been missed)
/// * `Err(CrawlError)` - The portal could not be reached or no roots were found
pub async fn run_crawl(config: &Config, overrides: Vec<ItemId>) -> crate::Result<CrawlReport> {
    let client = Arc::new(PortalClient::from_config(&config.portal)?);
    let roots = resolve_roots(&client, &config.search, overrides).await?;

    if roots.is_empty() {
        return Err(CrawlError::NoRoots(format!(
            "search of {} returned no items",
            config.portal.url
        )));
    }

    let coordinator = Coordinator::new(client, &config.crawler);
    Ok(coordinator.run(roots).await)
}
