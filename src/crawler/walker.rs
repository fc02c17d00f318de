//! Graph walker
//!
//! Depth-first traversal of everything reachable from one root item. Each
//! root gets its own [`RootTraversal`], which owns the edge and miss tables
//! for that root and the set of ids already expanded under it. The traversal
//! is consumed by [`RootTraversal::run`] and hands back a [`RootFragment`], so
//! no claim can outlive the root that made it.
//!
//! # Walk Steps
//!
//! For each visited id:
//! 1. Fetch the item; a failed fetch becomes a miss and prunes the branch
//! 2. The first item of a traversal is the root: it becomes the ancestor of
//!    every edge below it and never appears as a related item
//! 3. A reference back to the root or to an id already on the current path is
//!    a cycle and is dropped
//! 4. The edge (ancestor, item, path) is recorded unless it already exists;
//!    if the item was already expanded under this root the edge is `paused`
//!    and the branch stops there
//! 5. Otherwise the item is claimed, its payloads are scanned and every
//!    referenced id is walked in order

use crate::catalog::ItemId;
use crate::crawler::edge::{Edge, EdgeKey, EdgeTable, ItemSummary, MissRecord, MissTable};
use crate::crawler::extract::extract_from_payloads;
use crate::crawler::fetch::Fetcher;
use crate::state::{EdgeStatus, InProcess};
use std::future::Future;
use std::pin::Pin;

type WalkFuture<'a> = Pin<Box<dyn Future<Output = ()> + Send + 'a>>;

/// Everything one root's traversal produced
#[derive(Debug, Clone)]
pub struct RootFragment {
    pub root_id: ItemId,
    /// `None` when the root itself could not be fetched
    pub root: Option<ItemSummary>,
    pub edges: EdgeTable,
    pub misses: MissTable,
    pub cycles_pruned: usize,
}

impl RootFragment {
    /// A fragment for a root whose traversal did not complete
    pub fn failed(root_id: ItemId, error: impl Into<String>) -> Self {
        let mut misses = MissTable::new();
        misses.record(MissRecord {
            id: root_id.clone(),
            title: None,
            owner: None,
            error: error.into(),
        });

        Self {
            root_id,
            root: None,
            edges: EdgeTable::new(),
            misses,
            cycles_pruned: 0,
        }
    }
}

/// Traversal state for a single root
pub struct RootTraversal {
    fetcher: Fetcher,
    edges: EdgeTable,
    misses: MissTable,
    in_process: InProcess,
    root: Option<ItemSummary>,
    cycles_pruned: usize,
}

impl RootTraversal {
    pub fn new(fetcher: Fetcher) -> Self {
        Self {
            fetcher,
            edges: EdgeTable::new(),
            misses: MissTable::new(),
            in_process: InProcess::new(),
            root: None,
            cycles_pruned: 0,
        }
    }

    /// Walks everything reachable from `root_id`
    pub async fn run(mut self, root_id: ItemId) -> RootFragment {
        tracing::debug!("Walking root {}", root_id);
        self.walk(root_id.clone(), None, Vec::new()).await;

        tracing::debug!(
            "Root {} done: {} edges, {} misses, {} items expanded",
            root_id,
            self.edges.len(),
            self.misses.len(),
            self.in_process.len()
        );

        RootFragment {
            root_id,
            root: self.root,
            edges: self.edges,
            misses: self.misses,
            cycles_pruned: self.cycles_pruned,
        }
    }

    fn walk<'a>(
        &'a mut self,
        id: ItemId,
        ancestor: Option<&'a ItemSummary>,
        path: Vec<ItemId>,
    ) -> WalkFuture<'a> {
        Box::pin(async move {
            let item = match self.fetcher.fetch_item(&id).await {
                Ok(item) => item,
                Err(e) => {
                    tracing::warn!("{}", e);
                    self.misses.record(e.into());
                    return;
                }
            };
            let summary = ItemSummary::from_item(&item);

            let (ancestor, path) = match ancestor {
                None => {
                    self.root = Some(summary.clone());
                    (&summary, path)
                }
                Some(ancestor) => {
                    if id == ancestor.id || path.contains(&id) {
                        tracing::debug!(
                            "Cycle: {} already on the path from root {}",
                            id,
                            ancestor.id
                        );
                        self.cycles_pruned += 1;
                        return;
                    }

                    let mut path = path;
                    path.push(id.clone());

                    let key = EdgeKey {
                        ancestor: ancestor.id.clone(),
                        related: id.clone(),
                        path: path.clone(),
                    };
                    if self.edges.contains_key(&key) {
                        return;
                    }

                    let paused = self.in_process.is_claimed(&id);
                    self.edges.insert(Edge {
                        ancestor: ancestor.clone(),
                        related: summary.clone(),
                        path: path.clone(),
                        status: if paused {
                            EdgeStatus::Paused
                        } else {
                            EdgeStatus::Resolved
                        },
                    });

                    if paused {
                        tracing::info!(
                            "Paused {} under root {}: already expanded",
                            id,
                            ancestor.id
                        );
                        return;
                    }

                    (ancestor, path)
                }
            };

            self.in_process.claim(&id);
            let payloads = self.fetcher.item_payloads(&item).await;
            let references = extract_from_payloads(&payloads);
            if !references.is_empty() {
                tracing::debug!("{} references {} items", id, references.len());
            }

            for reference in references {
                self.walk(reference, Some(ancestor), path.clone()).await;
            }
        })
    }
}
