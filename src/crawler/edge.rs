//! Edge and miss tables
//!
//! The edge table is an append-only log of discovered relationships with a
//! hash index over (ancestor id, related id, path), so re-discovering the same
//! relationship along the same path is rejected at insertion time.

use crate::catalog::{Item, ItemId};
use crate::crawler::fetch::FetchError;
use crate::item_type::{classify, TypeLabel};
use crate::state::EdgeStatus;
use std::collections::HashSet;

/// The item fields recorded on either side of an edge
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemSummary {
    pub id: ItemId,
    pub type_label: TypeLabel,
    pub title: String,
    pub access: String,
    pub owner: String,
    pub org_id: Option<String>,
}

impl ItemSummary {
    pub fn from_item(item: &Item) -> Self {
        Self {
            id: item.id.clone(),
            type_label: classify(item),
            title: item.title.clone(),
            access: item.access.clone(),
            owner: item.owner.clone(),
            org_id: item.org_id.clone(),
        }
    }
}

/// One discovered (ancestor, related item) relationship
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    /// The root item whose traversal found this relationship
    pub ancestor: ItemSummary,
    pub related: ItemSummary,
    /// Ids from just below the root down to and including the related item
    pub path: Vec<ItemId>,
    pub status: EdgeStatus,
}

impl Edge {
    pub fn key(&self) -> EdgeKey {
        EdgeKey {
            ancestor: self.ancestor.id.clone(),
            related: self.related.id.clone(),
            path: self.path.clone(),
        }
    }

    pub fn path_contains(&self, id: &ItemId) -> bool {
        self.path.contains(id)
    }
}

/// Identity of an edge row for insert-time deduplication
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EdgeKey {
    pub ancestor: ItemId,
    pub related: ItemId,
    pub path: Vec<ItemId>,
}

#[derive(Debug, Clone, Default)]
pub struct EdgeTable {
    rows: Vec<Edge>,
    index: HashSet<EdgeKey>,
}

impl EdgeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `edge` unless a row with the same key exists
    ///
    /// Returns true if the row was appended.
    pub fn insert(&mut self, edge: Edge) -> bool {
        if !self.index.insert(edge.key()) {
            return false;
        }
        self.rows.push(edge);
        true
    }

    pub fn contains_key(&self, key: &EdgeKey) -> bool {
        self.index.contains(key)
    }

    /// Appends every row of `other` that is not already present
    pub fn merge(&mut self, other: EdgeTable) {
        for edge in other.rows {
            self.insert(edge);
        }
    }

    pub fn rows(&self) -> &[Edge] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Edge> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// An item that could not be crawled, with the reason
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MissRecord {
    pub id: ItemId,
    pub title: Option<String>,
    pub owner: Option<String>,
    pub error: String,
}

impl From<FetchError> for MissRecord {
    fn from(err: FetchError) -> Self {
        Self {
            id: err.id,
            title: None,
            owner: None,
            error: err.message,
        }
    }
}

/// Miss records, deduplicated by full-row equality
#[derive(Debug, Clone, Default)]
pub struct MissTable {
    rows: Vec<MissRecord>,
    seen: HashSet<MissRecord>,
}

impl MissTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, miss: MissRecord) -> bool {
        if !self.seen.insert(miss.clone()) {
            return false;
        }
        self.rows.push(miss);
        true
    }

    pub fn merge(&mut self, other: MissTable) {
        for miss in other.rows {
            self.record(miss);
        }
    }

    pub fn rows(&self) -> &[MissRecord] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<MissRecord> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
