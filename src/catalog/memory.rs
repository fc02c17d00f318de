//! In-memory catalog
//!
//! Holds items and their payloads in a map and can inject the failures the
//! crawler has to survive: fetches that fail a set number of times before
//! succeeding, and payloads that cannot be retrieved at all.

use crate::catalog::{Catalog, CatalogError, CatalogResult, Item, ItemId, ItemPayloads};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Default)]
pub struct MemoryCatalog {
    items: HashMap<ItemId, (Item, ItemPayloads)>,
    broken_payloads: HashSet<ItemId>,
    /// Remaining injected fetch failures per id
    failures: Mutex<HashMap<ItemId, u32>>,
    fetch_counts: Mutex<HashMap<ItemId, u32>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an item
    pub fn insert(&mut self, item: Item, payloads: ItemPayloads) {
        self.items.insert(item.id.clone(), (item, payloads));
    }

    /// Makes the next `times` fetches of `id` fail
    pub fn fail_fetches(&mut self, id: &ItemId, times: u32) {
        self.failures
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone(), times);
    }

    /// Makes payload retrieval for `id` fail on every call
    pub fn break_payloads(&mut self, id: &ItemId) {
        self.broken_payloads.insert(id.clone());
    }

    /// Number of fetch attempts made for `id`, failed ones included
    pub fn fetch_count(&self, id: &ItemId) -> u32 {
        self.fetch_counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .copied()
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[async_trait]
impl Catalog for MemoryCatalog {
    async fn fetch_item(&self, id: &ItemId) -> CatalogResult<Item> {
        *self
            .fetch_counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(id.clone())
            .or_insert(0) += 1;

        {
            let mut failures = self.failures.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(remaining) = failures.get_mut(id) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(CatalogError::Unavailable(format!(
                        "injected failure fetching {}",
                        id
                    )));
                }
            }
        }

        self.items
            .get(id)
            .map(|(item, _)| item.clone())
            .ok_or_else(|| CatalogError::NotFound(id.clone()))
    }

    async fn item_payloads(&self, item: &Item) -> CatalogResult<ItemPayloads> {
        if self.broken_payloads.contains(&item.id) {
            return Err(CatalogError::Decode {
                url: format!("memory://{}", item.id),
                message: "injected payload failure".to_string(),
            });
        }

        Ok(self
            .items
            .get(&item.id)
            .map(|(_, payloads)| payloads.clone())
            .unwrap_or_default())
    }
}
