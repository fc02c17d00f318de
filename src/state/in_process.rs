//! In-process bookkeeping for a single root's traversal
//!
//! An id is claimed when the walker starts expanding it. Claims are never
//! released one by one: the whole set belongs to one root's traversal and is
//! dropped with it, so a later reference to an already-expanded item under the
//! same root is recognised (and paused) while sibling roots never see each
//! other's claims.

use crate::catalog::ItemId;
use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct InProcess {
    claimed: HashSet<ItemId>,
}

impl InProcess {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `id` for expansion
    ///
    /// Returns false if it was already claimed under this root.
    pub fn claim(&mut self, id: &ItemId) -> bool {
        self.claimed.insert(id.clone())
    }

    pub fn is_claimed(&self, id: &ItemId) -> bool {
        self.claimed.contains(id)
    }

    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }
}
