/// Edge status definitions for discovered relationships
///
/// This module defines the states an edge row can carry in the edge table.
use std::fmt;

/// Represents how an edge row came to be in the edge table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeStatus {
    /// The related item was fully expanded from this row's position
    Resolved,

    /// The related item was already expanded under the same root; its
    /// descendants are spliced in by the reconciler
    Paused,

    /// Row copied by the reconciler from a resolved expansion and re-rooted
    /// under a paused row
    Reconciled,
}

impl EdgeStatus {
    /// Returns true if the related item's descendants still need splicing
    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Paused)
    }

    /// Returns true if this row was produced by the walker itself
    pub fn is_walked(&self) -> bool {
        matches!(self, Self::Resolved | Self::Paused)
    }

    /// Converts the status to the string used in exported tables
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resolved => "resolved",
            Self::Paused => "paused",
            Self::Reconciled => "reconciled",
        }
    }

    /// Parses a status from its exported string form
    ///
    /// Returns None if the string doesn't match any known status.
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "resolved" => Some(Self::Resolved),
            "paused" => Some(Self::Paused),
            "reconciled" => Some(Self::Reconciled),
            _ => None,
        }
    }

    /// Returns all edge statuses
    pub fn all() -> [Self; 3] {
        [Self::Resolved, Self::Paused, Self::Reconciled]
    }
}

impl fmt::Display for EdgeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
