//! Output writer traits and types
//!
//! This module defines the trait interface for report writers and the
//! summary data shared by the human-readable reports.

use crate::crawler::CrawlReport;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Summary statistics for a crawl
#[derive(Debug, Clone, Default)]
pub struct CrawlSummary {
    // Run metadata
    pub portal_url: String,
    pub started_at: String,
    pub finished_at: String,
    pub duration_seconds: i64,
    pub config_hash: String,

    // Roots
    pub roots_requested: u64,
    pub roots_walked: u64,

    // Edge statistics
    pub total_edges: u64,
    pub resolved_edges: u64,
    pub paused_edges: u64,
    pub reconciled_edges: u64,
    pub unique_related_items: u64,
    pub cycles_pruned: u64,
    pub dangling_pauses: u64,

    // Related items per type label, most frequent first
    pub edges_by_type: Vec<(String, u64)>,

    // Roots with the most related items (title, id, edges)
    pub top_roots: Vec<(String, String, u64)>,

    // Missed items (id, error)
    pub missed_items: Vec<(String, String)>,
}

impl CrawlSummary {
    /// Creates a new empty crawl summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Roots that could be fetched, as a percentage of requested roots
    pub fn root_success_rate(&self) -> f64 {
        if self.roots_requested == 0 {
            return 0.0;
        }
        (self.roots_walked as f64 / self.roots_requested as f64) * 100.0
    }

    /// Share of edges whose expansion was deferred
    pub fn paused_rate(&self) -> f64 {
        if self.total_edges == 0 {
            return 0.0;
        }
        (self.paused_edges as f64 / self.total_edges as f64) * 100.0
    }
}

/// A report produced from a finished crawl
///
/// Writers are run in order by the binary after the crawl completes; each
/// writes one or more files and reports where it wrote them.
pub trait ReportWriter {
    /// Short name used in log messages
    fn name(&self) -> &'static str;

    /// Writes the report
    ///
    /// # Arguments
    ///
    /// * `report` - The finished crawl
    /// * `summary` - Statistics derived from `report`
    fn write(&self, report: &CrawlReport, summary: &CrawlSummary) -> OutputResult<()>;

    /// Files this writer produces
    fn paths(&self) -> Vec<&Path>;
}
