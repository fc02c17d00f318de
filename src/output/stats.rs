//! Statistics generation from a crawl report
//!
//! This module provides functionality for extracting and displaying
//! crawl statistics from the finished edge and miss tables.

use crate::crawler::CrawlReport;
use crate::state::EdgeStatus;
use std::collections::{HashMap, HashSet};

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Total number of edge rows
    pub total_edges: u64,

    /// Count of edges by status
    pub edges_by_status: HashMap<EdgeStatus, u64>,

    /// Distinct related item ids across all roots
    pub unique_related_items: u64,

    /// Count of edges by related item type label
    pub edges_by_type: HashMap<&'static str, u64>,

    /// Edge rows per root id
    pub edges_by_root: HashMap<String, u64>,

    /// Number of items that could not be fetched
    pub missed_items: u64,

    pub roots_requested: u64,
    pub roots_walked: u64,
}

impl CrawlStatistics {
    pub fn status_count(&self, status: EdgeStatus) -> u64 {
        self.edges_by_status.get(&status).copied().unwrap_or(0)
    }
}

/// Computes statistics for a finished crawl
pub fn compute_statistics(report: &CrawlReport) -> CrawlStatistics {
    let mut edges_by_status = HashMap::new();
    let mut edges_by_type = HashMap::new();
    let mut edges_by_root = HashMap::new();
    let mut related = HashSet::new();

    for edge in &report.edges {
        *edges_by_status.entry(edge.status).or_insert(0) += 1;
        *edges_by_type
            .entry(edge.related.type_label.as_str())
            .or_insert(0) += 1;
        *edges_by_root
            .entry(edge.ancestor.id.to_string())
            .or_insert(0) += 1;
        related.insert(&edge.related.id);
    }

    CrawlStatistics {
        total_edges: report.edges.len() as u64,
        edges_by_status,
        unique_related_items: related.len() as u64,
        edges_by_type,
        edges_by_root,
        missed_items: report.misses.len() as u64,
        roots_requested: report.roots_requested as u64,
        roots_walked: report.roots.len() as u64,
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!(
        "  Root items walked: {} / {}",
        stats.roots_walked, stats.roots_requested
    );
    println!("  Relationships found: {}", stats.total_edges);
    println!("  Unique related items: {}", stats.unique_related_items);
    println!("  Missed items: {}", stats.missed_items);
    println!();

    println!("Edges by Status:");
    for status in EdgeStatus::all() {
        let count = stats.status_count(status);
        let percentage = if stats.total_edges > 0 {
            (count as f64 / stats.total_edges as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", status, count, percentage);
    }
    println!();

    if !stats.edges_by_type.is_empty() {
        println!("Related Items by Type:");
        // Sort types by count (descending)
        let mut type_counts: Vec<_> = stats.edges_by_type.iter().collect();
        type_counts.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));

        for (label, count) in type_counts {
            println!("  {}: {}", label, count);
        }
        println!();
    }
}
