//! Output module for generating crawl reports
//!
//! This module handles:
//! - Exporting the edge and miss tables as CSV
//! - Rendering the related items network graph
//! - Generating markdown summaries of crawl results
//! - Recording crawl statistics

mod csv_export;
mod graph;
mod markdown;
pub mod stats;
mod traits;

pub use csv_export::{
    write_missed_items, write_missed_items_csv, write_related_items, write_related_items_csv,
    CsvReportWriter,
};
pub use graph::{
    derive_paths, write_graph_html, GraphLink, GraphModel, GraphNode, GraphReportWriter,
};
pub use markdown::{format_markdown_summary, generate_markdown_summary, MarkdownReportWriter};
pub use stats::{compute_statistics, print_statistics, CrawlStatistics};
pub use traits::{CrawlSummary, OutputError, OutputResult, ReportWriter};

use crate::config::OutputConfig;
use crate::crawler::CrawlReport;
use crate::state::EdgeStatus;

/// Generates a crawl summary from a finished report
///
/// # Arguments
///
/// * `report` - The finished crawl
/// * `config_hash` - Hash of the config file the run used
/// * `portal_url` - The portal that was crawled
pub fn generate_summary(report: &CrawlReport, config_hash: &str, portal_url: &str) -> CrawlSummary {
    let stats = compute_statistics(report);

    let mut edges_by_type: Vec<(String, u64)> = stats
        .edges_by_type
        .iter()
        .map(|(label, count)| (label.to_string(), *count))
        .collect();
    edges_by_type.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let mut top_roots: Vec<(String, String, u64)> = report
        .roots
        .iter()
        .map(|root| {
            let count = stats
                .edges_by_root
                .get(root.id.as_str())
                .copied()
                .unwrap_or(0);
            (root.title.clone(), root.id.to_string(), count)
        })
        .collect();
    top_roots.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.1.cmp(&b.1)));

    CrawlSummary {
        portal_url: portal_url.to_string(),
        started_at: report.started_at.to_rfc3339(),
        finished_at: report.finished_at.to_rfc3339(),
        duration_seconds: report.duration().num_seconds(),
        config_hash: config_hash.to_string(),
        roots_requested: stats.roots_requested,
        roots_walked: stats.roots_walked,
        total_edges: stats.total_edges,
        resolved_edges: stats.status_count(EdgeStatus::Resolved),
        paused_edges: stats.status_count(EdgeStatus::Paused),
        reconciled_edges: stats.status_count(EdgeStatus::Reconciled),
        unique_related_items: stats.unique_related_items,
        cycles_pruned: report.cycles_pruned as u64,
        dangling_pauses: report.reconcile.dangling as u64,
        edges_by_type,
        top_roots,
        missed_items: report
            .misses
            .iter()
            .map(|miss| (miss.id.to_string(), miss.error.clone()))
            .collect(),
    }
}

/// Builds the report writers for a run
///
/// The CSV tables are always written; the summary and graph only when a path
/// is configured, and the graph can be switched off for a single run.
pub fn report_writers(
    config: &OutputConfig,
    portal_url: &str,
    include_graph: bool,
) -> Vec<Box<dyn ReportWriter>> {
    let mut writers: Vec<Box<dyn ReportWriter>> = vec![Box::new(CsvReportWriter::new(
        &config.related_items_path,
        &config.missed_items_path,
    ))];

    if let Some(path) = &config.summary_path {
        writers.push(Box::new(MarkdownReportWriter::new(path)));
    }

    if include_graph {
        if let Some(path) = &config.graph_path {
            writers.push(Box::new(GraphReportWriter::new(path, portal_url)));
        }
    }

    writers
}

/// Runs every writer, stopping at the first failure
pub fn write_reports(
    writers: &[Box<dyn ReportWriter>],
    report: &CrawlReport,
    summary: &CrawlSummary,
) -> OutputResult<()> {
    for writer in writers {
        tracing::debug!("Running {} writer", writer.name());
        writer.write(report, summary).map_err(|e| {
            OutputError::Write(format!("{} report failed: {}", writer.name(), e))
        })?;
    }
    Ok(())
}
