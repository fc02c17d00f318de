//! Markdown summary generation
//!
//! This module generates human-readable markdown summaries of crawl results,
//! including relationship statistics, the busiest roots and missed items.

use crate::crawler::CrawlReport;
use crate::output::traits::{CrawlSummary, OutputResult, ReportWriter};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Rows shown in the longer tables before truncating
const TABLE_LIMIT: usize = 20;

/// Generates a markdown summary from crawl statistics
///
/// # Arguments
///
/// * `summary` - The crawl summary data
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(summary: &CrawlSummary, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(summary);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl summary as markdown
pub fn format_markdown_summary(summary: &CrawlSummary) -> String {
    let mut md = String::new();

    md.push_str("# Related Items Crawl Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Portal**: {}\n", summary.portal_url));
    md.push_str(&format!("- **Started**: {}\n", summary.started_at));
    md.push_str(&format!("- **Finished**: {}\n", summary.finished_at));
    md.push_str(&format!(
        "- **Duration**: {} seconds ({:.2} minutes)\n",
        summary.duration_seconds,
        summary.duration_seconds as f64 / 60.0
    ));
    md.push_str(&format!("- **Config Hash**: {}\n\n", summary.config_hash));

    // Overall statistics
    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!(
        "- **Root Items Walked**: {} of {} ({:.2}%)\n",
        summary.roots_walked,
        summary.roots_requested,
        summary.root_success_rate()
    ));
    md.push_str(&format!("- **Relationships**: {}\n", summary.total_edges));
    md.push_str(&format!(
        "- **Unique Related Items**: {}\n",
        summary.unique_related_items
    ));
    md.push_str(&format!("- **Missed Items**: {}\n", summary.missed_items.len()));
    md.push_str(&format!("- **Cycles Pruned**: {}\n\n", summary.cycles_pruned));

    // Status breakdown
    md.push_str("## Relationship Status\n\n");
    md.push_str("| Status | Count |\n");
    md.push_str("|--------|-------|\n");
    md.push_str(&format!("| Resolved | {} |\n", summary.resolved_edges));
    md.push_str(&format!(
        "| Paused | {} ({:.1}%) |\n",
        summary.paused_edges,
        summary.paused_rate()
    ));
    md.push_str(&format!("| Reconciled | {} |\n\n", summary.reconciled_edges));

    if summary.dangling_pauses > 0 {
        md.push_str(&format!(
            "{} paused relationships had no resolved expansion to copy.\n\n",
            summary.dangling_pauses
        ));
    }

    if !summary.edges_by_type.is_empty() {
        md.push_str("## Related Items by Type\n\n");
        md.push_str("| Type | Relationships |\n");
        md.push_str("|------|---------------|\n");
        for (label, count) in &summary.edges_by_type {
            md.push_str(&format!("| {} | {} |\n", label, count));
        }
        md.push('\n');
    }

    if !summary.top_roots.is_empty() {
        md.push_str(&format!("## Top {} Root Items\n\n", TABLE_LIMIT));
        md.push_str("| Root | Id | Relationships |\n");
        md.push_str("|------|----|---------------|\n");
        for (title, id, count) in summary.top_roots.iter().take(TABLE_LIMIT) {
            md.push_str(&format!("| {} | {} | {} |\n", escape_cell(title), id, count));
        }
        md.push('\n');
    }

    if !summary.missed_items.is_empty() {
        md.push_str("## Missed Items\n\n");
        md.push_str("| Id | Error |\n");
        md.push_str("|----|-------|\n");
        for (id, error) in summary.missed_items.iter().take(TABLE_LIMIT) {
            md.push_str(&format!("| {} | {} |\n", id, escape_cell(error)));
        }
        if summary.missed_items.len() > TABLE_LIMIT {
            md.push_str(&format!(
                "\n... and {} more\n",
                summary.missed_items.len() - TABLE_LIMIT
            ));
        }
        md.push('\n');
    }

    md
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

#[derive(Debug, Clone)]
pub struct MarkdownReportWriter {
    path: PathBuf,
}

impl MarkdownReportWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ReportWriter for MarkdownReportWriter {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn write(&self, _report: &CrawlReport, summary: &CrawlSummary) -> OutputResult<()> {
        generate_markdown_summary(summary, &self.path)?;
        tracing::info!("Wrote crawl summary to {}", self.path.display());
        Ok(())
    }

    fn paths(&self) -> Vec<&Path> {
        vec![&self.path]
    }
}
