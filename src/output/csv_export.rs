//! CSV export of the edge and miss tables

use crate::crawler::{CrawlReport, Edge, MissRecord};
use crate::output::traits::{CrawlSummary, OutputResult, ReportWriter};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

const RELATED_ITEMS_HEADER: [&str; 13] = [
    "Organization Item",
    "Org item type",
    "Org item Title",
    "Org Item Sharing",
    "Org item owner",
    "Related Item Id",
    "Related Item Type",
    "Related Item Title",
    "Related Item Sharing",
    "Related Item Owner",
    "Related Item Org",
    "Relationship Path",
    "Status",
];

const MISSED_ITEMS_HEADER: [&str; 4] = ["Item Id", "Item Title", "Item Owner", "Error Message"];

/// CSV writer that always emits `header`, even for an empty table
fn table_writer<W: Write>(writer: W, header: &[&str]) -> OutputResult<csv::Writer<W>> {
    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv.write_record(header)?;
    Ok(csv)
}

#[derive(Debug, Serialize)]
struct RelatedItemRow<'a> {
    org_item: &'a str,
    org_item_type: &'static str,
    org_item_title: &'a str,
    org_item_sharing: &'a str,
    org_item_owner: &'a str,
    related_id: &'a str,
    related_type: &'static str,
    related_title: &'a str,
    related_sharing: &'a str,
    related_owner: &'a str,
    related_org: Option<&'a str>,
    /// JSON array of ids
    path: String,
    status: &'static str,
}

impl<'a> RelatedItemRow<'a> {
    fn from_edge(edge: &'a Edge) -> OutputResult<Self> {
        Ok(Self {
            org_item: edge.ancestor.id.as_str(),
            org_item_type: edge.ancestor.type_label.as_str(),
            org_item_title: &edge.ancestor.title,
            org_item_sharing: &edge.ancestor.access,
            org_item_owner: &edge.ancestor.owner,
            related_id: edge.related.id.as_str(),
            related_type: edge.related.type_label.as_str(),
            related_title: &edge.related.title,
            related_sharing: &edge.related.access,
            related_owner: &edge.related.owner,
            related_org: edge.related.org_id.as_deref(),
            path: serde_json::to_string(&edge.path)?,
            status: edge.status.as_str(),
        })
    }
}

#[derive(Debug, Serialize)]
struct MissedItemRow<'a> {
    id: &'a str,
    title: Option<&'a str>,
    owner: Option<&'a str>,
    error: &'a str,
}

impl<'a> From<&'a MissRecord> for MissedItemRow<'a> {
    fn from(miss: &'a MissRecord) -> Self {
        Self {
            id: miss.id.as_str(),
            title: miss.title.as_deref(),
            owner: miss.owner.as_deref(),
            error: &miss.error,
        }
    }
}

/// Writes one row per edge, in table order
pub fn write_related_items<W: Write>(writer: W, edges: &[Edge]) -> OutputResult<()> {
    let mut csv = table_writer(writer, &RELATED_ITEMS_HEADER)?;
    for edge in edges {
        csv.serialize(RelatedItemRow::from_edge(edge)?)?;
    }
    csv.flush()?;
    Ok(())
}

/// Writes one row per missed item
pub fn write_missed_items<W: Write>(writer: W, misses: &[MissRecord]) -> OutputResult<()> {
    let mut csv = table_writer(writer, &MISSED_ITEMS_HEADER)?;
    for miss in misses {
        csv.serialize(MissedItemRow::from(miss))?;
    }
    csv.flush()?;
    Ok(())
}

/// Writes the related items CSV file
///
/// # Arguments
///
/// * `path` - Destination file, replaced if it exists
/// * `edges` - The reconciled edge table
pub fn write_related_items_csv(path: &Path, edges: &[Edge]) -> OutputResult<()> {
    let file = std::fs::File::create(path)?;
    write_related_items(file, edges)?;
    tracing::info!("Wrote {} related items to {}", edges.len(), path.display());
    Ok(())
}

/// Writes the missed items CSV file
pub fn write_missed_items_csv(path: &Path, misses: &[MissRecord]) -> OutputResult<()> {
    let file = std::fs::File::create(path)?;
    write_missed_items(file, misses)?;
    tracing::info!("Wrote {} missed items to {}", misses.len(), path.display());
    Ok(())
}

/// Writes both CSV tables
#[derive(Debug, Clone)]
pub struct CsvReportWriter {
    related_items_path: PathBuf,
    missed_items_path: PathBuf,
}

impl CsvReportWriter {
    pub fn new(
        related_items_path: impl Into<PathBuf>,
        missed_items_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            related_items_path: related_items_path.into(),
            missed_items_path: missed_items_path.into(),
        }
    }
}

impl ReportWriter for CsvReportWriter {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn write(&self, report: &CrawlReport, _summary: &CrawlSummary) -> OutputResult<()> {
        write_related_items_csv(&self.related_items_path, &report.edges)?;
        write_missed_items_csv(&self.missed_items_path, &report.misses)
    }

    fn paths(&self) -> Vec<&Path> {
        vec![&self.related_items_path, &self.missed_items_path]
    }
}
