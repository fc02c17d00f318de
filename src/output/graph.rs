//! Network graph of related items
//!
//! Every relationship path, prefixed with its root, becomes a chain of nodes.
//! Nodes are unique per item and coloured by type; links are undirected and
//! unique per item pair. The page embeds the graph as JSON and renders it
//! with vis-network.

use crate::catalog::ItemId;
use crate::crawler::{CrawlReport, Edge, ItemSummary};
use crate::item_type::TypeLabel;
use crate::output::traits::{CrawlSummary, OutputResult, ReportWriter};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};

const LINK_COLOR: &str = "#0A0A0A";

/// Root-prefixed id chain of every edge, in table order
pub fn derive_paths(edges: &[Edge]) -> Vec<Vec<ItemId>> {
    edges
        .iter()
        .map(|edge| {
            let mut path = Vec::with_capacity(edge.path.len() + 1);
            path.push(edge.ancestor.id.clone());
            path.extend(edge.path.iter().cloned());
            path
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    /// Hover text linking to the item page
    pub title: String,
    pub color: &'static str,
    #[serde(rename = "borderWidth")]
    pub border_width: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphLink {
    pub from: String,
    pub to: String,
    pub color: &'static str,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GraphModel {
    pub nodes: Vec<GraphNode>,
    #[serde(rename = "edges")]
    pub links: Vec<GraphLink>,
}

impl GraphModel {
    /// Builds the graph for a finished crawl
    ///
    /// # Arguments
    ///
    /// * `edges` - The reconciled edge table
    /// * `root_ids` - Items drawn with a heavier border
    /// * `portal_url` - Base URL for item page links
    pub fn from_edges(edges: &[Edge], root_ids: &BTreeSet<ItemId>, portal_url: &str) -> Self {
        let mut summaries: HashMap<&ItemId, &ItemSummary> = HashMap::new();
        for edge in edges {
            summaries.entry(&edge.ancestor.id).or_insert(&edge.ancestor);
            summaries.entry(&edge.related.id).or_insert(&edge.related);
        }

        let portal = portal_url.trim_end_matches('/');
        let mut model = GraphModel::default();
        let mut seen_nodes = HashSet::new();
        let mut seen_links = HashSet::new();

        for path in derive_paths(edges) {
            for id in &path {
                if !seen_nodes.insert(id.clone()) {
                    continue;
                }
                let summary = summaries.get(id).copied();
                let label = summary.map(|s| s.type_label).unwrap_or(TypeLabel::Other);
                let title = summary.map(|s| s.title.as_str()).unwrap_or(id.as_str());

                model.nodes.push(GraphNode {
                    id: id.to_string(),
                    label: format!("{}: {}", label, title),
                    title: format!(
                        "<p>Open <a href='{}/home/item.html?id={}'>{}</a></p>",
                        portal, id, label
                    ),
                    color: label.color(),
                    border_width: if root_ids.contains(id) { 3 } else { 1 },
                });
            }

            for pair in path.windows(2) {
                let (a, b) = (&pair[0], &pair[1]);
                let key = if a <= b {
                    (a.clone(), b.clone())
                } else {
                    (b.clone(), a.clone())
                };
                if a == b || !seen_links.insert(key) {
                    continue;
                }
                model.links.push(GraphLink {
                    from: a.to_string(),
                    to: b.to_string(),
                    color: LINK_COLOR,
                });
            }
        }

        model
    }

    /// Renders a standalone HTML page for the graph
    pub fn to_html(&self) -> OutputResult<String> {
        // Keep embedded markup from closing the script element
        let data = serde_json::to_string(self)?.replace("</", "<\\/");

        Ok(format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Related Items</title>
    <script src="https://unpkg.com/vis-network/standalone/umd/vis-network.min.js"></script>
    <style>
        html, body {{ margin: 0; height: 100%; }}
        #graph {{ width: 100%; height: 100%; }}
    </style>
</head>
<body>
    <div id="graph"></div>
    <script>
        const data = {data};
        new vis.Network(
            document.getElementById("graph"),
            {{ nodes: new vis.DataSet(data.nodes), edges: new vis.DataSet(data.edges) }},
            {{ physics: {{ stabilization: true }}, interaction: {{ hover: true }} }}
        );
    </script>
</body>
</html>
"#
        ))
    }
}

/// Writes the graph page to `path`
pub fn write_graph_html(path: &Path, model: &GraphModel) -> OutputResult<()> {
    std::fs::write(path, model.to_html()?)?;
    tracing::info!(
        "Wrote graph of {} items and {} links to {}",
        model.nodes.len(),
        model.links.len(),
        path.display()
    );
    Ok(())
}

#[derive(Debug, Clone)]
pub struct GraphReportWriter {
    path: PathBuf,
    portal_url: String,
}

impl GraphReportWriter {
    pub fn new(path: impl Into<PathBuf>, portal_url: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            portal_url: portal_url.into(),
        }
    }
}

impl ReportWriter for GraphReportWriter {
    fn name(&self) -> &'static str {
        "graph"
    }

    fn write(&self, report: &CrawlReport, _summary: &CrawlSummary) -> OutputResult<()> {
        let model = GraphModel::from_edges(&report.edges, &report.root_ids, &self.portal_url);
        write_graph_html(&self.path, &model)
    }

    fn paths(&self) -> Vec<&Path> {
        vec![&self.path]
    }
}
