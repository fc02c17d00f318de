//! Pause reconciler
//!
//! A `paused` edge marks a place where the walk reached an item it had
//! already expanded under the same root and stopped. After all roots are
//! walked, each paused row gets a copy of the descendant block recorded
//! under the first `resolved` edge for the same item, re-rooted under the
//! paused row's ancestor and path.

use crate::catalog::ItemId;
use crate::crawler::edge::Edge;
use crate::state::EdgeStatus;
use std::collections::HashSet;

/// Outcome counters for one reconciliation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Paused rows that had a descendant block spliced after them
    pub spliced: usize,
    /// Total rows inserted by splicing
    pub rows_added: usize,
    /// Paused rows with no resolved counterpart
    pub dangling: usize,
    /// Paused rows whose resolved counterpart had no descendants
    pub leaves: usize,
    /// Rows removed by the final duplicate pass
    pub duplicates_removed: usize,
}

/// Splices reconciled descendant blocks after every paused row, then drops
/// exact duplicate rows keeping the first occurrence
///
/// # Example
///
/// Given rows (paths only, root omitted):
///
/// ```text
/// [A]       resolved
/// [A, C]    resolved
/// [A, C, D] resolved
/// [B]       resolved
/// [B, C]    paused
/// ```
///
/// a `reconciled` row with path `[B, C, D]` is inserted after `[B, C]`.
pub fn reconcile(rows: &mut Vec<Edge>) -> ReconcileSummary {
    let mut summary = ReconcileSummary::default();
    let mut cursor = 0;

    while cursor < rows.len() {
        if rows[cursor].status != EdgeStatus::Paused {
            cursor += 1;
            continue;
        }

        let paused = rows[cursor].clone();
        let target = &paused.related.id;

        let Some(resolved) = rows
            .iter()
            .position(|e| e.status == EdgeStatus::Resolved && &e.related.id == target)
        else {
            tracing::warn!(
                "No resolved expansion of {} to reconcile paused row under {}",
                target,
                paused.ancestor.id
            );
            summary.dangling += 1;
            cursor += 1;
            continue;
        };

        let origin = &rows[resolved];
        let block_len = rows[resolved + 1..]
            .iter()
            .take_while(|e| descends_from(e, origin, target))
            .count();
        if block_len == 0 {
            summary.leaves += 1;
            cursor += 1;
            continue;
        }

        let block: Vec<Edge> = rows[resolved + 1..resolved + 1 + block_len]
            .iter()
            .map(|descendant| rebase(descendant, &paused, target))
            .collect();

        tracing::debug!(
            "Reconciled {} rows for {} under {}",
            block.len(),
            target,
            paused.ancestor.id
        );

        summary.spliced += 1;
        summary.rows_added += block.len();
        let insert_at = cursor + 1;
        cursor = insert_at + block.len();
        rows.splice(insert_at..insert_at, block);
    }

    summary.duplicates_removed = dedup_rows(rows);
    summary
}

/// Whether `edge` lies below `origin` in the same traversal
///
/// Depth-first order keeps these rows contiguous directly after `origin`.
fn descends_from(edge: &Edge, origin: &Edge, target: &ItemId) -> bool {
    edge.ancestor.id == origin.ancestor.id
        && edge.path.len() > origin.path.len()
        && edge.path.starts_with(&origin.path)
        && edge.path_contains(target)
}

/// Copies `descendant` under the paused row's ancestor, replacing the path
/// prefix up to `target` with the paused row's own path
fn rebase(descendant: &Edge, paused: &Edge, target: &ItemId) -> Edge {
    let suffix = descendant
        .path
        .iter()
        .position(|id| id == target)
        .map(|at| &descendant.path[at + 1..])
        .unwrap_or_default();

    let mut path = paused.path.clone();
    path.extend_from_slice(suffix);

    Edge {
        ancestor: paused.ancestor.clone(),
        related: descendant.related.clone(),
        path,
        status: EdgeStatus::Reconciled,
    }
}

/// Removes rows equal to an earlier row, returning how many were removed
fn dedup_rows(rows: &mut Vec<Edge>) -> usize {
    let before = rows.len();
    let mut seen = HashSet::with_capacity(before);
    rows.retain(|edge| seen.insert(edge.clone()));
    before - rows.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Item;
    use crate::crawler::edge::ItemSummary;

    fn id(c: char) -> ItemId {
        ItemId::parse(&c.to_string().repeat(32)).unwrap()
    }

    fn summary(c: char) -> ItemSummary {
        ItemSummary::from_item(&Item::new(id(c), c.to_string(), "Web Map"))
    }

    fn edge(ancestor: char, path: &str, status: EdgeStatus) -> Edge {
        Edge {
            ancestor: summary(ancestor),
            related: summary(path.chars().last().unwrap()),
            path: path.chars().map(id).collect(),
            status,
        }
    }

    fn shape(rows: &[Edge]) -> Vec<(char, String, EdgeStatus)> {
        let first = |i: &ItemId| i.as_str().chars().next().unwrap();
        rows.iter()
            .map(|e| {
                (
                    first(&e.ancestor.id),
                    e.path.iter().map(first).collect(),
                    e.status,
                )
            })
            .collect()
    }

    #[test]
    fn test_splices_block_after_paused_row() {
        let mut rows = vec![
            edge('r', "a", EdgeStatus::Resolved),
            edge('r', "ac", EdgeStatus::Resolved),
            edge('r', "acd", EdgeStatus::Resolved),
            edge('r', "acde", EdgeStatus::Resolved),
            edge('r', "b", EdgeStatus::Resolved),
            edge('r', "bc", EdgeStatus::Paused),
            edge('r', "f", EdgeStatus::Resolved),
        ];

        let summary = reconcile(&mut rows);

        assert_eq!(
            shape(&rows),
            vec![
                ('r', "a".to_string(), EdgeStatus::Resolved),
                ('r', "ac".to_string(), EdgeStatus::Resolved),
                ('r', "acd".to_string(), EdgeStatus::Resolved),
                ('r', "acde".to_string(), EdgeStatus::Resolved),
                ('r', "b".to_string(), EdgeStatus::Resolved),
                ('r', "bc".to_string(), EdgeStatus::Paused),
                ('r', "bcd".to_string(), EdgeStatus::Reconciled),
                ('r', "bcde".to_string(), EdgeStatus::Reconciled),
                ('r', "f".to_string(), EdgeStatus::Resolved),
            ]
        );
        assert_eq!(summary.spliced, 1);
        assert_eq!(summary.rows_added, 2);
    }

    #[test]
    fn test_ancestor_taken_from_paused_row() {
        let mut rows = vec![
            edge('r', "c", EdgeStatus::Resolved),
            edge('r', "cd", EdgeStatus::Resolved),
            edge('s', "bc", EdgeStatus::Paused),
        ];

        reconcile(&mut rows);

        assert_eq!(
            shape(&rows)[3],
            ('s', "bcd".to_string(), EdgeStatus::Reconciled)
        );
    }

    #[test]
    fn test_block_stops_at_first_unrelated_row() {
        let mut rows = vec![
            edge('r', "ac", EdgeStatus::Resolved),
            edge('r', "acd", EdgeStatus::Resolved),
            edge('r', "x", EdgeStatus::Resolved),
            edge('r', "xcq", EdgeStatus::Resolved),
            edge('r', "bc", EdgeStatus::Paused),
        ];

        let summary = reconcile(&mut rows);

        assert_eq!(summary.rows_added, 1);
        assert_eq!(shape(&rows)[5].1, "bcd");
        assert_eq!(rows.len(), 6);
    }

    #[test]
    fn test_block_excludes_other_branches_through_target() {
        let mut rows = vec![
            edge('r', "c", EdgeStatus::Resolved),
            edge('r', "cd", EdgeStatus::Resolved),
            edge('r', "bc", EdgeStatus::Paused),
        ];

        let summary = reconcile(&mut rows);

        assert_eq!(summary.rows_added, 1);
        assert_eq!(
            shape(&rows),
            vec![
                ('r', "c".to_string(), EdgeStatus::Resolved),
                ('r', "cd".to_string(), EdgeStatus::Resolved),
                ('r', "bc".to_string(), EdgeStatus::Paused),
                ('r', "bcd".to_string(), EdgeStatus::Reconciled),
            ]
        );
    }

    #[test]
    fn test_dangling_pause_is_skipped() {
        let mut rows = vec![
            edge('r', "a", EdgeStatus::Resolved),
            edge('r', "ac", EdgeStatus::Paused),
        ];
        let before = rows.clone();

        let summary = reconcile(&mut rows);

        assert_eq!(rows, before);
        assert_eq!(summary.dangling, 1);
    }

    #[test]
    fn test_leaf_target_adds_nothing() {
        let mut rows = vec![
            edge('r', "ac", EdgeStatus::Resolved),
            edge('r', "b", EdgeStatus::Resolved),
            edge('r', "bc", EdgeStatus::Paused),
        ];

        let summary = reconcile(&mut rows);

        assert_eq!(rows.len(), 3);
        assert_eq!(summary.leaves, 1);
    }

    #[test]
    fn test_block_at_end_of_table() {
        let mut rows = vec![
            edge('r', "bc", EdgeStatus::Paused),
            edge('r', "ac", EdgeStatus::Resolved),
            edge('r', "acd", EdgeStatus::Resolved),
        ];

        reconcile(&mut rows);

        assert_eq!(shape(&rows)[1], ('r', "bcd".to_string(), EdgeStatus::Reconciled));
        assert_eq!(rows.len(), 4);
    }

    #[test]
    fn test_two_pauses_same_target_get_their_own_paths() {
        let mut rows = vec![
            edge('r', "ac", EdgeStatus::Resolved),
            edge('r', "acd", EdgeStatus::Resolved),
            edge('r', "bc", EdgeStatus::Paused),
            edge('r', "ec", EdgeStatus::Paused),
        ];

        let summary = reconcile(&mut rows);

        let paths: Vec<String> = shape(&rows).into_iter().map(|(_, p, _)| p).collect();
        assert_eq!(paths, vec!["ac", "acd", "bc", "bcd", "ec", "ecd"]);
        assert_eq!(summary.spliced, 2);
    }

    #[test]
    fn test_exact_duplicates_removed() {
        let mut rows = vec![
            edge('r', "a", EdgeStatus::Resolved),
            edge('r', "a", EdgeStatus::Resolved),
            edge('r', "a", EdgeStatus::Reconciled),
        ];

        let summary = reconcile(&mut rows);

        assert_eq!(rows.len(), 2);
        assert_eq!(summary.duplicates_removed, 1);
    }
}
