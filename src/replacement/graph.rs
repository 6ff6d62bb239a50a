//! Replacement links and chain traversal.
//!
//! Links form a directed graph `old -> new`. The graph stores an edge list
//! plus lookup maps by either end; chains are walked lazily at read time.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::core::FeatureId;

/// Evidence behind a replacement link.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    /// Overlapping building/area footprints
    Footprint,
    /// Road classified `replaced` by the shape matcher
    Road,
}

/// Directed relation: `old` was superseded by `new`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReplacementLink {
    /// Superseded feature
    pub old: FeatureId,
    /// Superseding feature
    pub new: FeatureId,
    /// Footprint overlap ratio, or LSS ratio for roads
    pub overlap: f64,
    /// End year applied to `old`
    pub end_year: i32,
    /// Kind of evidence
    pub kind: LinkKind,
}

/// Edge list with lookup by either end.
#[derive(Clone, Debug, Default)]
pub struct ReplacementGraph {
    edges: Vec<ReplacementLink>,
    by_old: BTreeMap<FeatureId, Vec<usize>>,
    by_new: BTreeMap<FeatureId, Vec<usize>>,
}

impl ReplacementGraph {
    /// Empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a link. Duplicate `old -> new` pairs are ignored.
    ///
    /// Returns `true` when the link was added.
    pub fn add(&mut self, link: ReplacementLink) -> bool {
        if self.contains(&link.old, &link.new) {
            return false;
        }
        let i = self.edges.len();
        self.by_old.entry(link.old.clone()).or_default().push(i);
        self.by_new.entry(link.new.clone()).or_default().push(i);
        self.edges.push(link);
        true
    }

    /// Whether an `old -> new` link exists.
    pub fn contains(&self, old: &str, new: &str) -> bool {
        self.by_old
            .get(old)
            .is_some_and(|ids| ids.iter().any(|&i| self.edges[i].new == new))
    }

    /// Links in insertion order.
    pub fn links(&self) -> &[ReplacementLink] {
        &self.edges
    }

    /// Links leaving `old`.
    pub fn successors<'a>(&'a self, old: &str) -> impl Iterator<Item = &'a ReplacementLink> + 'a {
        self.by_old
            .get(old)
            .into_iter()
            .flatten()
            .map(move |&i| &self.edges[i])
    }

    /// Links arriving at `new`.
    pub fn predecessors<'a>(&'a self, new: &str) -> impl Iterator<Item = &'a ReplacementLink> + 'a {
        self.by_new
            .get(new)
            .into_iter()
            .flatten()
            .map(move |&i| &self.edges[i])
    }

    /// Walk the chain starting at `id`: `id`, its replacement, that one's
    /// replacement, and so on. Where several successors exist the one with
    /// the smallest id is followed. Stops on cycles.
    pub fn chain_from<'a>(&'a self, id: &str) -> ReplacementChain<'a> {
        ReplacementChain {
            graph: self,
            next: Some(id.to_string()),
            seen: BTreeSet::new(),
        }
    }

    /// Number of links.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// No links.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Lazy iterator over a replacement chain.
pub struct ReplacementChain<'a> {
    graph: &'a ReplacementGraph,
    next: Option<FeatureId>,
    seen: BTreeSet<FeatureId>,
}

impl Iterator for ReplacementChain<'_> {
    type Item = FeatureId;

    fn next(&mut self) -> Option<FeatureId> {
        let current = self.next.take()?;
        if !self.seen.insert(current.clone()) {
            return None;
        }
        self.next = self
            .graph
            .successors(&current)
            .map(|l| &l.new)
            .min()
            .cloned();
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(old: &str, new: &str) -> ReplacementLink {
        ReplacementLink {
            old: old.to_string(),
            new: new.to_string(),
            overlap: 1.0,
            end_year: 1900,
            kind: LinkKind::Footprint,
        }
    }

    #[test]
    fn test_chain_a_b_c() {
        let mut g = ReplacementGraph::new();
        g.add(link("b", "c"));
        g.add(link("a", "b"));

        let chain: Vec<String> = g.chain_from("a").collect();
        assert_eq!(chain, vec!["a", "b", "c"]);
        assert_eq!(g.predecessors("c").count(), 1);
        assert_eq!(g.successors("c").count(), 0);
    }

    #[test]
    fn test_duplicate_ignored() {
        let mut g = ReplacementGraph::new();
        assert!(g.add(link("a", "b")));
        assert!(!g.add(link("a", "b")));
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn test_cycle_terminates() {
        let mut g = ReplacementGraph::new();
        g.add(link("a", "b"));
        g.add(link("b", "a"));
        assert_eq!(g.chain_from("a").count(), 2);
    }

    #[test]
    fn test_unknown_start_yields_itself() {
        let g = ReplacementGraph::new();
        assert_eq!(g.chain_from("x").collect::<Vec<_>>(), vec!["x"]);
    }
}
