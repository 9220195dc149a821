//! Graph-traversal operator: BFS subgraph extraction
//!
//! Given an edge predicate, a root term and a depth budget, walks the edge
//! relation breadth-first and returns only the edges whose endpoints were
//! both visited within the budget. Depth counts edges, not nodes: a budget
//! of zero yields nothing, and a root that never occurs in the edge
//! relation yields nothing.

use crate::facts::{FactStore, Snapshot};
use crate::terms::TermId;
use hashbrown::HashMap;
use petgraph::graphmap::DiGraphMap;

/// Extract the subgraph reachable from `root` over `edge_predicate` within
/// `max_depth` edges
pub fn extract_subgraph(
    store: &FactStore,
    snapshot: Snapshot,
    edge_predicate: TermId,
    root: TermId,
    max_depth: usize,
) -> Vec<(TermId, TermId)> {
    let edges: Vec<(TermId, TermId)> = store
        .select_at(None, Some(edge_predicate), None, snapshot)
        .into_iter()
        .map(|tid| {
            let t = store.triple(tid);
            (t.subject, t.object)
        })
        .collect();
    if max_depth == 0 {
        return Vec::new();
    }
    let root = store.canonical(root);
    let graph: DiGraphMap<TermId, ()> = DiGraphMap::from_edges(edges.iter().copied());
    if !graph.contains_node(root) {
        return Vec::new();
    }

    let mut depth: HashMap<TermId, usize> = HashMap::new();
    depth.insert(root, 0);
    let mut frontier = vec![root];
    let mut level = 0;
    while !frontier.is_empty() && level < max_depth {
        level += 1;
        let mut next = Vec::new();
        for node in frontier {
            for neighbor in graph.neighbors(node) {
                if !depth.contains_key(&neighbor) {
                    depth.insert(neighbor, level);
                    next.push(neighbor);
                }
            }
        }
        frontier = next;
    }

    edges
        .into_iter()
        .filter(|(from, to)| depth.contains_key(from) && depth.contains_key(to))
        .collect()
}
