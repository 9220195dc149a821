//! Fixed-point inference driver
//!
//! Pumps store deltas breadth-first through the network until no node has
//! pending work. The store is monotonic during one forward pass, and
//! duplicate derivations are no-ops, so cycles terminate. Retraction runs
//! the same pump with −deltas and counting invalidation; when the store
//! has performed `sameAs` merges the driver rebuilds from the surviving
//! asserted facts instead, because equivalence classes cannot be shrunk
//! incrementally.

use super::{Effect, ReteNetwork, Sign};
use crate::error::EventLog;
use crate::facts::{FactStore, Justification, RetractReport, TripleId};
use crate::terms::TermStore;
use log::debug;
use std::collections::VecDeque;

/// Counters reported by one propagation run
#[derive(Debug, Clone, Copy, Default)]
pub struct FixpointStats {
    /// Deltas processed
    pub cycles: usize,
    /// Rows added (derived or rewritten)
    pub derived: usize,
    /// Rows removed by counting invalidation
    pub removed: usize,
}

/// Pump the given deltas to quiescence
pub fn run_to_fixpoint(
    network: &mut ReteNetwork,
    store: &mut FactStore,
    terms: &TermStore,
    events: &EventLog,
    mut queue: VecDeque<(TripleId, Sign)>,
) -> FixpointStats {
    let mut stats = FixpointStats::default();
    let mut effects = Vec::new();
    loop {
        while let Some((tid, sign)) = queue.pop_front() {
            stats.cycles += 1;
            effects.clear();
            network.activate(store, terms, events, tid, sign, &mut effects);
            for effect in effects.drain(..) {
                match effect {
                    Effect::Derive {
                        triple,
                        production,
                        premises,
                    } => {
                        let delta = store.derive_triple(
                            triple,
                            Justification {
                                production,
                                premises,
                            },
                        );
                        for id in delta.added {
                            stats.derived += 1;
                            queue.push_back((id, Sign::Plus));
                        }
                    }
                    Effect::Undo {
                        triple,
                        production,
                        premises,
                    } => {
                        if let Some(dead) = store.undo_justification(triple, production, &premises)
                        {
                            stats.removed += 1;
                            queue.push_back((dead, Sign::Minus));
                        }
                    }
                }
            }
        }
        // Equivalence merges observed during the pump rewrite rows; the
        // rewritten rows are new +deltas and may fire further rules.
        let merged = store.apply_pending_merges();
        if merged.is_empty() {
            break;
        }
        for id in merged {
            stats.derived += 1;
            queue.push_back((id, Sign::Plus));
        }
    }
    debug!(
        "fixpoint: {} deltas, {} derived, {} removed, {} live",
        stats.cycles,
        stats.derived,
        stats.removed,
        store.live_count()
    );
    stats
}

/// Retract a source tag and restore quiescence
pub fn retract_source(
    network: &mut ReteNetwork,
    store: &mut FactStore,
    terms: &TermStore,
    events: &EventLog,
    tag: &str,
) -> RetractReport {
    store.begin_write();
    let report = if store.has_merges() {
        let before = store.live_count();
        let replay = store.reset_for_replay(tag);
        network.reset();
        debug!(
            "retract '{}': rebuilding from {} asserted facts",
            tag,
            replay.len()
        );
        let mut queue = VecDeque::new();
        for entry in replay {
            let delta = store.replay_assert(entry);
            for id in delta.added {
                queue.push_back((id, Sign::Plus));
            }
        }
        run_to_fixpoint(network, store, terms, events, queue);
        RetractReport {
            tag: tag.to_string(),
            untagged: 0,
            removed: before.saturating_sub(store.live_count()),
            rebuilt: true,
        }
    } else {
        let before = store.live_count();
        let (mut report, dead) = store.retract_source_incremental(tag);
        let queue: VecDeque<(TripleId, Sign)> =
            dead.into_iter().map(|id| (id, Sign::Minus)).collect();
        run_to_fixpoint(network, store, terms, events, queue);
        report.removed = before.saturating_sub(store.live_count());
        report
    };
    store.commit_write();
    report
}
