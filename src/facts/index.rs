//! Five-permutation triple indices
//!
//! Working memory keeps one two-level hash index per useful access path
//! (SPO, POS, OSP, PSO, SOP). Lookups pick the permutation matching the
//! bound slots of a pattern: one bound slot hits a first-level map, two
//! bound slots hit a second-level map, all amortised O(1) plus O(k)
//! enumeration of the posting list.
//!
//! Postings are append-only. Tombstoned rows stay in the lists and are
//! filtered by epoch at read time, which is what makes snapshot reads
//! work without copy-on-write.

use super::{Triple, TripleId};
use crate::terms::TermId;
use hashbrown::HashMap;
use smallvec::SmallVec;

type Postings = SmallVec<[TripleId; 4]>;
type TwoLevel = HashMap<TermId, HashMap<TermId, Postings>>;

/// The five index permutations over one triple arena
#[derive(Debug, Default)]
pub(crate) struct TripleIndices {
    spo: TwoLevel,
    pos: TwoLevel,
    osp: TwoLevel,
    pso: TwoLevel,
    sop: TwoLevel,
}

/// Result of an index probe: either a concrete candidate list or a signal
/// that the pattern constrains nothing and the caller must scan the arena
pub(crate) enum Candidates {
    Ids(Vec<TripleId>),
    Unconstrained,
}

impl TripleIndices {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register a new row under all five permutations
    pub(crate) fn insert(&mut self, triple: Triple, id: TripleId) {
        let Triple {
            subject: s,
            predicate: p,
            object: o,
        } = triple;
        push(&mut self.spo, s, p, id);
        push(&mut self.pos, p, o, id);
        push(&mut self.osp, o, s, id);
        push(&mut self.pso, p, s, id);
        push(&mut self.sop, s, o, id);
    }

    /// Probe the most selective permutation for a pattern shape
    ///
    /// Candidates may include tombstoned rows and, when all three slots are
    /// bound, rows that differ in the unindexed slot; callers always verify
    /// the triple and its liveness.
    pub(crate) fn candidates(
        &self,
        s: Option<TermId>,
        p: Option<TermId>,
        o: Option<TermId>,
    ) -> Candidates {
        match (s, p, o) {
            (Some(s), Some(p), _) => Candidates::Ids(level2(&self.spo, s, p)),
            (Some(s), None, Some(o)) => Candidates::Ids(level2(&self.sop, s, o)),
            (None, Some(p), Some(o)) => Candidates::Ids(level2(&self.pos, p, o)),
            (Some(s), None, None) => Candidates::Ids(level1(&self.spo, s)),
            (None, Some(p), None) => Candidates::Ids(level1(&self.pso, p)),
            (None, None, Some(o)) => Candidates::Ids(level1(&self.osp, o)),
            (None, None, None) => Candidates::Unconstrained,
        }
    }

    /// Upper bound on matching rows, used by the query planner's greedy
    /// ordering; unconstrained patterns report `usize::MAX`
    pub(crate) fn estimate(
        &self,
        s: Option<TermId>,
        p: Option<TermId>,
        o: Option<TermId>,
    ) -> usize {
        match self.candidates(s, p, o) {
            Candidates::Ids(ids) => ids.len(),
            Candidates::Unconstrained => usize::MAX,
        }
    }
}

fn push(index: &mut TwoLevel, first: TermId, second: TermId, id: TripleId) {
    index
        .entry(first)
        .or_default()
        .entry(second)
        .or_default()
        .push(id);
}

fn level2(index: &TwoLevel, first: TermId, second: TermId) -> Vec<TripleId> {
    index
        .get(&first)
        .and_then(|inner| inner.get(&second))
        .map(|postings| postings.to_vec())
        .unwrap_or_default()
}

fn level1(index: &TwoLevel, first: TermId) -> Vec<TripleId> {
    index
        .get(&first)
        .map(|inner| inner.values().flatten().copied().collect())
        .unwrap_or_default()
}
