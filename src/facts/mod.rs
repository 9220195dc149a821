//! Fact store: indexed working memory with provenance and snapshots
//!
//! The store holds every materialised triple together with its
//! [`Derivation`]: whether it was externally asserted, which source tags
//! support it, and the justifications (rule firings) that derived it.
//! Rows live in an append-only arena stamped with birth and death epochs;
//! snapshot readers filter by epoch instead of copying.
//!
//! ## Features
//!
//! - **Five index permutations** (SPO, POS, OSP, PSO, SOP) for O(1)
//!   selective lookup, see [`index`]
//! - **Counted justifications**: a derived triple survives until every one
//!   of its justifications has been invalidated
//! - **Cheap snapshots**: an epoch counter, no copy-on-write
//! - **`sameAs` canonicalisation**: union-find over term ids with a
//!   canonical representative per equivalence class; rows are rewritten to
//!   the representative and queries on aliases are transparently redirected
//!
//! The store never raises to the caller; contradictions (an instance of
//! `owl:Nothing`, a `sameAs`/`differentFrom` clash) are recorded on the
//! event log and reasoning continues.

mod index;

use crate::compiler::ProductionId;
use crate::error::{EventLog, InconsistencyKind, ReasonerEvent};
use crate::terms::{reserved, TermId, TermStore};
use hashbrown::HashMap;
use indexmap::IndexMap;
use log::{debug, trace};
use serde::Serialize;
use smallvec::SmallVec;
use std::sync::Arc;

use index::{Candidates, TripleIndices};

/// A materialised triple over interned terms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Triple {
    pub subject: TermId,
    pub predicate: TermId,
    pub object: TermId,
}

impl Triple {
    /// Construct a triple
    pub fn new(subject: TermId, predicate: TermId, object: TermId) -> Self {
        Triple {
            subject,
            predicate,
            object,
        }
    }
}

/// Dense row identifier within one store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TripleId(pub(crate) u32);

impl TripleId {
    /// Row index into the arena
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Monotonic write epoch; snapshots capture one
pub type Epoch = u32;

const NEVER_DIED: Epoch = Epoch::MAX;

/// Interned source tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(u32);

/// One successful rule firing that derived a triple
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Justification {
    pub production: ProductionId,
    /// Premise rows, sorted so firings compare structurally
    pub premises: SmallVec<[TripleId; 4]>,
}

/// Provenance of one row
#[derive(Debug, Clone, Default)]
pub struct Derivation {
    /// Asserted externally without a source tag; such rows are permanent
    pub asserted: bool,
    /// Source tags supplied at assertion time
    pub source_tags: SmallVec<[SourceId; 2]>,
    /// One entry per rule firing; duplicates count separately so removal
    /// can mirror duplicate join firings one for one
    pub justifications: Vec<Justification>,
}

impl Derivation {
    /// A row stays alive while anything still supports it (invariant I1)
    fn supported(&self) -> bool {
        self.asserted || !self.source_tags.is_empty() || !self.justifications.is_empty()
    }
}

/// One arena row: triple, provenance, lifetime
#[derive(Debug, Clone)]
pub struct FactRow {
    pub triple: Triple,
    pub derivation: Derivation,
    pub born: Epoch,
    pub died: Epoch,
}

impl FactRow {
    /// Alive right now
    pub fn is_live(&self) -> bool {
        self.died == NEVER_DIED
    }

    /// Alive as of the given epoch
    pub fn alive_at(&self, epoch: Epoch) -> bool {
        self.born <= epoch && epoch < self.died
    }
}

/// Epoch-stamped read view; see [`FactStore::snapshot`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    epoch: Epoch,
}

impl Snapshot {
    /// The captured epoch
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }
}

/// Net change produced by one store mutation, for delta propagation
#[derive(Debug, Default)]
pub struct StoreDelta {
    pub added: Vec<TripleId>,
    pub removed: Vec<TripleId>,
}

impl StoreDelta {
    /// True when nothing changed
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Report returned by source retraction
#[derive(Debug, Clone, Serialize)]
pub struct RetractReport {
    /// The retracted tag
    pub tag: String,
    /// Rows that lost this tag
    pub untagged: usize,
    /// Rows removed in total, including cascaded derivations
    pub removed: usize,
    /// True when the store fell back to full re-derivation (equivalence
    /// merges cannot be unwound incrementally)
    pub rebuilt: bool,
}

/// External assertion kept for replay-based rebuilds
#[derive(Debug, Clone)]
pub(crate) struct ReplayEntry {
    pub triple: Triple,
    pub source: Option<SourceId>,
}

#[derive(Debug, Default)]
struct UnionFind {
    parent: HashMap<TermId, TermId>,
}

impl UnionFind {
    fn find(&self, term: TermId) -> TermId {
        let mut current = term;
        while let Some(&next) = self.parent.get(&current) {
            current = next;
        }
        current
    }

    fn set_parent(&mut self, alias: TermId, canonical: TermId) {
        self.parent.insert(alias, canonical);
    }

    fn clear(&mut self) {
        self.parent.clear();
    }
}

/// Indexed working memory of triples with provenance and epochs
#[derive(Debug)]
pub struct FactStore {
    terms: Arc<TermStore>,
    events: Arc<EventLog>,
    rows: Vec<FactRow>,
    /// Live triples only; the arena keeps the full history
    live: HashMap<Triple, TripleId>,
    indices: TripleIndices,
    sources: IndexMap<String, SourceId>,
    by_source: HashMap<SourceId, Vec<TripleId>>,
    equiv: UnionFind,
    merges: usize,
    distinct_pairs: Vec<(TermId, TermId)>,
    pending_merges: Vec<(TermId, TermId)>,
    replay: Vec<ReplayEntry>,
    epoch: Epoch,
    stable_epoch: Epoch,
}

impl FactStore {
    /// Create an empty store sharing the reasoner's term store and event log
    pub fn new(terms: Arc<TermStore>, events: Arc<EventLog>) -> Self {
        FactStore {
            terms,
            events,
            rows: Vec::new(),
            live: HashMap::new(),
            indices: TripleIndices::new(),
            sources: IndexMap::new(),
            by_source: HashMap::new(),
            equiv: UnionFind::default(),
            merges: 0,
            distinct_pairs: Vec::new(),
            pending_merges: Vec::new(),
            replay: Vec::new(),
            epoch: 0,
            stable_epoch: 0,
        }
    }

    /// Intern a source tag
    pub fn intern_source(&mut self, tag: &str) -> SourceId {
        if let Some(id) = self.sources.get(tag) {
            return *id;
        }
        let id = SourceId(self.sources.len() as u32);
        self.sources.insert(tag.to_string(), id);
        id
    }

    /// Look up a source tag without interning it
    pub fn peek_source(&self, tag: &str) -> Option<SourceId> {
        self.sources.get(tag).copied()
    }

    /// Begin a mutation batch: bump the working epoch
    pub fn begin_write(&mut self) {
        self.epoch += 1;
    }

    /// Mark the current epoch as fully propagated; snapshots taken from now
    /// on observe it
    pub fn commit_write(&mut self) {
        self.stable_epoch = self.epoch;
    }

    /// Capture a read view of the last fully propagated epoch
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            epoch: self.stable_epoch,
        }
    }

    /// Canonical representative of a term under the `sameAs` equivalence
    pub fn canonical(&self, term: TermId) -> TermId {
        self.equiv.find(term)
    }

    /// True when any `sameAs` merge has happened
    pub fn has_merges(&self) -> bool {
        self.merges > 0
    }

    /// Row access; panics on a foreign id
    pub fn row(&self, id: TripleId) -> &FactRow {
        &self.rows[id.index()]
    }

    /// Triple stored at a row
    pub fn triple(&self, id: TripleId) -> Triple {
        self.rows[id.index()].triple
    }

    /// Number of live triples
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// True when the canonicalised triple is currently present
    pub fn contains(&self, triple: Triple) -> bool {
        self.live.contains_key(&self.canonicalize(triple))
    }

    fn canonicalize(&self, t: Triple) -> Triple {
        Triple {
            subject: self.equiv.find(t.subject),
            predicate: self.equiv.find(t.predicate),
            object: self.equiv.find(t.object),
        }
    }

    /// Assert an externally supplied triple, optionally under a source tag
    ///
    /// Idempotent on duplicates: re-asserting merges source tags and
    /// produces an empty delta.
    pub fn assert_triple(&mut self, triple: Triple, source: Option<SourceId>) -> StoreDelta {
        // The replay log keeps the original form; canonicalisation is
        // recomputed when a rebuild replays it.
        self.replay.push(ReplayEntry { triple, source });
        let canonical = self.canonicalize(triple);
        self.upsert(canonical, Support::Asserted(source))
    }

    /// Record a derived triple under a justification
    ///
    /// Duplicate derivations append the justification but report no delta,
    /// so cyclic rules terminate.
    pub fn derive_triple(&mut self, triple: Triple, justification: Justification) -> StoreDelta {
        let canonical = self.canonicalize(triple);
        self.upsert(canonical, Support::Derived(justification))
    }

    /// Remove one occurrence of a justification from a derived triple
    ///
    /// Returns the row id if the triple lost its last support and died.
    pub fn undo_justification(
        &mut self,
        triple: Triple,
        production: ProductionId,
        premises: &[TripleId],
    ) -> Option<TripleId> {
        let canonical = self.canonicalize(triple);
        let id = *self.live.get(&canonical)?;
        let epoch = self.epoch;
        let row = &mut self.rows[id.index()];
        let position = row
            .derivation
            .justifications
            .iter()
            .position(|j| j.production == production && j.premises.as_slice() == premises)?;
        row.derivation.justifications.swap_remove(position);
        if row.derivation.supported() {
            return None;
        }
        row.died = epoch;
        self.live.remove(&canonical);
        trace!("row {:?} lost its last support", id);
        Some(id)
    }

    /// Remove a source tag from every triple carrying it
    ///
    /// Returns the rows that died outright; the caller propagates the
    /// resulting −deltas through the network. Unknown tags are a no-op.
    pub fn retract_source_incremental(&mut self, tag: &str) -> (RetractReport, Vec<TripleId>) {
        let mut report = RetractReport {
            tag: tag.to_string(),
            untagged: 0,
            removed: 0,
            rebuilt: false,
        };
        let Some(sid) = self.peek_source(tag) else {
            return (report, Vec::new());
        };
        self.replay.retain(|entry| entry.source != Some(sid));
        let ids = self.by_source.remove(&sid).unwrap_or_default();
        let mut dead = Vec::new();
        for id in ids {
            let epoch = self.epoch;
            let row = &mut self.rows[id.index()];
            if !row.is_live() {
                continue;
            }
            let before = row.derivation.source_tags.len();
            row.derivation.source_tags.retain(|t| *t != sid);
            if row.derivation.source_tags.len() == before {
                continue;
            }
            report.untagged += 1;
            if !row.derivation.supported() {
                row.died = epoch;
                let triple = row.triple;
                self.live.remove(&triple);
                dead.push(id);
            }
        }
        report.removed = dead.len();
        debug!(
            "retract '{}': {} rows untagged, {} died",
            tag, report.untagged, report.removed
        );
        (report, dead)
    }

    /// Tombstone every live row and return the surviving external
    /// assertions for replay
    ///
    /// Used by the driver when a retraction touches a store that performed
    /// `sameAs` merges: equivalence classes cannot be shrunk incrementally,
    /// so the state is rebuilt from the asserted facts.
    pub(crate) fn reset_for_replay(&mut self, retracted: &str) -> Vec<ReplayEntry> {
        let retracted_id = self.peek_source(retracted);
        if let Some(sid) = retracted_id {
            self.replay.retain(|entry| entry.source != Some(sid));
            self.by_source.remove(&sid);
        }
        let epoch = self.epoch;
        for row in &mut self.rows {
            if row.is_live() {
                row.died = epoch;
            }
        }
        self.live.clear();
        self.by_source.clear();
        self.equiv.clear();
        self.merges = 0;
        self.distinct_pairs.clear();
        self.pending_merges.clear();
        std::mem::take(&mut self.replay)
    }

    /// Re-enter a replay entry after a rebuild
    pub(crate) fn replay_assert(&mut self, entry: ReplayEntry) -> StoreDelta {
        self.assert_triple(entry.triple, entry.source)
    }

    /// Process `sameAs` pairs observed since the last call
    ///
    /// Performs the union-find merges, rewrites live rows mentioning an
    /// alias onto the canonical representative, and returns the ids of the
    /// rewritten rows so they propagate as +deltas. Rewrite tombstones are
    /// not propagated as −deltas: the replacement row inherits the merged
    /// provenance, and retraction over merged state goes through replay.
    pub fn apply_pending_merges(&mut self) -> Vec<TripleId> {
        let mut added = Vec::new();
        while let Some((a, b)) = self.pending_merges.pop() {
            let ra = self.equiv.find(a);
            let rb = self.equiv.find(b);
            if ra == rb {
                continue;
            }
            let (canonical, alias) = if ra.raw() <= rb.raw() {
                (ra, rb)
            } else {
                (rb, ra)
            };
            self.equiv.set_parent(alias, canonical);
            self.merges += 1;
            debug!(
                "sameAs merge: {} -> {}",
                self.terms.render(alias),
                self.terms.render(canonical)
            );
            self.check_distinct_clash();
            self.rewrite_alias(alias, &mut added);
        }
        added
    }

    fn check_distinct_clash(&self) {
        for (x, y) in &self.distinct_pairs {
            if self.equiv.find(*x) == self.equiv.find(*y) {
                self.events.record(ReasonerEvent::Inconsistency {
                    kind: InconsistencyKind::SameDifferentClash,
                    subject: self.terms.render(*x),
                    detail: format!(
                        "differentFrom pair {} / {} merged into one sameAs class",
                        self.terms.render(*x),
                        self.terms.render(*y)
                    ),
                });
            }
        }
    }

    fn rewrite_alias(&mut self, alias: TermId, added: &mut Vec<TripleId>) {
        let victims: Vec<TripleId> = self
            .live
            .iter()
            .filter(|(t, _)| {
                (t.subject == alias || t.predicate == alias || t.object == alias)
                    // Stated equivalence and distinctness records keep their
                    // original ids; the union-find carries their meaning.
                    && t.predicate != reserved::SAME_AS
                    && t.predicate != reserved::DIFFERENT_FROM
            })
            .map(|(_, id)| *id)
            .collect();
        for id in victims {
            let epoch = self.epoch;
            let row = &mut self.rows[id.index()];
            let old = row.triple;
            let derivation = row.derivation.clone();
            row.died = epoch;
            self.live.remove(&old);
            let rewritten = self.canonicalize(old);
            match self.live.get(&rewritten).copied() {
                Some(existing) => {
                    let target = &mut self.rows[existing.index()];
                    target.derivation.asserted |= derivation.asserted;
                    for tag in &derivation.source_tags {
                        if !target.derivation.source_tags.contains(tag) {
                            target.derivation.source_tags.push(*tag);
                            self.by_source.entry(*tag).or_default().push(existing);
                        }
                    }
                    target
                        .derivation
                        .justifications
                        .extend(derivation.justifications);
                }
                None => {
                    let tags = derivation.source_tags.clone();
                    let new_id = self.add_row(rewritten, derivation);
                    for tag in tags {
                        self.by_source.entry(tag).or_default().push(new_id);
                    }
                    added.push(new_id);
                }
            }
        }
    }

    fn upsert(&mut self, triple: Triple, support: Support) -> StoreDelta {
        let mut delta = StoreDelta::default();
        // Self-sameAs carries no information.
        if triple.predicate == reserved::SAME_AS && triple.subject == triple.object {
            return delta;
        }
        if let Some(&id) = self.live.get(&triple) {
            let row = &mut self.rows[id.index()];
            match support {
                Support::Asserted(None) => row.derivation.asserted = true,
                Support::Asserted(Some(tag)) => {
                    if !row.derivation.source_tags.contains(&tag) {
                        row.derivation.source_tags.push(tag);
                        self.by_source.entry(tag).or_default().push(id);
                    }
                }
                Support::Derived(justification) => {
                    row.derivation.justifications.push(justification);
                }
            }
            return delta;
        }
        let mut derivation = Derivation::default();
        let mut tag_to_index = None;
        match support {
            Support::Asserted(None) => derivation.asserted = true,
            Support::Asserted(Some(tag)) => {
                derivation.source_tags.push(tag);
                tag_to_index = Some(tag);
            }
            Support::Derived(justification) => derivation.justifications.push(justification),
        }
        let id = self.add_row(triple, derivation);
        if let Some(tag) = tag_to_index {
            self.by_source.entry(tag).or_default().push(id);
        }
        delta.added.push(id);
        delta
    }

    fn add_row(&mut self, triple: Triple, derivation: Derivation) -> TripleId {
        let id = TripleId(self.rows.len() as u32);
        self.rows.push(FactRow {
            triple,
            derivation,
            born: self.epoch,
            died: NEVER_DIED,
        });
        self.live.insert(triple, id);
        self.indices.insert(triple, id);
        self.observe_special(triple);
        id
    }

    fn observe_special(&mut self, triple: Triple) {
        if triple.predicate == reserved::SAME_AS {
            self.pending_merges.push((triple.subject, triple.object));
        } else if triple.predicate == reserved::DIFFERENT_FROM {
            self.distinct_pairs.push((triple.subject, triple.object));
            if self.equiv.find(triple.subject) == self.equiv.find(triple.object) {
                self.check_distinct_clash();
            }
        } else if triple.predicate == reserved::RDF_TYPE && triple.object == reserved::NOTHING {
            self.events.record(ReasonerEvent::Inconsistency {
                kind: InconsistencyKind::NothingInstance,
                subject: self.terms.render(triple.subject),
                detail: "individual derived as an instance of owl:Nothing".to_string(),
            });
        }
    }

    /// Enumerate live rows matching a pattern right now
    pub fn select(
        &self,
        s: Option<TermId>,
        p: Option<TermId>,
        o: Option<TermId>,
    ) -> Vec<TripleId> {
        self.select_filtered(s, p, o, None)
    }

    /// Enumerate rows matching a pattern as of a snapshot
    pub fn select_at(
        &self,
        s: Option<TermId>,
        p: Option<TermId>,
        o: Option<TermId>,
        snapshot: Snapshot,
    ) -> Vec<TripleId> {
        self.select_filtered(s, p, o, Some(snapshot.epoch))
    }

    fn select_filtered(
        &self,
        s: Option<TermId>,
        p: Option<TermId>,
        o: Option<TermId>,
        at: Option<Epoch>,
    ) -> Vec<TripleId> {
        // Queries on an alias are redirected to the canonical member.
        let s = s.map(|t| self.equiv.find(t));
        let p = p.map(|t| self.equiv.find(t));
        let o = o.map(|t| self.equiv.find(t));
        let matches = |row: &FactRow| {
            let alive = match at {
                Some(epoch) => row.alive_at(epoch),
                None => row.is_live(),
            };
            alive
                && s.map_or(true, |x| row.triple.subject == x)
                && p.map_or(true, |x| row.triple.predicate == x)
                && o.map_or(true, |x| row.triple.object == x)
        };
        match self.indices.candidates(s, p, o) {
            Candidates::Ids(ids) => ids
                .into_iter()
                .filter(|id| matches(&self.rows[id.index()]))
                .collect(),
            Candidates::Unconstrained => self
                .rows
                .iter()
                .enumerate()
                .filter(|(_, row)| matches(row))
                .map(|(i, _)| TripleId(i as u32))
                .collect(),
        }
    }

    /// Planner estimate of a pattern's result size
    pub fn estimate(&self, s: Option<TermId>, p: Option<TermId>, o: Option<TermId>) -> usize {
        let s = s.map(|t| self.equiv.find(t));
        let p = p.map(|t| self.equiv.find(t));
        let o = o.map(|t| self.equiv.find(t));
        match (s, p, o) {
            (None, None, None) => self.live.len(),
            _ => self.indices.estimate(s, p, o),
        }
    }
}

enum Support {
    Asserted(Option<SourceId>),
    Derived(Justification),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EventLog;
    use crate::terms::TermStore;

    fn test_store() -> (Arc<TermStore>, Arc<EventLog>, FactStore) {
        let terms = Arc::new(TermStore::new());
        let events = Arc::new(EventLog::new());
        let store = FactStore::new(Arc::clone(&terms), Arc::clone(&events));
        (terms, events, store)
    }

    fn justification(premises: &[TripleId]) -> Justification {
        Justification {
            production: ProductionId::from_raw(0),
            premises: premises.iter().copied().collect(),
        }
    }

    #[test]
    fn test_assert_is_idempotent() {
        let (terms, _events, mut store) = test_store();
        let a = terms.intern_name("http://example.org/a");
        let p = terms.intern_name("http://example.org/p");
        let b = terms.intern_name("http://example.org/b");
        let t = Triple::new(a, p, b);

        store.begin_write();
        let first = store.assert_triple(t, None);
        assert_eq!(first.added.len(), 1);
        let second = store.assert_triple(t, None);
        assert!(second.is_empty());
        assert_eq!(store.live_count(), 1);
    }

    #[test]
    fn test_select_uses_pattern_shape() {
        let (terms, _events, mut store) = test_store();
        let a = terms.intern_name("http://example.org/a");
        let b = terms.intern_name("http://example.org/b");
        let c = terms.intern_name("http://example.org/c");
        let p = terms.intern_name("http://example.org/p");
        let q = terms.intern_name("http://example.org/q");

        store.begin_write();
        store.assert_triple(Triple::new(a, p, b), None);
        store.assert_triple(Triple::new(a, q, c), None);
        store.assert_triple(Triple::new(b, p, c), None);

        assert_eq!(store.select(Some(a), None, None).len(), 2);
        assert_eq!(store.select(None, Some(p), None).len(), 2);
        assert_eq!(store.select(None, None, Some(c)).len(), 2);
        assert_eq!(store.select(Some(a), Some(p), None).len(), 1);
        assert_eq!(store.select(Some(a), Some(p), Some(b)).len(), 1);
        assert_eq!(store.select(Some(a), Some(p), Some(c)).len(), 0);
        assert_eq!(store.select(None, None, None).len(), 3);
    }

    #[test]
    fn test_snapshot_isolation() {
        let (terms, _events, mut store) = test_store();
        let a = terms.intern_name("http://example.org/a");
        let p = terms.intern_name("http://example.org/p");
        let b = terms.intern_name("http://example.org/b");
        let c = terms.intern_name("http://example.org/c");

        store.begin_write();
        store.assert_triple(Triple::new(a, p, b), None);
        store.commit_write();
        let snap = store.snapshot();

        store.begin_write();
        store.assert_triple(Triple::new(a, p, c), None);
        store.commit_write();

        assert_eq!(store.select_at(Some(a), None, None, snap).len(), 1);
        assert_eq!(store.select(Some(a), None, None).len(), 2);
    }

    #[test]
    fn test_counting_invalidation() {
        let (terms, _events, mut store) = test_store();
        let a = terms.intern_name("http://example.org/a");
        let p = terms.intern_name("http://example.org/p");
        let b = terms.intern_name("http://example.org/b");
        let t = Triple::new(a, p, b);

        store.begin_write();
        let base = store.assert_triple(Triple::new(b, p, a), None);
        let premise = base.added[0];

        let d1 = store.derive_triple(t, justification(&[premise]));
        assert_eq!(d1.added.len(), 1);
        // Second derivation from a different premise set: no delta, but counted.
        let other = store.assert_triple(Triple::new(a, p, a), None).added[0];
        let d2 = store.derive_triple(t, justification(&[other]));
        assert!(d2.is_empty());

        // Undoing one of two justifications keeps the triple.
        assert!(store
            .undo_justification(t, ProductionId::from_raw(0), &[premise])
            .is_none());
        assert!(store.contains(t));

        // Undoing the last one kills it.
        let died = store.undo_justification(t, ProductionId::from_raw(0), &[other]);
        assert!(died.is_some());
        assert!(!store.contains(t));
    }

    #[test]
    fn test_retract_source_round_trip() {
        let (terms, _events, mut store) = test_store();
        let a = terms.intern_name("http://example.org/a");
        let p = terms.intern_name("http://example.org/p");
        let b = terms.intern_name("http://example.org/b");
        let t = Triple::new(a, p, b);

        store.begin_write();
        let tag = store.intern_source("file.owl");
        store.assert_triple(t, Some(tag));
        assert!(store.contains(t));

        store.begin_write();
        let (report, dead) = store.retract_source_incremental("file.owl");
        assert_eq!(report.untagged, 1);
        assert_eq!(dead.len(), 1);
        assert!(!store.contains(t));
    }

    #[test]
    fn test_retract_unknown_tag_is_noop() {
        let (_terms, _events, mut store) = test_store();
        store.begin_write();
        let (report, dead) = store.retract_source_incremental("nope");
        assert_eq!(report.untagged, 0);
        assert!(dead.is_empty());
    }

    #[test]
    fn test_multi_source_triple_survives_one_retraction() {
        let (terms, _events, mut store) = test_store();
        let a = terms.intern_name("http://example.org/a");
        let p = terms.intern_name("http://example.org/p");
        let b = terms.intern_name("http://example.org/b");
        let t = Triple::new(a, p, b);

        store.begin_write();
        let tag1 = store.intern_source("one.owl");
        let tag2 = store.intern_source("two.owl");
        store.assert_triple(t, Some(tag1));
        store.assert_triple(t, Some(tag2));

        store.begin_write();
        let (_, dead) = store.retract_source_incremental("one.owl");
        assert!(dead.is_empty());
        assert!(store.contains(t));

        let (_, dead) = store.retract_source_incremental("two.owl");
        assert_eq!(dead.len(), 1);
        assert!(!store.contains(t));
    }

    #[test]
    fn test_same_as_merges_and_redirects() {
        let (terms, _events, mut store) = test_store();
        let a = terms.intern_name("http://example.org/a");
        let b = terms.intern_name("http://example.org/b");
        let c = terms.intern_name("http://example.org/c");
        let p = terms.intern_name("http://example.org/p");

        store.begin_write();
        store.assert_triple(Triple::new(a, p, b), None);
        store.assert_triple(Triple::new(a, p, c), None);
        store.assert_triple(Triple::new(b, reserved::SAME_AS, c), None);
        let added = store.apply_pending_merges();

        // b and c collapse onto one representative; the two p-rows merge.
        let canon = store.canonical(b);
        assert_eq!(store.canonical(c), canon);
        assert!(store.has_merges());
        assert_eq!(store.select(Some(a), Some(p), None).len(), 1);
        // A query via the alias is redirected.
        assert_eq!(store.select(Some(a), Some(p), Some(b)).len(), 1);
        assert_eq!(store.select(Some(a), Some(p), Some(c)).len(), 1);
        assert!(added.len() <= 1);
    }

    #[test]
    fn test_same_different_clash_raises_event() {
        let (terms, events, mut store) = test_store();
        let a = terms.intern_name("http://example.org/a");
        let b = terms.intern_name("http://example.org/b");

        store.begin_write();
        store.assert_triple(Triple::new(a, reserved::DIFFERENT_FROM, b), None);
        store.assert_triple(Triple::new(a, reserved::SAME_AS, b), None);
        store.apply_pending_merges();

        assert!(events.has_inconsistency());
    }

    #[test]
    fn test_nothing_instance_raises_event() {
        let (terms, events, mut store) = test_store();
        let a = terms.intern_name("http://example.org/a");

        store.begin_write();
        store.assert_triple(Triple::new(a, reserved::RDF_TYPE, reserved::NOTHING), None);
        assert!(events.has_inconsistency());
    }
}
