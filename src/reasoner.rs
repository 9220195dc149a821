//! Host-facing reasoner facade
//!
//! A [`Reasoner`] owns its term store, fact store, compiler and network;
//! a process may hold any number of independent instances. Exactly one
//! writer is active at a time behind a global write mutex, while queries
//! run read-only against epoch snapshots and never block a writer.
//!
//! ## Usage
//!
//! ```rust
//! use owl2_rl_reasoner::{Axiom, AxiomKind, ConceptExpr, Reasoner};
//!
//! let reasoner = Reasoner::default();
//! let person = reasoner.intern("http://example.org/Person");
//! let animal = reasoner.intern("http://example.org/Animal");
//! let john = reasoner.intern("http://example.org/john");
//!
//! reasoner.load_axioms(vec![
//!     Axiom::new(AxiomKind::SubClassOf {
//!         sub: ConceptExpr::Atomic(person),
//!         sup: ConceptExpr::Atomic(animal),
//!     }),
//!     Axiom::new(AxiomKind::ClassAssertion {
//!         concept: ConceptExpr::Atomic(person),
//!         individual: john,
//!     }),
//! ])?;
//! reasoner.reason();
//!
//! let animals = reasoner.instances_of(animal);
//! assert_eq!(animals.len(), 1);
//! # Ok::<(), owl2_rl_reasoner::RlError>(())
//! ```

use crate::axioms::Axiom;
use crate::compiler::{AxiomCompiler, Variant};
use crate::error::{EventLog, ReasonerEvent, RlResult};
use crate::facts::{FactStore, RetractReport, Snapshot, Triple, TripleId};
use crate::query::{extract_subgraph, Query, QueryConfig, QueryEngine, QueryEngineStats, Table};
use crate::rete::driver::{self, FixpointStats};
use crate::rete::{Effect, ReteNetwork, Sign};
use crate::terms::{reserved, TermId, TermStore};
use log::debug;
use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use std::sync::Arc;

/// Reasoner construction options
#[derive(Debug, Clone, Default)]
pub struct ReasonerConfig {
    /// Profile variant hint; see [`Variant`]
    pub variant: Variant,
    /// Query engine options
    pub query: QueryConfig,
}

struct Core {
    store: FactStore,
    network: ReteNetwork,
    compiler: AxiomCompiler,
    pending: VecDeque<(TripleId, Sign)>,
    quiescent: bool,
}

/// An incremental OWL 2 RL reasoner instance
pub struct Reasoner {
    terms: Arc<TermStore>,
    events: Arc<EventLog>,
    engine: QueryEngine,
    write_gate: Mutex<()>,
    inner: RwLock<Core>,
}

impl Default for Reasoner {
    fn default() -> Self {
        Self::new(ReasonerConfig::default())
    }
}

impl Reasoner {
    /// Create a reasoner with the given configuration
    pub fn new(config: ReasonerConfig) -> Self {
        let terms = Arc::new(TermStore::new());
        let events = Arc::new(EventLog::new());
        let store = FactStore::new(Arc::clone(&terms), Arc::clone(&events));
        let mut network = ReteNetwork::new();
        let mut compiler =
            AxiomCompiler::new(Arc::clone(&terms), Arc::clone(&events), config.variant);
        // Static hierarchy-closure productions; the store is empty, so
        // retroactive matching produces no effects.
        let mut effects = Vec::new();
        for production in compiler.bootstrap() {
            network.add_production(production, &store, &terms, &events, &mut effects);
        }
        debug_assert!(effects.is_empty());
        let engine = QueryEngine::new(Arc::clone(&terms), Arc::clone(&events), config.query);
        Reasoner {
            terms,
            events,
            engine,
            write_gate: Mutex::new(()),
            inner: RwLock::new(Core {
                store,
                network,
                compiler,
                pending: VecDeque::new(),
                quiescent: true,
            }),
        }
    }

    /// The shared term store
    pub fn terms(&self) -> &Arc<TermStore> {
        &self.terms
    }

    /// Intern a named term
    pub fn intern(&self, text: &str) -> TermId {
        self.terms.intern_name(text)
    }

    /// Intern a literal
    pub fn intern_literal(&self, lexical: &str, datatype: Option<&str>) -> TermId {
        self.terms.intern_literal(lexical, datatype)
    }

    /// Look up a named term without interning it
    pub fn term(&self, text: &str) -> Option<TermId> {
        self.terms.peek_name(text)
    }

    /// Load a batch of axioms
    ///
    /// Ground facts are asserted immediately; productions are installed and
    /// retroactively matched. Derived consequences become visible after the
    /// next [`reason`](Self::reason) (query entry points trigger it
    /// implicitly).
    pub fn load_axioms<I>(&self, axioms: I) -> RlResult<()>
    where
        I: IntoIterator<Item = Axiom>,
    {
        let _gate = self.write_gate.lock();
        let mut guard = self.inner.write();
        let core = &mut *guard;
        core.store.begin_write();
        for axiom in axioms {
            let source = axiom
                .source
                .as_deref()
                .map(|tag| core.store.intern_source(tag));
            let compiled = core.compiler.compile(&axiom)?;
            for triple in compiled.facts {
                let delta = core.store.assert_triple(triple, source);
                for id in delta.added {
                    core.pending.push_back((id, Sign::Plus));
                }
            }
            for production in compiled.productions {
                let mut effects = Vec::new();
                core.network.add_production(
                    production,
                    &core.store,
                    &self.terms,
                    &self.events,
                    &mut effects,
                );
                for effect in effects {
                    if let Effect::Derive {
                        triple,
                        production,
                        premises,
                    } = effect
                    {
                        let delta = core.store.derive_triple(
                            triple,
                            crate::facts::Justification {
                                production,
                                premises,
                            },
                        );
                        for id in delta.added {
                            core.pending.push_back((id, Sign::Plus));
                        }
                    }
                }
            }
        }
        core.quiescent = core.pending.is_empty();
        if core.quiescent {
            core.store.commit_write();
        }
        Ok(())
    }

    /// Assert a single ad-hoc triple under an optional source tag
    pub fn assert_triple(&self, triple: Triple, source: Option<&str>) {
        let _gate = self.write_gate.lock();
        let mut guard = self.inner.write();
        let core = &mut *guard;
        core.store.begin_write();
        let source = source.map(|tag| core.store.intern_source(tag));
        let delta = core.store.assert_triple(triple, source);
        for id in delta.added {
            core.pending.push_back((id, Sign::Plus));
        }
        core.quiescent = core.pending.is_empty();
        if core.quiescent {
            core.store.commit_write();
        }
    }

    /// Propagate pending deltas to quiescence; a no-op when already
    /// quiescent
    pub fn reason(&self) -> FixpointStats {
        let _gate = self.write_gate.lock();
        self.reason_locked()
    }

    fn reason_locked(&self) -> FixpointStats {
        let mut guard = self.inner.write();
        let core = &mut *guard;
        if core.quiescent && core.pending.is_empty() {
            return FixpointStats::default();
        }
        let queue = std::mem::take(&mut core.pending);
        let stats = driver::run_to_fixpoint(
            &mut core.network,
            &mut core.store,
            &self.terms,
            &self.events,
            queue,
        );
        core.store.commit_write();
        core.quiescent = true;
        stats
    }

    fn ensure_reasoned(&self) {
        let needs_run = {
            let guard = self.inner.read();
            !guard.quiescent || !guard.pending.is_empty()
        };
        if needs_run {
            let _gate = self.write_gate.lock();
            self.reason_locked();
        }
    }

    /// Retract every axiom loaded under a source tag and re-derive
    ///
    /// Unknown tags are a no-op. When the store holds `sameAs` merges the
    /// state is rebuilt from the surviving asserted facts; otherwise
    /// removal is incremental via counting invalidation.
    pub fn retract_source(&self, tag: &str) -> RetractReport {
        self.ensure_reasoned();
        let _gate = self.write_gate.lock();
        let mut guard = self.inner.write();
        let core = &mut *guard;
        let report = driver::retract_source(
            &mut core.network,
            &mut core.store,
            &self.terms,
            &self.events,
            tag,
        );
        debug!("retract_source('{}'): removed {}", tag, report.removed);
        report
    }

    /// Capture a snapshot of the last fully propagated state
    pub fn snapshot(&self) -> Snapshot {
        self.ensure_reasoned();
        self.inner.read().store.snapshot()
    }

    /// Run a SELECT query against the current state
    pub fn select(&self, query: &Query) -> RlResult<Table> {
        self.ensure_reasoned();
        let guard = self.inner.read();
        let snapshot = guard.store.snapshot();
        self.engine.select(&guard.store, snapshot, query)
    }

    /// Run a SELECT query against an explicit snapshot
    pub fn select_at(&self, snapshot: Snapshot, query: &Query) -> RlResult<Table> {
        let guard = self.inner.read();
        self.engine.select(&guard.store, snapshot, query)
    }

    /// True when the query has at least one solution
    pub fn ask(&self, query: &Query) -> RlResult<bool> {
        self.ensure_reasoned();
        let guard = self.inner.read();
        let snapshot = guard.store.snapshot();
        self.engine.ask(&guard.store, snapshot, query)
    }

    /// All triples mentioning the term as subject or object
    pub fn describe(&self, term: TermId) -> Table {
        self.ensure_reasoned();
        let guard = self.inner.read();
        let snapshot = guard.store.snapshot();
        self.engine.describe(&guard.store, snapshot, term)
    }

    /// All individuals typed by the class, closure included
    pub fn instances_of(&self, class: TermId) -> Table {
        self.ensure_reasoned();
        let guard = self.inner.read();
        let snapshot = guard.store.snapshot();
        let rows: Vec<Vec<Option<TermId>>> = guard
            .store
            .select_at(None, Some(reserved::RDF_TYPE), Some(class), snapshot)
            .into_iter()
            .map(|tid| vec![Some(guard.store.triple(tid).subject)])
            .collect();
        Table::new(
            vec!["instance".to_string()],
            rows,
            Arc::clone(&self.terms),
        )
    }

    /// Named classes subsuming the given class (strict, closure included)
    pub fn subsumers_of(&self, class: TermId) -> Vec<TermId> {
        self.ensure_reasoned();
        let guard = self.inner.read();
        let snapshot = guard.store.snapshot();
        let mut supers: Vec<TermId> = guard
            .store
            .select_at(Some(class), Some(reserved::SUB_CLASS_OF), None, snapshot)
            .into_iter()
            .map(|tid| guard.store.triple(tid).object)
            .filter(|id| *id != class)
            .collect();
        supers.sort_unstable();
        supers.dedup();
        supers
    }

    /// Named classes subsumed by the given class (strict, closure included)
    pub fn subsumed_by(&self, class: TermId) -> Vec<TermId> {
        self.ensure_reasoned();
        let guard = self.inner.read();
        let snapshot = guard.store.snapshot();
        let mut subs: Vec<TermId> = guard
            .store
            .select_at(None, Some(reserved::SUB_CLASS_OF), Some(class), snapshot)
            .into_iter()
            .map(|tid| guard.store.triple(tid).subject)
            .filter(|id| *id != class)
            .collect();
        subs.sort_unstable();
        subs.dedup();
        subs
    }

    /// Role assertions matching the optional role/subject/object pins
    ///
    /// With no role pinned, schema and equality predicates are excluded so
    /// the result is the plain role-assertion relation.
    pub fn role_assertions(
        &self,
        role: Option<TermId>,
        subject: Option<TermId>,
        object: Option<TermId>,
    ) -> Table {
        self.ensure_reasoned();
        let guard = self.inner.read();
        let snapshot = guard.store.snapshot();
        let reserved_predicates = [
            reserved::RDF_TYPE,
            reserved::SAME_AS,
            reserved::DIFFERENT_FROM,
            reserved::SUB_CLASS_OF,
            reserved::SUB_PROPERTY_OF,
        ];
        let rows: Vec<Vec<Option<TermId>>> = guard
            .store
            .select_at(subject, role, object, snapshot)
            .into_iter()
            .map(|tid| guard.store.triple(tid))
            .filter(|t| role.is_some() || !reserved_predicates.contains(&t.predicate))
            .map(|t| vec![Some(t.subject), Some(t.predicate), Some(t.object)])
            .collect();
        Table::new(
            vec![
                "subject".to_string(),
                "role".to_string(),
                "object".to_string(),
            ],
            rows,
            Arc::clone(&self.terms),
        )
    }

    /// BFS subgraph over one edge predicate; see the query module docs
    pub fn subgraph(
        &self,
        edge_predicate: TermId,
        root: TermId,
        max_depth: usize,
    ) -> Vec<(TermId, TermId)> {
        self.ensure_reasoned();
        let guard = self.inner.read();
        let snapshot = guard.store.snapshot();
        extract_subgraph(&guard.store, snapshot, edge_predicate, root, max_depth)
    }

    /// Number of live triples
    pub fn triple_count(&self) -> usize {
        self.inner.read().store.live_count()
    }

    /// Number of installed productions
    pub fn production_count(&self) -> usize {
        self.inner.read().network.production_count()
    }

    /// Diagnostics recorded so far
    pub fn events(&self) -> Vec<ReasonerEvent> {
        self.events.snapshot()
    }

    /// True while no inconsistency has been observed
    pub fn is_consistent(&self) -> bool {
        !self.events.has_inconsistency()
    }

    /// Query engine statistics
    pub fn query_stats(&self) -> QueryEngineStats {
        self.engine.stats()
    }
}
