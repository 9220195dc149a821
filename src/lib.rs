//! # OWL 2 RL Reasoner
//!
//! An incremental OWL 2 RL materialisation engine implemented in Rust.
//! Axioms and SWRL rules compile into a RETE discrimination network that
//! maintains derived facts under monotonic additions, preserves provenance
//! per derived triple, and supports retraction of source-tagged input with
//! counting-based invalidation. Conjunctive queries run against epoch
//! snapshots of the materialised store.
//!
//! ## Features
//!
//! - **Incremental reasoning**: deltas propagate through shared alpha
//!   nodes and hash-indexed joins to a fixpoint; no batch re-runs on
//!   addition
//! - **Provenance**: every derived triple carries its justifications, so
//!   retracting a source removes exactly the facts it no longer supports
//! - **Snapshot queries**: UNION, MINUS, FILTER, DISTINCT/ORDER/LIMIT and
//!   a BFS subgraph operator over lock-free epoch snapshots
//! - **Paraconsistent by default**: inconsistencies are reported on an
//!   event log and reasoning continues; callers choose policy
//!
//! ## Quick Start
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
//!     Axiom::with_source(
//!         AxiomKind::SubClassOf {
//!             sub: ConceptExpr::Atomic(person),
//!             sup: ConceptExpr::Atomic(animal),
//!         },
//!         "schema.owl",
//!     ),
//!     Axiom::with_source(
//!         AxiomKind::ClassAssertion {
//!             concept: ConceptExpr::Atomic(person),
//!             individual: john,
//!         },
//!         "data.owl",
//!     ),
//! ])?;
//! reasoner.reason();
//! assert_eq!(reasoner.instances_of(animal).len(), 1);
//!
//! reasoner.retract_source("data.owl");
//! assert_eq!(reasoner.instances_of(animal).len(), 0);
//! # Ok::<(), owl2_rl_reasoner::RlError>(())
//! ```
//!
//! ## Architecture
//!
//! The crate is a pipeline of cooperating modules, leaves first:
//!
//! - [`terms`] - interning of names and typed literals to dense ids
//! - [`facts`] - indexed working memory with provenance and snapshots
//! - [`axioms`] - the abstract axiom IR, the core's only input shape
//! - [`compiler`] - OWL 2 RL rule templates over the IR
//! - [`rete`] - the discrimination network and the fixpoint driver
//! - [`query`] - conjunctive query compilation and execution
//! - [`reasoner`] - the host-facing facade

/// Error types and the diagnostic event log
pub mod error;

/// Constants for commonly used vocabulary IRIs
pub mod constants;

/// Term store: interning of names and typed literals
pub mod terms;

/// Abstract axiom IR over interned terms
pub mod axioms;

/// Fact store: indexed working memory with provenance and snapshots
pub mod facts;

/// Axiom compiler: IR axioms to productions and ground facts
pub mod compiler;

/// RETE network and the fixed-point inference driver
pub mod rete;

/// Query engine over fact-store snapshots
pub mod query;

/// Host-facing reasoner facade
pub mod reasoner;

// Re-exports for convenience
pub use axioms::{Axiom, AxiomKind, ConceptExpr, RoleRef, SwrlArg, SwrlAtom, SwrlBuiltin, SwrlRule};
pub use compiler::Variant;
pub use error::{EventLog, InconsistencyKind, ReasonerEvent, RlError, RlResult};
pub use facts::{RetractReport, Snapshot, Triple};
pub use query::{
    iri, lit, typed_lit, var, CompareOp, FilterExpr, FilterValue, GroupPattern, Query, QueryConfig,
    SortDirection, Table, TriplePattern,
};
pub use reasoner::{Reasoner, ReasonerConfig};
pub use terms::{Term, TermId, TermStore};
