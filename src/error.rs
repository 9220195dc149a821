//! Error types and the diagnostic event log
//!
//! The compiler and the query engine raise structured [`RlError`] values for
//! malformed input. The fact store and the RETE network never raise: they
//! append [`ReasonerEvent`] diagnostics to the per-reasoner [`EventLog`] and
//! keep going, so a caller decides how strict to be about inconsistencies.

use parking_lot::Mutex;
use serde::Serialize;
use thiserror::Error;

/// OWL 2 RL reasoner error type
#[derive(Error, Debug)]
pub enum RlError {
    /// Structurally invalid query (empty selection, unbound select variable, ...)
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Malformed axiom input that cannot even be warned away
    #[error("Invalid axiom: {0}")]
    InvalidAxiom(String),

    /// An internal invariant was violated; indicates a bug in the reasoner
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for reasoner operations
pub type RlResult<T> = Result<T, RlError>;

/// What kind of contradiction was observed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InconsistencyKind {
    /// An individual became an instance of `owl:Nothing`
    NothingInstance,
    /// A `differentFrom` pair collapsed into one `sameAs` equivalence class
    SameDifferentClash,
}

/// Diagnostics recorded during loading, reasoning, and querying
///
/// Events never abort reasoning; the core is paraconsistent by default and
/// callers choose their own policy by inspecting the log.
#[derive(Debug, Clone, Serialize)]
pub enum ReasonerEvent {
    /// The ontology became inconsistent; reasoning continues
    Inconsistency {
        kind: InconsistencyKind,
        subject: String,
        detail: String,
    },
    /// An axiom outside the OWL 2 RL profile was dropped
    NonRlAxiom { axiom: String, reason: String },
    /// A builtin received incomparable literal operands; the firing was dropped
    LiteralTypeError { builtin: String, detail: String },
    /// A query referenced a constant that was never interned
    UnknownTerm { text: String },
}

/// Append-only event log owned by a single reasoner instance
#[derive(Debug, Default)]
pub struct EventLog {
    entries: Mutex<Vec<ReasonerEvent>>,
}

impl EventLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event
    pub fn record(&self, event: ReasonerEvent) {
        self.entries.lock().push(event);
    }

    /// Copy out all events recorded so far
    pub fn snapshot(&self) -> Vec<ReasonerEvent> {
        self.entries.lock().clone()
    }

    /// Number of recorded events
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// True when nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// True when any inconsistency has been observed
    pub fn has_inconsistency(&self) -> bool {
        self.entries
            .lock()
            .iter()
            .any(|e| matches!(e, ReasonerEvent::Inconsistency { .. }))
    }

    /// Serialise the log to JSON for host-side inspection
    pub fn to_json(&self) -> String {
        serde_json::to_string(&*self.entries.lock()).unwrap_or_else(|_| "[]".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_log_records_and_snapshots() {
        let log = EventLog::new();
        assert!(log.is_empty());

        log.record(ReasonerEvent::NonRlAxiom {
            axiom: "SubClassOf".to_string(),
            reason: "existential head".to_string(),
        });
        log.record(ReasonerEvent::Inconsistency {
            kind: InconsistencyKind::NothingInstance,
            subject: "ex:a".to_string(),
            detail: "derived type Nothing".to_string(),
        });

        assert_eq!(log.len(), 2);
        assert!(log.has_inconsistency());

        let events = log.snapshot();
        assert!(matches!(events[0], ReasonerEvent::NonRlAxiom { .. }));
    }

    #[test]
    fn test_event_log_json_export() {
        let log = EventLog::new();
        log.record(ReasonerEvent::UnknownTerm {
            text: "http://example.org/missing".to_string(),
        });
        let json = log.to_json();
        assert!(json.contains("missing"));
    }
}
