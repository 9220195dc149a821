//! Query engine: conjunctive patterns over fact-store snapshots
//!
//! Queries arrive as an IR of triple patterns plus UNION blocks, MINUS
//! groups, FILTER expressions and solution modifiers, and run against a
//! [`Snapshot`](crate::facts::Snapshot): concurrent writers never change a
//! running query's result. Constants are carried as surface text and
//! resolved against the term store at compile time; a constant that was
//! never interned makes the affected block empty rather than raising.
//!
//! Compilation is cached by a structural fingerprint: variables renamed to
//! first-occurrence ordinals, constants reduced to position markers, so the
//! same pattern shape hits the cache under different constant bindings.
//!
//! Two semantics pinned down here deserve a note. Multiple UNION blocks
//! evaluate independently and then join with the outer patterns *and with
//! each other* over shared variables; short-circuiting the first block
//! would silently drop solutions. The graph-traversal operator returns the
//! BFS-reachable subgraph only, never the full edge relation.

mod exec;
mod plan;
mod traversal;

pub use traversal::extract_subgraph;

use crate::error::{EventLog, RlError, RlResult};
use crate::facts::{FactStore, Snapshot};
use crate::terms::{TermId, TermStore};
use lru::LruCache;
use parking_lot::Mutex;
use serde::Serialize;
use std::num::NonZeroUsize;
use std::sync::Arc;

use plan::{CompiledQuery, PlanSkeleton};

/// One slot of a surface query pattern
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum QueryTerm {
    /// A named constant, resolved against the term store at compile time
    Iri(String),
    /// A typed literal constant
    Literal {
        lexical: String,
        datatype: Option<String>,
    },
    /// A query variable
    Var(String),
}

/// Convenience constructor for a variable slot
pub fn var(name: &str) -> QueryTerm {
    QueryTerm::Var(name.to_string())
}

/// Convenience constructor for a named constant slot
pub fn iri(text: &str) -> QueryTerm {
    QueryTerm::Iri(text.to_string())
}

/// Convenience constructor for a plain literal slot
pub fn lit(lexical: &str) -> QueryTerm {
    QueryTerm::Literal {
        lexical: lexical.to_string(),
        datatype: None,
    }
}

/// Convenience constructor for a typed literal slot
pub fn typed_lit(lexical: &str, datatype: &str) -> QueryTerm {
    QueryTerm::Literal {
        lexical: lexical.to_string(),
        datatype: Some(datatype.to_string()),
    }
}

/// A surface triple pattern
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriplePattern {
    pub subject: QueryTerm,
    pub predicate: QueryTerm,
    pub object: QueryTerm,
}

impl TriplePattern {
    /// Construct a pattern
    pub fn new(subject: QueryTerm, predicate: QueryTerm, object: QueryTerm) -> Self {
        TriplePattern {
            subject,
            predicate,
            object,
        }
    }
}

/// A basic group: a conjunction of patterns (a UNION branch or MINUS body)
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct GroupPattern {
    pub patterns: Vec<TriplePattern>,
}

impl GroupPattern {
    /// Group from a pattern list
    pub fn new(patterns: Vec<TriplePattern>) -> Self {
        GroupPattern { patterns }
    }
}

/// Sort direction for ORDER BY
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Relational comparison operators usable in filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// A filter operand: variable or constant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FilterValue {
    Var(String),
    Iri(String),
    Literal {
        lexical: String,
        datatype: Option<String>,
    },
}

/// Filter expression tree
///
/// Evaluation follows SPARQL error semantics: a type error (incomparable
/// operands, unbound variable) makes the row fail the filter rather than
/// aborting the query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FilterExpr {
    Compare(CompareOp, FilterValue, FilterValue),
    Bound(String),
    Contains(FilterValue, FilterValue),
    StartsWith(FilterValue, FilterValue),
    Regex(FilterValue, String),
    And(Box<FilterExpr>, Box<FilterExpr>),
    Or(Box<FilterExpr>, Box<FilterExpr>),
    Not(Box<FilterExpr>),
}

/// A conjunctive query with UNION, MINUS, FILTER and solution modifiers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Query {
    pub select: Vec<String>,
    pub patterns: Vec<TriplePattern>,
    /// Each entry is one UNION block; a block is a list of branches
    pub unions: Vec<Vec<GroupPattern>>,
    pub minuses: Vec<GroupPattern>,
    pub filters: Vec<FilterExpr>,
    pub distinct: bool,
    pub order_by: Vec<(String, SortDirection)>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl Query {
    /// Start a query with a select list
    pub fn select(vars: &[&str]) -> Self {
        Query {
            select: vars.iter().map(|v| v.to_string()).collect(),
            patterns: Vec::new(),
            unions: Vec::new(),
            minuses: Vec::new(),
            filters: Vec::new(),
            distinct: false,
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Append an outer pattern
    pub fn pattern(mut self, subject: QueryTerm, predicate: QueryTerm, object: QueryTerm) -> Self {
        self.patterns
            .push(TriplePattern::new(subject, predicate, object));
        self
    }

    /// Append a UNION block with the given branches
    pub fn union(mut self, branches: Vec<GroupPattern>) -> Self {
        self.unions.push(branches);
        self
    }

    /// Append a MINUS group
    pub fn minus(mut self, group: GroupPattern) -> Self {
        self.minuses.push(group);
        self
    }

    /// Append a filter
    pub fn filter(mut self, filter: FilterExpr) -> Self {
        self.filters.push(filter);
        self
    }

    /// Request distinct solutions
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Append an ORDER BY key
    pub fn order_by(mut self, variable: &str, direction: SortDirection) -> Self {
        self.order_by.push((variable.to_string(), direction));
        self
    }

    /// Limit the number of solutions
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skip leading solutions
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// A materialised query result
///
/// Cells hold interned ids; rendering goes through the shared term store.
#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Option<TermId>>>,
    terms: Arc<TermStore>,
}

impl Table {
    pub(crate) fn new(
        columns: Vec<String>,
        rows: Vec<Vec<Option<TermId>>>,
        terms: Arc<TermStore>,
    ) -> Self {
        Table {
            columns,
            rows,
            terms,
        }
    }

    /// Column names
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when there are no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Raw cell access
    pub fn cell(&self, row: usize, column: usize) -> Option<TermId> {
        self.rows.get(row).and_then(|r| r.get(column)).copied().flatten()
    }

    /// Index of a named column
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All values of one column, skipping unbound cells
    pub fn column_values(&self, name: &str) -> Vec<TermId> {
        match self.column_index(name) {
            Some(i) => self.rows.iter().filter_map(|r| r[i]).collect(),
            None => Vec::new(),
        }
    }

    /// Render a cell for display
    pub fn render(&self, row: usize, column: usize) -> Option<String> {
        self.cell(row, column).map(|id| self.terms.render(id))
    }

    /// Serialise to a JSON array of objects keyed by column name
    pub fn to_json(&self) -> String {
        let objects: Vec<serde_json::Value> = self
            .rows
            .iter()
            .map(|row| {
                let mut object = serde_json::Map::new();
                for (i, column) in self.columns.iter().enumerate() {
                    let value = match row[i] {
                        Some(id) => serde_json::Value::String(self.terms.render(id)),
                        None => serde_json::Value::Null,
                    };
                    object.insert(column.clone(), value);
                }
                serde_json::Value::Object(object)
            })
            .collect();
        serde_json::to_string(&objects).unwrap_or_else(|_| "[]".to_string())
    }
}

/// Query engine configuration
#[derive(Debug, Clone)]
pub struct QueryConfig {
    /// Plan cache capacity
    pub plan_cache_size: usize,
    /// Hard cap on intermediate result rows; joins truncate beyond it
    pub max_results: Option<usize>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        QueryConfig {
            plan_cache_size: 256,
            max_results: None,
        }
    }
}

/// Execution statistics
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryEngineStats {
    pub queries: u64,
    pub plan_cache_hits: u64,
    pub plan_cache_misses: u64,
}

/// Snapshot-reading query engine
pub struct QueryEngine {
    terms: Arc<TermStore>,
    events: Arc<EventLog>,
    config: QueryConfig,
    plans: Mutex<LruCache<u64, Arc<PlanSkeleton>>>,
    stats: Mutex<QueryEngineStats>,
}

impl QueryEngine {
    /// Create an engine bound to a term store and event log
    pub fn new(terms: Arc<TermStore>, events: Arc<EventLog>, config: QueryConfig) -> Self {
        let capacity = NonZeroUsize::new(config.plan_cache_size.max(1))
            .expect("cache size is at least one");
        QueryEngine {
            terms,
            events,
            config,
            plans: Mutex::new(LruCache::new(capacity)),
            stats: Mutex::new(QueryEngineStats::default()),
        }
    }

    /// Execute a SELECT query against a snapshot
    pub fn select(
        &self,
        store: &FactStore,
        snapshot: Snapshot,
        query: &Query,
    ) -> RlResult<Table> {
        if query.select.is_empty() {
            return Err(RlError::InvalidQuery("empty select list".to_string()));
        }
        let compiled = CompiledQuery::compile(query, &self.terms, &self.events)?;
        let skeleton = self.skeleton_for(query, &compiled, store);
        let rows = exec::execute(&compiled, &skeleton, store, snapshot, &self.config, &self.terms);
        let columns = query.select.clone();
        Ok(Table::new(columns, rows, Arc::clone(&self.terms)))
    }

    /// Execute a query and report whether any solution exists
    pub fn ask(&self, store: &FactStore, snapshot: Snapshot, query: &Query) -> RlResult<bool> {
        let mut probe = query.clone();
        probe.limit = Some(1);
        probe.order_by.clear();
        Ok(!self.select(store, snapshot, &probe)?.is_empty())
    }

    /// All triples mentioning a term as subject or object
    pub fn describe(&self, store: &FactStore, snapshot: Snapshot, term: TermId) -> Table {
        let mut rows: Vec<Vec<Option<TermId>>> = Vec::new();
        for tid in store.select_at(Some(term), None, None, snapshot) {
            let t = store.triple(tid);
            rows.push(vec![Some(t.subject), Some(t.predicate), Some(t.object)]);
        }
        for tid in store.select_at(None, None, Some(term), snapshot) {
            let t = store.triple(tid);
            // Self-loops already appeared in the subject pass.
            if t.subject == term {
                continue;
            }
            rows.push(vec![Some(t.subject), Some(t.predicate), Some(t.object)]);
        }
        Table::new(
            vec![
                "subject".to_string(),
                "predicate".to_string(),
                "object".to_string(),
            ],
            rows,
            Arc::clone(&self.terms),
        )
    }

    /// Execution statistics so far
    pub fn stats(&self) -> QueryEngineStats {
        *self.stats.lock()
    }

    fn skeleton_for(
        &self,
        query: &Query,
        compiled: &CompiledQuery,
        store: &FactStore,
    ) -> Arc<PlanSkeleton> {
        let fingerprint = plan::fingerprint(query);
        let mut stats = self.stats.lock();
        stats.queries += 1;
        let mut plans = self.plans.lock();
        if let Some(skeleton) = plans.get(&fingerprint) {
            stats.plan_cache_hits += 1;
            return Arc::clone(skeleton);
        }
        stats.plan_cache_misses += 1;
        let skeleton = Arc::new(PlanSkeleton::build(compiled, store));
        plans.put(fingerprint, Arc::clone(&skeleton));
        skeleton
    }
}
