//! Query compilation: constant resolution, validation, plan skeletons
//!
//! Compilation resolves surface constants against the term store without
//! interning them, assigns every variable a dense slot, and validates the
//! structure (select and order variables must be bound by a positive
//! pattern, never only by a MINUS body). The plan skeleton is the part
//! worth caching: the greedy join order per group, keyed by a structural
//! fingerprint that ignores which constants the query mentions.

use super::{CompareOp, FilterExpr, FilterValue, Query, QueryTerm, SortDirection, TriplePattern};
use crate::error::{EventLog, ReasonerEvent, RlError, RlResult};
use crate::facts::FactStore;
use crate::terms::{TermId, TermStore};
use hashbrown::HashSet;
use indexmap::IndexMap;
use std::hash::{DefaultHasher, Hash, Hasher};

/// A compiled pattern slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CSlot {
    Const(TermId),
    Var(u16),
    /// Constant that was never interned; the pattern matches nothing
    Unknown,
}

impl CSlot {
    pub(crate) fn var(&self) -> Option<u16> {
        match self {
            CSlot::Var(v) => Some(*v),
            _ => None,
        }
    }

    pub(crate) fn constant(&self) -> Option<TermId> {
        match self {
            CSlot::Const(c) => Some(*c),
            _ => None,
        }
    }
}

/// A compiled triple pattern
#[derive(Debug, Clone, Copy)]
pub(crate) struct CPattern {
    pub s: CSlot,
    pub p: CSlot,
    pub o: CSlot,
}

impl CPattern {
    pub(crate) fn vars(&self) -> Vec<u16> {
        let mut out = Vec::new();
        for slot in [self.s, self.p, self.o] {
            if let CSlot::Var(v) = slot {
                if !out.contains(&v) {
                    out.push(v);
                }
            }
        }
        out
    }

    pub(crate) fn has_unknown(&self) -> bool {
        matches!(self.s, CSlot::Unknown)
            || matches!(self.p, CSlot::Unknown)
            || matches!(self.o, CSlot::Unknown)
    }
}

/// A compiled filter operand
#[derive(Debug, Clone, Copy)]
pub(crate) enum CValue {
    Var(u16),
    Const(TermId),
    Unknown,
}

/// A compiled filter expression
#[derive(Debug, Clone)]
pub(crate) enum CFilter {
    Compare(CompareOp, CValue, CValue),
    Bound(u16),
    Contains(CValue, CValue),
    StartsWith(CValue, CValue),
    Regex(CValue, String),
    And(Box<CFilter>, Box<CFilter>),
    Or(Box<CFilter>, Box<CFilter>),
    Not(Box<CFilter>),
}

impl CFilter {
    /// Variable slots this filter reads
    pub(crate) fn vars(&self, out: &mut HashSet<u16>) {
        match self {
            CFilter::Compare(_, a, b)
            | CFilter::Contains(a, b)
            | CFilter::StartsWith(a, b) => {
                for value in [a, b] {
                    if let CValue::Var(v) = value {
                        out.insert(*v);
                    }
                }
            }
            CFilter::Regex(a, _) => {
                if let CValue::Var(v) = a {
                    out.insert(*v);
                }
            }
            CFilter::Bound(v) => {
                out.insert(*v);
            }
            CFilter::And(l, r) | CFilter::Or(l, r) => {
                l.vars(out);
                r.vars(out);
            }
            CFilter::Not(inner) => inner.vars(out),
        }
    }
}

/// Fully compiled query, slot-indexed
#[derive(Debug)]
pub(crate) struct CompiledQuery {
    pub var_count: u16,
    pub base: Vec<CPattern>,
    pub unions: Vec<Vec<Vec<CPattern>>>,
    pub minuses: Vec<Vec<CPattern>>,
    pub filters: Vec<CFilter>,
    pub select: Vec<u16>,
    pub order_by: Vec<(u16, SortDirection)>,
    pub distinct: bool,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl CompiledQuery {
    /// Compile and validate a surface query
    pub(crate) fn compile(
        query: &Query,
        terms: &TermStore,
        events: &EventLog,
    ) -> RlResult<CompiledQuery> {
        let mut vars: IndexMap<String, u16> = IndexMap::new();
        let mut positive: HashSet<u16> = HashSet::new();

        let mut compile_group = |patterns: &[TriplePattern],
                                 vars: &mut IndexMap<String, u16>,
                                 positive: Option<&mut HashSet<u16>>|
         -> Vec<CPattern> {
            let mut positive = positive;
            patterns
                .iter()
                .map(|p| {
                    let compiled = CPattern {
                        s: compile_slot(&p.subject, terms, events, vars),
                        p: compile_slot(&p.predicate, terms, events, vars),
                        o: compile_slot(&p.object, terms, events, vars),
                    };
                    if let Some(positive) = positive.as_deref_mut() {
                        positive.extend(compiled.vars());
                    }
                    compiled
                })
                .collect()
        };

        let base = compile_group(&query.patterns, &mut vars, Some(&mut positive));
        let unions: Vec<Vec<Vec<CPattern>>> = query
            .unions
            .iter()
            .map(|block| {
                block
                    .iter()
                    .map(|branch| compile_group(&branch.patterns, &mut vars, Some(&mut positive)))
                    .collect()
            })
            .collect();
        let minuses: Vec<Vec<CPattern>> = query
            .minuses
            .iter()
            .map(|group| compile_group(&group.patterns, &mut vars, None))
            .collect();

        let filters: Vec<CFilter> = query
            .filters
            .iter()
            .map(|f| compile_filter(f, terms, events, &mut vars))
            .collect();

        let mut select = Vec::with_capacity(query.select.len());
        for name in &query.select {
            let slot = vars.get(name).copied().ok_or_else(|| {
                RlError::InvalidQuery(format!("select variable ?{} is not used anywhere", name))
            })?;
            if !positive.contains(&slot) {
                return Err(RlError::InvalidQuery(format!(
                    "select variable ?{} appears only in a MINUS group",
                    name
                )));
            }
            select.push(slot);
        }
        let mut order_by = Vec::with_capacity(query.order_by.len());
        for (name, direction) in &query.order_by {
            let slot = vars.get(name).copied().ok_or_else(|| {
                RlError::InvalidQuery(format!("order variable ?{} is not used anywhere", name))
            })?;
            if !positive.contains(&slot) {
                return Err(RlError::InvalidQuery(format!(
                    "order variable ?{} appears only in a MINUS group",
                    name
                )));
            }
            order_by.push((slot, *direction));
        }

        Ok(CompiledQuery {
            var_count: vars.len() as u16,
            base,
            unions,
            minuses,
            filters,
            select,
            order_by,
            distinct: query.distinct,
            limit: query.limit,
            offset: query.offset,
        })
    }
}

fn compile_slot(
    term: &QueryTerm,
    terms: &TermStore,
    events: &EventLog,
    vars: &mut IndexMap<String, u16>,
) -> CSlot {
    match term {
        QueryTerm::Var(name) => {
            let next = vars.len() as u16;
            CSlot::Var(*vars.entry(name.clone()).or_insert(next))
        }
        QueryTerm::Iri(text) => match terms.peek_name(text) {
            Some(id) => CSlot::Const(id),
            None => {
                events.record(ReasonerEvent::UnknownTerm { text: text.clone() });
                CSlot::Unknown
            }
        },
        QueryTerm::Literal { lexical, datatype } => {
            match terms.peek_literal(lexical, datatype.as_deref()) {
                Some(id) => CSlot::Const(id),
                None => {
                    events.record(ReasonerEvent::UnknownTerm {
                        text: lexical.clone(),
                    });
                    CSlot::Unknown
                }
            }
        }
    }
}

fn compile_value(
    value: &FilterValue,
    terms: &TermStore,
    events: &EventLog,
    vars: &mut IndexMap<String, u16>,
) -> CValue {
    match value {
        FilterValue::Var(name) => {
            let next = vars.len() as u16;
            CValue::Var(*vars.entry(name.clone()).or_insert(next))
        }
        FilterValue::Iri(text) => match terms.peek_name(text) {
            Some(id) => CValue::Const(id),
            None => {
                events.record(ReasonerEvent::UnknownTerm { text: text.clone() });
                CValue::Unknown
            }
        },
        // Filter literals are interned rather than probed: their value
        // semantics do not depend on the literal occurring in the store.
        FilterValue::Literal { lexical, datatype } => {
            CValue::Const(terms.intern_literal(lexical, datatype.as_deref()))
        }
    }
}

fn compile_filter(
    filter: &FilterExpr,
    terms: &TermStore,
    events: &EventLog,
    vars: &mut IndexMap<String, u16>,
) -> CFilter {
    match filter {
        FilterExpr::Compare(op, a, b) => CFilter::Compare(
            *op,
            compile_value(a, terms, events, vars),
            compile_value(b, terms, events, vars),
        ),
        FilterExpr::Bound(name) => {
            let next = vars.len() as u16;
            CFilter::Bound(*vars.entry(name.clone()).or_insert(next))
        }
        FilterExpr::Contains(a, b) => CFilter::Contains(
            compile_value(a, terms, events, vars),
            compile_value(b, terms, events, vars),
        ),
        FilterExpr::StartsWith(a, b) => CFilter::StartsWith(
            compile_value(a, terms, events, vars),
            compile_value(b, terms, events, vars),
        ),
        FilterExpr::Regex(a, pattern) => {
            CFilter::Regex(compile_value(a, terms, events, vars), pattern.clone())
        }
        FilterExpr::And(l, r) => CFilter::And(
            Box::new(compile_filter(l, terms, events, vars)),
            Box::new(compile_filter(r, terms, events, vars)),
        ),
        FilterExpr::Or(l, r) => CFilter::Or(
            Box::new(compile_filter(l, terms, events, vars)),
            Box::new(compile_filter(r, terms, events, vars)),
        ),
        FilterExpr::Not(inner) => CFilter::Not(Box::new(compile_filter(inner, terms, events, vars))),
    }
}

/// Cached part of a plan: greedy join orders per group
#[derive(Debug)]
pub(crate) struct PlanSkeleton {
    pub base_order: Vec<usize>,
    pub union_orders: Vec<Vec<Vec<usize>>>,
    pub minus_orders: Vec<Vec<usize>>,
}

impl PlanSkeleton {
    /// Greedy ordering: seed with the smallest-cardinality pattern, then
    /// repeatedly take the cheapest pattern sharing a variable with the
    /// accumulated binding set; disconnected patterns (cross products)
    /// come last
    pub(crate) fn build(compiled: &CompiledQuery, store: &FactStore) -> PlanSkeleton {
        PlanSkeleton {
            base_order: order_patterns(&compiled.base, store),
            union_orders: compiled
                .unions
                .iter()
                .map(|block| {
                    block
                        .iter()
                        .map(|branch| order_patterns(branch, store))
                        .collect()
                })
                .collect(),
            minus_orders: compiled
                .minuses
                .iter()
                .map(|group| order_patterns(group, store))
                .collect(),
        }
    }
}

fn order_patterns(patterns: &[CPattern], store: &FactStore) -> Vec<usize> {
    let mut remaining: Vec<usize> = (0..patterns.len()).collect();
    let mut order = Vec::with_capacity(patterns.len());
    let mut bound: HashSet<u16> = HashSet::new();
    while !remaining.is_empty() {
        let pick = remaining
            .iter()
            .enumerate()
            .min_by_key(|(_, &idx)| {
                let pattern = &patterns[idx];
                let shares = !bound.is_empty()
                    && pattern.vars().iter().any(|v| bound.contains(v));
                let estimate = store.estimate(
                    pattern.s.constant(),
                    pattern.p.constant(),
                    pattern.o.constant(),
                );
                // Connected patterns first, cheaper patterns first.
                (if shares || bound.is_empty() { 0 } else { 1 }, estimate)
            })
            .map(|(pos, _)| pos)
            .expect("remaining is non-empty");
        let idx = remaining.remove(pick);
        bound.extend(patterns[idx].vars());
        order.push(idx);
    }
    order
}

/// Structural fingerprint: variables renamed to first-occurrence ordinals,
/// constants reduced to position markers
pub(crate) fn fingerprint(query: &Query) -> u64 {
    let mut hasher = DefaultHasher::new();
    let mut names: IndexMap<String, usize> = IndexMap::new();
    let mut slot = |term: &QueryTerm, hasher: &mut DefaultHasher, names: &mut IndexMap<String, usize>| {
        match term {
            QueryTerm::Var(name) => {
                let next = names.len();
                let ordinal = *names.entry(name.clone()).or_insert(next);
                0u8.hash(hasher);
                ordinal.hash(hasher);
            }
            QueryTerm::Iri(_) => 1u8.hash(hasher),
            QueryTerm::Literal { .. } => 2u8.hash(hasher),
        }
    };
    let mut group = |patterns: &[TriplePattern],
                     hasher: &mut DefaultHasher,
                     names: &mut IndexMap<String, usize>| {
        patterns.len().hash(hasher);
        for pattern in patterns {
            slot(&pattern.subject, hasher, names);
            slot(&pattern.predicate, hasher, names);
            slot(&pattern.object, hasher, names);
        }
    };
    group(&query.patterns, &mut hasher, &mut names);
    query.unions.len().hash(&mut hasher);
    for block in &query.unions {
        block.len().hash(&mut hasher);
        for branch in block {
            group(&branch.patterns, &mut hasher, &mut names);
        }
    }
    query.minuses.len().hash(&mut hasher);
    for minus in &query.minuses {
        group(&minus.patterns, &mut hasher, &mut names);
    }
    query.filters.len().hash(&mut hasher);
    query.distinct.hash(&mut hasher);
    query.order_by.len().hash(&mut hasher);
    hasher.finish()
}
