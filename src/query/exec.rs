//! Query execution: hash joins, filters, UNION/MINUS, solution modifiers
//!
//! All execution works over slot-indexed binding rows with an unbound
//! sentinel, so UNION branches that bind different variable subsets
//! concatenate without column shuffling. Joins are pairwise hash joins on
//! the shared bound variables; a missing shared variable is an explicit
//! cross product. Filters run as soon as their variables are bound.

use super::plan::{CFilter, CPattern, CSlot, CValue, CompiledQuery, PlanSkeleton};
use super::{CompareOp, QueryConfig, SortDirection};
use crate::facts::{FactStore, Snapshot, Triple};
use crate::terms::{TermId, TermStore};
use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;
use std::cmp::Ordering;

type Bindings = SmallVec<[TermId; 8]>;
type Key = SmallVec<[TermId; 2]>;

/// An intermediate relation: full-width rows plus the set of slots any row
/// may bind
pub(crate) struct Relation {
    pub rows: Vec<Bindings>,
    pub bound: Vec<bool>,
}

impl Relation {
    fn unit(width: usize) -> Relation {
        Relation {
            rows: vec![SmallVec::from_elem(TermId::UNBOUND, width)],
            bound: vec![false; width],
        }
    }

    fn empty(width: usize) -> Relation {
        Relation {
            rows: Vec::new(),
            bound: vec![false; width],
        }
    }
}

/// Run a compiled query to projected result rows
pub(crate) fn execute(
    compiled: &CompiledQuery,
    skeleton: &PlanSkeleton,
    store: &FactStore,
    snapshot: Snapshot,
    config: &QueryConfig,
    terms: &TermStore,
) -> Vec<Vec<Option<TermId>>> {
    let width = compiled.var_count as usize;
    let mut applied = vec![false; compiled.filters.len()];

    let mut rel = eval_patterns(
        &compiled.base,
        &skeleton.base_order,
        store,
        snapshot,
        width,
        config,
        terms,
        Some((&compiled.filters, &mut applied)),
    );

    // Each UNION block evaluates independently, then joins with the outer
    // patterns and with the blocks already folded in. Short-circuiting on
    // the first block would lose cross-block constraints.
    for (block_index, block) in compiled.unions.iter().enumerate() {
        let mut block_rel = Relation::empty(width);
        for (branch, order) in block.iter().zip(&skeleton.union_orders[block_index]) {
            let branch_rel =
                eval_patterns(branch, order, store, snapshot, width, config, terms, None);
            for (slot, bound) in branch_rel.bound.iter().enumerate() {
                if *bound {
                    block_rel.bound[slot] = true;
                }
            }
            block_rel.rows.extend(branch_rel.rows);
        }
        rel = join_relations(rel, block_rel, config);
        apply_ready_filters(&mut rel, &compiled.filters, &mut applied, terms);
    }

    for (minus_index, group) in compiled.minuses.iter().enumerate() {
        let minus_rel = eval_patterns(
            group,
            &skeleton.minus_orders[minus_index],
            store,
            snapshot,
            width,
            config,
            terms,
            None,
        );
        apply_minus(&mut rel, &minus_rel);
    }

    // Any filter still pending (its variables were never all bound) fails
    // every row, per SPARQL error semantics.
    for (index, filter) in compiled.filters.iter().enumerate() {
        if !applied[index] {
            rel.rows
                .retain(|row| eval_filter(filter, row, terms) == Some(true));
            applied[index] = true;
        }
    }

    // Modifiers apply in fixed order: DISTINCT, ORDER BY, OFFSET, LIMIT.
    let mut rows = rel.rows;
    if compiled.distinct {
        let mut seen: HashSet<Vec<TermId>> = HashSet::with_capacity(rows.len());
        rows.retain(|row| {
            let key: Vec<TermId> = compiled
                .select
                .iter()
                .map(|slot| row[*slot as usize])
                .collect();
            seen.insert(key)
        });
    }
    if !compiled.order_by.is_empty() {
        rows.sort_by(|a, b| {
            for (slot, direction) in &compiled.order_by {
                let ordering = compare_cells(a[*slot as usize], b[*slot as usize], terms);
                let ordering = match direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });
    }
    let offset = compiled.offset.unwrap_or(0);
    let rows = rows.into_iter().skip(offset);
    let rows: Vec<Bindings> = match compiled.limit {
        Some(limit) => rows.take(limit).collect(),
        None => rows.collect(),
    };

    rows.into_iter()
        .map(|row| {
            compiled
                .select
                .iter()
                .map(|slot| {
                    let value = row[*slot as usize];
                    if value == TermId::UNBOUND {
                        None
                    } else {
                        Some(value)
                    }
                })
                .collect()
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn eval_patterns(
    patterns: &[CPattern],
    order: &[usize],
    store: &FactStore,
    snapshot: Snapshot,
    width: usize,
    config: &QueryConfig,
    terms: &TermStore,
    mut filters: Option<(&[CFilter], &mut Vec<bool>)>,
) -> Relation {
    let mut rel = Relation::unit(width);
    for &index in order {
        let pattern = &patterns[index];
        if pattern.has_unknown() {
            return Relation::empty(width);
        }
        rel = join_pattern(rel, pattern, store, snapshot, width, config);
        if rel.rows.is_empty() {
            return rel;
        }
        if let Some((filters, applied)) = filters.as_mut() {
            apply_ready_filters(&mut rel, filters, applied, terms);
        }
    }
    rel
}

fn join_pattern(
    rel: Relation,
    pattern: &CPattern,
    store: &FactStore,
    snapshot: Snapshot,
    width: usize,
    config: &QueryConfig,
) -> Relation {
    let ids = store.select_at(
        pattern.s.constant(),
        pattern.p.constant(),
        pattern.o.constant(),
        snapshot,
    );
    let mut fact_rows: Vec<Bindings> = Vec::with_capacity(ids.len());
    for tid in ids {
        if let Some(bindings) = extract_pattern(pattern, store.triple(tid), width) {
            fact_rows.push(bindings);
        }
    }
    let shared: Vec<usize> = pattern
        .vars()
        .into_iter()
        .map(|v| v as usize)
        .filter(|v| rel.bound[*v])
        .collect();

    let mut index: HashMap<Key, Vec<usize>> = HashMap::new();
    for (i, fact) in fact_rows.iter().enumerate() {
        let key: Key = shared.iter().map(|slot| fact[*slot]).collect();
        index.entry(key).or_default().push(i);
    }

    let mut bound = rel.bound;
    for v in pattern.vars() {
        bound[v as usize] = true;
    }
    let mut rows = Vec::new();
    'outer: for row in &rel.rows {
        let key: Key = shared.iter().map(|slot| row[*slot]).collect();
        if let Some(matches) = index.get(&key) {
            for &fact_index in matches {
                if let Some(merged) = merge_rows(row, &fact_rows[fact_index]) {
                    rows.push(merged);
                    if let Some(max) = config.max_results {
                        if rows.len() >= max {
                            break 'outer;
                        }
                    }
                }
            }
        }
    }
    Relation { rows, bound }
}

fn join_relations(left: Relation, right: Relation, config: &QueryConfig) -> Relation {
    let width = left.bound.len();
    let shared: Vec<usize> = (0..width)
        .filter(|slot| left.bound[*slot] && right.bound[*slot])
        .collect();
    let mut index: HashMap<Key, Vec<usize>> = HashMap::new();
    for (i, row) in right.rows.iter().enumerate() {
        let key: Key = shared.iter().map(|slot| row[*slot]).collect();
        index.entry(key).or_default().push(i);
    }
    let mut bound = left.bound;
    for (slot, b) in right.bound.iter().enumerate() {
        if *b {
            bound[slot] = true;
        }
    }
    let mut rows = Vec::new();
    'outer: for row in &left.rows {
        let key: Key = shared.iter().map(|slot| row[*slot]).collect();
        if let Some(matches) = index.get(&key) {
            for &right_index in matches {
                if let Some(merged) = merge_rows(row, &right.rows[right_index]) {
                    rows.push(merged);
                    if let Some(max) = config.max_results {
                        if rows.len() >= max {
                            break 'outer;
                        }
                    }
                }
            }
        }
    }
    Relation { rows, bound }
}

/// Anti-join: drop rows with a compatible row in the minus relation.
/// Rows sharing no bound variable with the minus side are kept.
fn apply_minus(rel: &mut Relation, minus: &Relation) {
    if minus.rows.is_empty() {
        return;
    }
    let width = rel.bound.len();
    let shared: Vec<usize> = (0..width)
        .filter(|slot| rel.bound[*slot] && minus.bound[*slot])
        .collect();
    if shared.is_empty() {
        return;
    }
    let keys: HashSet<Key> = minus
        .rows
        .iter()
        .map(|row| shared.iter().map(|slot| row[*slot]).collect())
        .collect();
    rel.rows.retain(|row| {
        let key: Key = shared.iter().map(|slot| row[*slot]).collect();
        !keys.contains(&key)
    });
}

fn apply_ready_filters(
    rel: &mut Relation,
    filters: &[CFilter],
    applied: &mut [bool],
    terms: &TermStore,
) {
    for (index, filter) in filters.iter().enumerate() {
        if applied[index] {
            continue;
        }
        let mut needed: HashSet<u16> = HashSet::new();
        filter.vars(&mut needed);
        if needed.iter().all(|v| rel.bound[*v as usize]) {
            rel.rows
                .retain(|row| eval_filter(filter, row, terms) == Some(true));
            applied[index] = true;
        }
    }
}

fn extract_pattern(pattern: &CPattern, triple: Triple, width: usize) -> Option<Bindings> {
    let mut bindings: Bindings = SmallVec::from_elem(TermId::UNBOUND, width);
    for (slot, value) in [
        (pattern.s, triple.subject),
        (pattern.p, triple.predicate),
        (pattern.o, triple.object),
    ] {
        match slot {
            CSlot::Const(c) => {
                if c != value {
                    return None;
                }
            }
            CSlot::Var(v) => {
                let existing = bindings[v as usize];
                if existing == TermId::UNBOUND {
                    bindings[v as usize] = value;
                } else if existing != value {
                    return None;
                }
            }
            CSlot::Unknown => return None,
        }
    }
    Some(bindings)
}

fn merge_rows(left: &Bindings, right: &Bindings) -> Option<Bindings> {
    let mut merged = left.clone();
    for (slot, value) in right.iter().enumerate() {
        if *value == TermId::UNBOUND {
            continue;
        }
        let existing = merged[slot];
        if existing == TermId::UNBOUND {
            merged[slot] = *value;
        } else if existing != *value {
            return None;
        }
    }
    Some(merged)
}

fn compare_cells(a: TermId, b: TermId, terms: &TermStore) -> Ordering {
    match (a == TermId::UNBOUND, b == TermId::UNBOUND) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => terms.compare_terms(a, b),
    }
}

/// Three-valued filter evaluation; `None` is a type error and fails the row
fn eval_filter(filter: &CFilter, row: &Bindings, terms: &TermStore) -> Option<bool> {
    match filter {
        CFilter::Compare(op, a, b) => {
            let a = resolve(a, row)?;
            let b = resolve(b, row)?;
            let ordering = if a.is_literal_id() && b.is_literal_id() {
                terms.cmp_literal(a, b)?
            } else if matches!(op, CompareOp::Eq | CompareOp::Ne) {
                if a == b {
                    Ordering::Equal
                } else {
                    Ordering::Less
                }
            } else {
                return None;
            };
            Some(match op {
                CompareOp::Eq => ordering == Ordering::Equal,
                CompareOp::Ne => ordering != Ordering::Equal,
                CompareOp::Lt => ordering == Ordering::Less,
                CompareOp::Le => ordering != Ordering::Greater,
                CompareOp::Gt => ordering == Ordering::Greater,
                CompareOp::Ge => ordering != Ordering::Less,
            })
        }
        CFilter::Bound(slot) => Some(row[*slot as usize] != TermId::UNBOUND),
        CFilter::Contains(a, b) => {
            let haystack = text_of(resolve(a, row)?, terms)?;
            let needle = text_of(resolve(b, row)?, terms)?;
            Some(haystack.contains(&needle))
        }
        CFilter::StartsWith(a, b) => {
            let haystack = text_of(resolve(a, row)?, terms)?;
            let needle = text_of(resolve(b, row)?, terms)?;
            Some(haystack.starts_with(&needle))
        }
        CFilter::Regex(a, pattern) => {
            let text = text_of(resolve(a, row)?, terms)?;
            let re = regex::Regex::new(pattern).ok()?;
            Some(re.is_match(&text))
        }
        CFilter::And(l, r) => match (eval_filter(l, row, terms), eval_filter(r, row, terms)) {
            (Some(false), _) | (_, Some(false)) => Some(false),
            (Some(true), Some(true)) => Some(true),
            _ => None,
        },
        CFilter::Or(l, r) => match (eval_filter(l, row, terms), eval_filter(r, row, terms)) {
            (Some(true), _) | (_, Some(true)) => Some(true),
            (Some(false), Some(false)) => Some(false),
            _ => None,
        },
        CFilter::Not(inner) => eval_filter(inner, row, terms).map(|v| !v),
    }
}

fn resolve(value: &CValue, row: &Bindings) -> Option<TermId> {
    match value {
        CValue::Const(c) => Some(*c),
        CValue::Var(v) => {
            let bound = row[*v as usize];
            if bound == TermId::UNBOUND {
                None
            } else {
                Some(bound)
            }
        }
        CValue::Unknown => None,
    }
}

fn text_of(id: TermId, terms: &TermStore) -> Option<String> {
    match terms.lookup(id)? {
        crate::terms::Term::Literal(lit) => Some(lit.lexical().to_string()),
        crate::terms::Term::Named(iri) => Some(iri.to_string()),
    }
}
