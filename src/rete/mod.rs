//! RETE discrimination network
//!
//! Productions compile into a network of three node kinds:
//!
//! - **Alpha nodes** filter single triple patterns. They are shared across
//!   productions by canonical pattern shape and keep their matches in a
//!   bit set over row ids.
//! - **Join nodes** combine a partial binding tuple (left input) with an
//!   alpha memory (right input) over the shared variables, with one hash
//!   index per side. Joins are multiset-semantics: duplicate tuples fire
//!   duplicately, which is what makes counting-based invalidation exact.
//! - **Builtin nodes** evaluate pure predicates and functions over bound
//!   variables; a failing predicate drops the tuple, arithmetic builtins
//!   may bind an output variable.
//!
//! Terminal nodes instantiate consequent templates and emit derive/undo
//! effects; the [`driver`] applies them to the fact store and pumps the
//! resulting deltas back in until quiescence. Beta chains are left-deep in
//! the order the compiler supplied; the network never re-plans.

pub mod driver;

use crate::compiler::{BuiltinArg, BuiltinCall, BuiltinOp, Pattern, PatternSlot, Production, ProductionId};
use crate::constants::xsd;
use crate::error::{EventLog, ReasonerEvent};
use crate::facts::{FactStore, Triple, TripleId};
use crate::terms::{LiteralValue, TermId, TermStore};
use bit_set::BitSet;
use hashbrown::{HashMap, HashSet};
use indexmap::IndexMap;
use log::trace;
use smallvec::SmallVec;
use std::cmp::Ordering;

/// Propagation direction of a delta
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Plus,
    Minus,
}

/// A partial binding tuple flowing through the network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Slot-indexed bindings; unbound slots hold the sentinel
    bindings: SmallVec<[TermId; 8]>,
    /// Rows this tuple was built from, in join order
    premises: SmallVec<[TripleId; 4]>,
}

/// Deferred store mutation produced by a terminal firing
#[derive(Debug, Clone)]
pub enum Effect {
    Derive {
        triple: Triple,
        production: ProductionId,
        premises: SmallVec<[TripleId; 4]>,
    },
    Undo {
        triple: Triple,
        production: ProductionId,
        premises: SmallVec<[TripleId; 4]>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct AlphaId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeRef {
    Join(u32),
    Builtin(u32),
    Terminal(u32),
}

/// First-pattern use of an alpha node: tokens are seeded straight from the
/// triple and handed to the chain entry
#[derive(Debug, Clone, Copy)]
struct Seed {
    pattern: Pattern,
    var_count: u16,
    target: NodeRef,
}

#[derive(Debug)]
struct AlphaNode {
    /// Canonical shape (variables renumbered by first occurrence)
    shape: Pattern,
    memory: BitSet,
    seeds: Vec<Seed>,
    rights: Vec<u32>,
}

type JoinKey = SmallVec<[TermId; 2]>;

#[derive(Debug)]
struct JoinNode {
    right_alpha: AlphaId,
    /// Production-local pattern for extracting right-side bindings
    right_pattern: Pattern,
    /// Variable slots shared between the two sides
    shared: SmallVec<[u16; 2]>,
    var_count: u16,
    left_index: HashMap<JoinKey, Vec<Token>>,
    right_index: HashMap<JoinKey, Vec<TripleId>>,
    successors: SmallVec<[NodeRef; 2]>,
}

#[derive(Debug, Clone)]
struct BuiltinNode {
    call: BuiltinCall,
    successors: SmallVec<[NodeRef; 2]>,
}

#[derive(Debug)]
struct TerminalNode {
    production: ProductionId,
    rhs: Vec<Pattern>,
}

/// The compiled discrimination network of one reasoner
#[derive(Debug, Default)]
pub struct ReteNetwork {
    alphas: Vec<AlphaNode>,
    joins: Vec<JoinNode>,
    builtins: Vec<BuiltinNode>,
    terminals: Vec<TerminalNode>,
    alpha_by_shape: HashMap<Pattern, AlphaId>,
    /// Discrimination on the constant predicate slot
    by_predicate: HashMap<TermId, Vec<AlphaId>>,
    /// Alphas whose predicate slot is a variable
    wildcard_predicate: Vec<AlphaId>,
    productions: IndexMap<ProductionId, Production>,
}

impl ReteNetwork {
    /// Create an empty network
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of installed productions
    pub fn production_count(&self) -> usize {
        self.productions.len()
    }

    /// Clear all memories and indices, keeping the compiled structure
    ///
    /// Used when the store is rebuilt by replay.
    pub fn reset(&mut self) {
        for alpha in &mut self.alphas {
            alpha.memory.clear();
        }
        for join in &mut self.joins {
            join.left_index.clear();
            join.right_index.clear();
        }
    }

    /// Install a production and retroactively match it against the store
    ///
    /// Existing rows flow through the new chain immediately; the resulting
    /// derive effects are appended for the driver to apply.
    pub fn add_production(
        &mut self,
        production: Production,
        store: &FactStore,
        terms: &TermStore,
        events: &EventLog,
        effects: &mut Vec<Effect>,
    ) {
        let n = production.lhs.len();
        debug_assert!(n > 0, "production with empty body");
        let alpha_ids: Vec<AlphaId> = production
            .lhs
            .iter()
            .map(|pat| self.alpha_for(*pat, store))
            .collect();

        // Builtin placement: earliest stage at which all inputs are bound.
        let mut stage_builtins: Vec<Vec<BuiltinCall>> = vec![Vec::new(); n];
        {
            let mut bound: HashSet<u16> = HashSet::new();
            let mut pending: Vec<BuiltinCall> = production.builtins.clone();
            for (i, pattern) in production.lhs.iter().enumerate() {
                bound.extend(pattern.vars());
                let mut placed_any = true;
                while placed_any {
                    placed_any = false;
                    if let Some(pos) = pending
                        .iter()
                        .position(|c| c.input_vars().iter().all(|v| bound.contains(v)))
                    {
                        let call = pending.remove(pos);
                        if let Some(out) = call.output {
                            bound.insert(out);
                        }
                        stage_builtins[i].push(call);
                        placed_any = true;
                    }
                }
            }
            debug_assert!(pending.is_empty(), "unplaceable builtin survived compilation");
            // A leftover would silently drop firings; keep it at the end.
            stage_builtins[n - 1].extend(pending);
        }

        // Bound variable set before each join stage, for shared-key wiring.
        let mut bound_before: Vec<HashSet<u16>> = Vec::with_capacity(n);
        {
            let mut bound: HashSet<u16> = HashSet::new();
            for (i, pattern) in production.lhs.iter().enumerate() {
                bound_before.push(bound.clone());
                bound.extend(pattern.vars());
                for call in &stage_builtins[i] {
                    if let Some(out) = call.output {
                        bound.insert(out);
                    }
                }
            }
        }

        let terminal_index = self.terminals.len() as u32;
        self.terminals.push(TerminalNode {
            production: production.id,
            rhs: production.rhs.clone(),
        });

        // Wire the chain back to front so each node knows its successor.
        let mut next_entry = NodeRef::Terminal(terminal_index);
        for i in (0..n).rev() {
            for call in stage_builtins[i].iter().rev() {
                let builtin_index = self.builtins.len() as u32;
                self.builtins.push(BuiltinNode {
                    call: call.clone(),
                    successors: SmallVec::from_slice(&[next_entry]),
                });
                next_entry = NodeRef::Builtin(builtin_index);
            }
            if i == 0 {
                self.alphas[alpha_ids[0].0 as usize].seeds.push(Seed {
                    pattern: production.lhs[0],
                    var_count: production.var_count,
                    target: next_entry,
                });
            } else {
                let pattern = production.lhs[i];
                let shared: SmallVec<[u16; 2]> = pattern
                    .vars()
                    .into_iter()
                    .filter(|v| bound_before[i].contains(v))
                    .collect();
                let join_index = self.joins.len() as u32;
                self.joins.push(JoinNode {
                    right_alpha: alpha_ids[i],
                    right_pattern: pattern,
                    shared,
                    var_count: production.var_count,
                    left_index: HashMap::new(),
                    right_index: HashMap::new(),
                    successors: SmallVec::from_slice(&[next_entry]),
                });
                self.alphas[alpha_ids[i].0 as usize].rights.push(join_index);
                next_entry = NodeRef::Join(join_index);
            }
        }

        // Seed the new joins' right indices from their alpha memories, then
        // replay the first alpha's memory through the chain. The walk skips
        // over builtin nodes sitting between joins.
        let mut cursor = next_entry;
        loop {
            match cursor {
                NodeRef::Join(ji) => {
                    let (right_alpha, right_pattern, shared, var_count) = {
                        let join = &self.joins[ji as usize];
                        (
                            join.right_alpha,
                            join.right_pattern,
                            join.shared.clone(),
                            join.var_count,
                        )
                    };
                    let members: Vec<usize> =
                        self.alphas[right_alpha.0 as usize].memory.iter().collect();
                    for index in members {
                        let tid = TripleId(index as u32);
                        let triple = store.triple(tid);
                        if let Some(bindings) = extract(&right_pattern, triple, var_count) {
                            let key: JoinKey =
                                shared.iter().map(|v| bindings[*v as usize]).collect();
                            self.joins[ji as usize]
                                .right_index
                                .entry(key)
                                .or_default()
                                .push(tid);
                        }
                    }
                    cursor = self.joins[ji as usize].successors[0];
                }
                NodeRef::Builtin(b) => cursor = self.builtins[b as usize].successors[0],
                NodeRef::Terminal(_) => break,
            }
        }
        let seed = *self.alphas[alpha_ids[0].0 as usize]
            .seeds
            .last()
            .expect("seed just added");
        let members: Vec<usize> = self.alphas[alpha_ids[0].0 as usize].memory.iter().collect();
        for index in members {
            let tid = TripleId(index as u32);
            let triple = store.triple(tid);
            if let Some(bindings) = extract(&seed.pattern, triple, seed.var_count) {
                let token = Token {
                    bindings,
                    premises: SmallVec::from_slice(&[tid]),
                };
                self.send(seed.target, token, Sign::Plus, store, terms, events, effects);
            }
        }

        trace!(
            "installed production {:?} ({}) with {} patterns",
            production.id,
            production.label,
            n
        );
        self.productions.insert(production.id, production);
    }

    fn alpha_for(&mut self, pattern: Pattern, store: &FactStore) -> AlphaId {
        let shape = canonical_shape(&pattern);
        if let Some(id) = self.alpha_by_shape.get(&shape) {
            return *id;
        }
        let id = AlphaId(self.alphas.len() as u32);
        let mut memory = BitSet::new();
        // Retroactive match: fill the memory from the live store.
        let s = match shape.s {
            PatternSlot::Const(c) => Some(c),
            PatternSlot::Var(_) => None,
        };
        let p = match shape.p {
            PatternSlot::Const(c) => Some(c),
            PatternSlot::Var(_) => None,
        };
        let o = match shape.o {
            PatternSlot::Const(c) => Some(c),
            PatternSlot::Var(_) => None,
        };
        for tid in store.select(s, p, o) {
            if shape_matches(&shape, store.triple(tid)) {
                memory.insert(tid.index());
            }
        }
        self.alphas.push(AlphaNode {
            shape,
            memory,
            seeds: Vec::new(),
            rights: Vec::new(),
        });
        self.alpha_by_shape.insert(shape, id);
        match shape.p {
            PatternSlot::Const(predicate) => {
                self.by_predicate.entry(predicate).or_default().push(id)
            }
            PatternSlot::Var(_) => self.wildcard_predicate.push(id),
        }
        id
    }

    /// Propagate one store delta through the network
    pub fn activate(
        &mut self,
        store: &FactStore,
        terms: &TermStore,
        events: &EventLog,
        tid: TripleId,
        sign: Sign,
        effects: &mut Vec<Effect>,
    ) {
        let triple = store.triple(tid);
        let mut candidates: Vec<AlphaId> = self
            .by_predicate
            .get(&triple.predicate)
            .map(|v| v.clone())
            .unwrap_or_default();
        candidates.extend(self.wildcard_predicate.iter().copied());
        for aid in candidates {
            let alpha = &mut self.alphas[aid.0 as usize];
            if !shape_matches(&alpha.shape, triple) {
                continue;
            }
            match sign {
                Sign::Plus => {
                    if !alpha.memory.insert(tid.index()) {
                        continue;
                    }
                }
                Sign::Minus => {
                    if !alpha.memory.remove(tid.index()) {
                        continue;
                    }
                }
            }
            let seeds = alpha.seeds.clone();
            let rights = alpha.rights.clone();
            for seed in seeds {
                if let Some(bindings) = extract(&seed.pattern, triple, seed.var_count) {
                    let token = Token {
                        bindings,
                        premises: SmallVec::from_slice(&[tid]),
                    };
                    self.send(seed.target, token, sign, store, terms, events, effects);
                }
            }
            for join_index in rights {
                self.right_activate(join_index, tid, triple, sign, store, terms, events, effects);
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn right_activate(
        &mut self,
        join_index: u32,
        tid: TripleId,
        triple: Triple,
        sign: Sign,
        store: &FactStore,
        terms: &TermStore,
        events: &EventLog,
        effects: &mut Vec<Effect>,
    ) {
        let join = &mut self.joins[join_index as usize];
        let Some(bindings) = extract(&join.right_pattern, triple, join.var_count) else {
            return;
        };
        let key: JoinKey = join
            .shared
            .iter()
            .map(|v| bindings[*v as usize])
            .collect();
        match sign {
            Sign::Plus => join.right_index.entry(key.clone()).or_default().push(tid),
            Sign::Minus => {
                let Some(postings) = join.right_index.get_mut(&key) else {
                    return;
                };
                let Some(pos) = postings.iter().position(|t| *t == tid) else {
                    return;
                };
                postings.swap_remove(pos);
            }
        }
        let left_matches: Vec<Token> = join.left_index.get(&key).cloned().unwrap_or_default();
        let successors = join.successors.clone();
        for left in left_matches {
            if let Some(merged) = merge(&left, &bindings, tid) {
                for succ in &successors {
                    self.send(*succ, merged.clone(), sign, store, terms, events, effects);
                }
            }
        }
    }

    fn left_activate(
        &mut self,
        join_index: u32,
        token: Token,
        sign: Sign,
        store: &FactStore,
        terms: &TermStore,
        events: &EventLog,
        effects: &mut Vec<Effect>,
    ) {
        let join = &mut self.joins[join_index as usize];
        let key: JoinKey = join
            .shared
            .iter()
            .map(|v| token.bindings[*v as usize])
            .collect();
        match sign {
            Sign::Plus => join
                .left_index
                .entry(key.clone())
                .or_default()
                .push(token.clone()),
            Sign::Minus => {
                let Some(stored) = join.left_index.get_mut(&key) else {
                    return;
                };
                let Some(pos) = stored.iter().position(|t| *t == token) else {
                    return;
                };
                stored.swap_remove(pos);
            }
        }
        let right_matches: Vec<TripleId> =
            join.right_index.get(&key).cloned().unwrap_or_default();
        let right_pattern = join.right_pattern;
        let var_count = join.var_count;
        let successors = join.successors.clone();
        for tid in right_matches {
            let triple = store.triple(tid);
            let Some(bindings) = extract(&right_pattern, triple, var_count) else {
                continue;
            };
            if let Some(merged) = merge(&token, &bindings, tid) {
                for succ in &successors {
                    self.send(*succ, merged.clone(), sign, store, terms, events, effects);
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn send(
        &mut self,
        node: NodeRef,
        token: Token,
        sign: Sign,
        store: &FactStore,
        terms: &TermStore,
        events: &EventLog,
        effects: &mut Vec<Effect>,
    ) {
        match node {
            NodeRef::Join(j) => {
                self.left_activate(j, token, sign, store, terms, events, effects)
            }
            NodeRef::Builtin(b) => {
                let node = self.builtins[b as usize].clone();
                if let Some(out_token) = eval_builtin(&node.call, &token, terms, events) {
                    for succ in &node.successors {
                        self.send(*succ, out_token.clone(), sign, store, terms, events, effects);
                    }
                }
            }
            NodeRef::Terminal(t) => {
                let terminal = &self.terminals[t as usize];
                let mut premises = token.premises.clone();
                premises.sort_unstable();
                for template in &terminal.rhs {
                    let triple = instantiate(template, &token.bindings);
                    effects.push(match sign {
                        Sign::Plus => Effect::Derive {
                            triple,
                            production: terminal.production,
                            premises: premises.clone(),
                        },
                        Sign::Minus => Effect::Undo {
                            triple,
                            production: terminal.production,
                            premises: premises.clone(),
                        },
                    });
                }
            }
        }
    }
}

/// Renumber pattern variables by first occurrence so alpha nodes can be
/// shared across productions
fn canonical_shape(pattern: &Pattern) -> Pattern {
    let mut mapping: SmallVec<[(u16, u16); 3]> = SmallVec::new();
    let mut renumber = |slot: PatternSlot| match slot {
        PatternSlot::Const(c) => PatternSlot::Const(c),
        PatternSlot::Var(v) => {
            if let Some((_, canonical)) = mapping.iter().find(|(orig, _)| *orig == v) {
                PatternSlot::Var(*canonical)
            } else {
                let canonical = mapping.len() as u16;
                mapping.push((v, canonical));
                PatternSlot::Var(canonical)
            }
        }
    };
    Pattern::new(renumber(pattern.s), renumber(pattern.p), renumber(pattern.o))
}

/// Test a triple against a pattern, honouring repeated variables
fn shape_matches(pattern: &Pattern, triple: Triple) -> bool {
    extract(pattern, triple, 3).is_some()
}

/// Extract slot bindings for a pattern match, or `None` on mismatch
fn extract(pattern: &Pattern, triple: Triple, var_count: u16) -> Option<SmallVec<[TermId; 8]>> {
    let mut bindings: SmallVec<[TermId; 8]> =
        SmallVec::from_elem(TermId::UNBOUND, var_count as usize);
    for (slot, value) in [
        (pattern.s, triple.subject),
        (pattern.p, triple.predicate),
        (pattern.o, triple.object),
    ] {
        match slot {
            PatternSlot::Const(c) => {
                if c != value {
                    return None;
                }
            }
            PatternSlot::Var(v) => {
                let existing = bindings[v as usize];
                if existing == TermId::UNBOUND {
                    bindings[v as usize] = value;
                } else if existing != value {
                    return None;
                }
            }
        }
    }
    Some(bindings)
}

/// Merge a left token with right-side bindings; `None` on conflict
fn merge(left: &Token, right: &[TermId], tid: TripleId) -> Option<Token> {
    let mut bindings = left.bindings.clone();
    for (i, value) in right.iter().enumerate() {
        if *value == TermId::UNBOUND {
            continue;
        }
        let existing = bindings[i];
        if existing == TermId::UNBOUND {
            bindings[i] = *value;
        } else if existing != *value {
            return None;
        }
    }
    let mut premises = left.premises.clone();
    premises.push(tid);
    Some(Token { bindings, premises })
}

/// Instantiate a consequent template under complete bindings
fn instantiate(template: &Pattern, bindings: &[TermId]) -> Triple {
    let resolve = |slot: PatternSlot| match slot {
        PatternSlot::Const(c) => c,
        PatternSlot::Var(v) => bindings[v as usize],
    };
    Triple::new(
        resolve(template.s),
        resolve(template.p),
        resolve(template.o),
    )
}

/// Evaluate a builtin over a token
///
/// Comparison failures drop the token silently; incomparable literal
/// operands additionally record a `LiteralTypeError` event, mirroring
/// SPARQL's error-in-filter semantics.
fn eval_builtin(
    call: &BuiltinCall,
    token: &Token,
    terms: &TermStore,
    events: &EventLog,
) -> Option<Token> {
    let resolve = |arg: &BuiltinArg| -> TermId {
        match arg {
            BuiltinArg::Const(c) => *c,
            BuiltinArg::Var(v) => token.bindings[*v as usize],
        }
    };
    let type_error = |detail: String| {
        events.record(ReasonerEvent::LiteralTypeError {
            builtin: call.op.name().to_string(),
            detail,
        });
    };
    match call.op {
        BuiltinOp::Equal
        | BuiltinOp::NotEqual
        | BuiltinOp::Less
        | BuiltinOp::LessOrEqual
        | BuiltinOp::Greater
        | BuiltinOp::GreaterOrEqual => {
            let a = resolve(&call.args[0]);
            let b = resolve(&call.args[1]);
            let ordering = if a.is_literal_id() && b.is_literal_id() {
                match terms.cmp_literal(a, b) {
                    Some(ord) => ord,
                    None => {
                        type_error(format!(
                            "incomparable operands {} / {}",
                            terms.render(a),
                            terms.render(b)
                        ));
                        return None;
                    }
                }
            } else if a == b {
                Ordering::Equal
            } else if matches!(call.op, BuiltinOp::Equal | BuiltinOp::NotEqual) {
                Ordering::Less
            } else {
                type_error("ordering comparison over named terms".to_string());
                return None;
            };
            let pass = match call.op {
                BuiltinOp::Equal => ordering == Ordering::Equal,
                BuiltinOp::NotEqual => ordering != Ordering::Equal,
                BuiltinOp::Less => ordering == Ordering::Less,
                BuiltinOp::LessOrEqual => ordering != Ordering::Greater,
                BuiltinOp::Greater => ordering == Ordering::Greater,
                BuiltinOp::GreaterOrEqual => ordering != Ordering::Less,
                _ => unreachable!(),
            };
            pass.then(|| token.clone())
        }
        BuiltinOp::Add | BuiltinOp::Subtract | BuiltinOp::Multiply | BuiltinOp::Divide => {
            let a = literal_number(terms, resolve(&call.args[0]))?;
            let b = literal_number(terms, resolve(&call.args[1]))?;
            let result = match call.op {
                BuiltinOp::Add => a + b,
                BuiltinOp::Subtract => a - b,
                BuiltinOp::Multiply => a * b,
                BuiltinOp::Divide => {
                    if b == 0.0 {
                        type_error("division by zero".to_string());
                        return None;
                    }
                    a / b
                }
                _ => unreachable!(),
            };
            let result_id = if result.fract() == 0.0 && result.abs() < i64::MAX as f64 {
                terms.intern_literal(&format!("{}", result as i64), Some(xsd::INTEGER))
            } else {
                terms.intern_literal(&format!("{}", result), Some(xsd::DOUBLE))
            };
            bind_output(call, token, result_id)
        }
        BuiltinOp::StringLength => {
            let text = literal_text(terms, resolve(&call.args[0]))?;
            let result_id =
                terms.intern_literal(&text.chars().count().to_string(), Some(xsd::INTEGER));
            bind_output(call, token, result_id)
        }
        BuiltinOp::Contains | BuiltinOp::StartsWith => {
            let haystack = literal_text(terms, resolve(&call.args[0]))?;
            let needle = literal_text(terms, resolve(&call.args[1]))?;
            let pass = match call.op {
                BuiltinOp::Contains => haystack.contains(&needle),
                BuiltinOp::StartsWith => haystack.starts_with(&needle),
                _ => unreachable!(),
            };
            pass.then(|| token.clone())
        }
        BuiltinOp::Matches => {
            let text = literal_text(terms, resolve(&call.args[0]))?;
            let pattern = literal_text(terms, resolve(&call.args[1]))?;
            match regex::Regex::new(&pattern) {
                Ok(re) => re.is_match(&text).then(|| token.clone()),
                Err(err) => {
                    type_error(format!("invalid regex '{}': {}", pattern, err));
                    None
                }
            }
        }
    }
}

/// Bind a builtin result into the output slot, or check it against an
/// already bound value
fn bind_output(call: &BuiltinCall, token: &Token, result: TermId) -> Option<Token> {
    let out = call.output?;
    let existing = token.bindings[out as usize];
    if existing == TermId::UNBOUND {
        let mut bound = token.clone();
        bound.bindings[out as usize] = result;
        Some(bound)
    } else if existing == result {
        Some(token.clone())
    } else {
        None
    }
}

fn literal_number(terms: &TermStore, id: TermId) -> Option<f64> {
    match terms.literal_value(id)? {
        LiteralValue::Integer(v) => Some(v as f64),
        LiteralValue::Decimal { unscaled, scale } => {
            Some(unscaled as f64 / 10f64.powi(scale as i32))
        }
        LiteralValue::Double(v) => Some(v),
        _ => None,
    }
}

fn literal_text(terms: &TermStore, id: TermId) -> Option<String> {
    match terms.lookup(id)? {
        crate::terms::Term::Literal(lit) => Some(lit.lexical().to_string()),
        crate::terms::Term::Named(iri) => Some(iri.to_string()),
    }
}
