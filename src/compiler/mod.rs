//! Axiom compiler: IR axioms to productions and ground facts
//!
//! Each axiom lowers to either direct fact assertions (ground atoms) or to
//! one or more [`Production`]s following the OWL 2 RL rule templates: an
//! atomic inclusion becomes `?x type C → ?x type D`, an existential body
//! becomes a two-pattern join, a role chain becomes a left-deep pattern
//! sequence, and so on. Forms outside the RL profile (existential heads,
//! cardinalities above one, complements in rule bodies) are refused with a
//! `NonRlAxiom` event and dropped; compilation always continues.
//!
//! Atomic class and role hierarchy axioms additionally materialise schema
//! triples (`rdfs:subClassOf`, `rdfs:subPropertyOf`) whose transitive
//! closure is maintained by two statically installed productions, so
//! subsumption queries are plain index reads.

use crate::axioms::{
    Axiom, AxiomKind, ConceptExpr, RoleRef, SwrlArg, SwrlAtom, SwrlBuiltin, SwrlRule,
};
use crate::error::{EventLog, ReasonerEvent, RlError, RlResult};
use crate::facts::Triple;
use crate::terms::{reserved, TermId, TermStore};
use hashbrown::HashSet;
use indexmap::IndexMap;
use log::debug;
use smallvec::SmallVec;
use std::sync::Arc;

/// Identifier of a compiled production
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProductionId(u32);

impl ProductionId {
    pub(crate) const fn from_raw(raw: u32) -> Self {
        ProductionId(raw)
    }

    /// Raw value for debug output
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// One slot of a pattern: an interned constant or a rule variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternSlot {
    Const(TermId),
    Var(u16),
}

impl PatternSlot {
    /// The variable index, if this slot is one
    pub fn var(&self) -> Option<u16> {
        match self {
            PatternSlot::Var(v) => Some(*v),
            PatternSlot::Const(_) => None,
        }
    }
}

/// A triple pattern over constants and variables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pattern {
    pub s: PatternSlot,
    pub p: PatternSlot,
    pub o: PatternSlot,
}

impl Pattern {
    /// Construct a pattern
    pub fn new(s: PatternSlot, p: PatternSlot, o: PatternSlot) -> Self {
        Pattern { s, p, o }
    }

    /// Variables appearing in this pattern, in slot order
    pub fn vars(&self) -> SmallVec<[u16; 3]> {
        let mut out = SmallVec::new();
        for slot in [self.s, self.p, self.o] {
            if let PatternSlot::Var(v) = slot {
                if !out.contains(&v) {
                    out.push(v);
                }
            }
        }
        out
    }
}

/// Consequent template; every variable must be bound by the LHS
pub type TripleTemplate = Pattern;

/// Builtin predicates and functions usable inside productions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinOp {
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    Add,
    Subtract,
    Multiply,
    Divide,
    StringLength,
    Contains,
    StartsWith,
    Matches,
}

impl BuiltinOp {
    fn from_swrl(builtin: SwrlBuiltin) -> Self {
        match builtin {
            SwrlBuiltin::Equal => BuiltinOp::Equal,
            SwrlBuiltin::NotEqual => BuiltinOp::NotEqual,
            SwrlBuiltin::LessThan => BuiltinOp::Less,
            SwrlBuiltin::LessThanOrEqual => BuiltinOp::LessOrEqual,
            SwrlBuiltin::GreaterThan => BuiltinOp::Greater,
            SwrlBuiltin::GreaterThanOrEqual => BuiltinOp::GreaterOrEqual,
            SwrlBuiltin::Add => BuiltinOp::Add,
            SwrlBuiltin::Subtract => BuiltinOp::Subtract,
            SwrlBuiltin::Multiply => BuiltinOp::Multiply,
            SwrlBuiltin::Divide => BuiltinOp::Divide,
            SwrlBuiltin::StringLength => BuiltinOp::StringLength,
            SwrlBuiltin::Contains => BuiltinOp::Contains,
            SwrlBuiltin::StartsWith => BuiltinOp::StartsWith,
            SwrlBuiltin::Matches => BuiltinOp::Matches,
        }
    }

    /// Name for diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            BuiltinOp::Equal => "equal",
            BuiltinOp::NotEqual => "notEqual",
            BuiltinOp::Less => "lessThan",
            BuiltinOp::LessOrEqual => "lessThanOrEqual",
            BuiltinOp::Greater => "greaterThan",
            BuiltinOp::GreaterOrEqual => "greaterThanOrEqual",
            BuiltinOp::Add => "add",
            BuiltinOp::Subtract => "subtract",
            BuiltinOp::Multiply => "multiply",
            BuiltinOp::Divide => "divide",
            BuiltinOp::StringLength => "stringLength",
            BuiltinOp::Contains => "contains",
            BuiltinOp::StartsWith => "startsWith",
            BuiltinOp::Matches => "matches",
        }
    }
}

/// Argument of a builtin call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinArg {
    Var(u16),
    Const(TermId),
}

/// One builtin evaluation inside a production body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinCall {
    pub op: BuiltinOp,
    /// Input arguments; for binding builtins these exclude the output
    pub args: SmallVec<[BuiltinArg; 3]>,
    /// Variable bound by the call, for arithmetic and string-length forms
    pub output: Option<u16>,
}

impl BuiltinCall {
    /// Variables this call needs bound before it can evaluate
    pub fn input_vars(&self) -> SmallVec<[u16; 3]> {
        self.args
            .iter()
            .filter_map(|a| match a {
                BuiltinArg::Var(v) => Some(*v),
                BuiltinArg::Const(_) => None,
            })
            .collect()
    }
}

/// A compiled production: patterns, builtins, consequent templates
///
/// Productions are append-only after compilation; the RETE builder consumes
/// them verbatim and does not re-plan the pattern order.
#[derive(Debug, Clone)]
pub struct Production {
    pub id: ProductionId,
    /// Human-readable origin, for logs only
    pub label: String,
    /// Number of variable slots used across patterns and builtins
    pub var_count: u16,
    pub lhs: Vec<Pattern>,
    pub builtins: Vec<BuiltinCall>,
    pub rhs: Vec<TripleTemplate>,
}

/// Result of compiling one axiom
#[derive(Debug, Default)]
pub struct CompileOutput {
    pub productions: Vec<Production>,
    /// Ground facts to assert directly, under the axiom's source tag
    pub facts: Vec<Triple>,
}

/// Reasoning profile hint supplied at reasoner construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    /// Full OWL 2 RL rule set including SWRL
    #[default]
    OwlRl,
    /// Hierarchy and assertion axioms only; everything else is warned away
    RdfsPlus,
}

struct NonRl(String);

/// Compiles IR axioms into productions and ground facts
pub struct AxiomCompiler {
    terms: Arc<TermStore>,
    events: Arc<EventLog>,
    variant: Variant,
    next_production: u32,
    transitive_roles: HashSet<TermId>,
    cardinality_roles: HashSet<TermId>,
}

impl AxiomCompiler {
    /// Create a compiler for the given profile variant
    pub fn new(terms: Arc<TermStore>, events: Arc<EventLog>, variant: Variant) -> Self {
        AxiomCompiler {
            terms,
            events,
            variant,
            next_production: 0,
            transitive_roles: HashSet::new(),
            cardinality_roles: HashSet::new(),
        }
    }

    fn next_id(&mut self) -> ProductionId {
        let id = ProductionId(self.next_production);
        self.next_production += 1;
        id
    }

    fn production(
        &mut self,
        label: impl Into<String>,
        lhs: Vec<Pattern>,
        builtins: Vec<BuiltinCall>,
        rhs: Vec<TripleTemplate>,
    ) -> Production {
        let mut max_var = 0u16;
        let mut track = |slot: PatternSlot| {
            if let PatternSlot::Var(v) = slot {
                max_var = max_var.max(v + 1);
            }
        };
        for p in lhs.iter().chain(rhs.iter()) {
            track(p.s);
            track(p.p);
            track(p.o);
        }
        for call in &builtins {
            for arg in &call.args {
                if let BuiltinArg::Var(v) = arg {
                    max_var = max_var.max(v + 1);
                }
            }
            if let Some(out) = call.output {
                max_var = max_var.max(out + 1);
            }
        }
        Production {
            id: self.next_id(),
            label: label.into(),
            var_count: max_var,
            lhs,
            builtins,
            rhs,
        }
    }

    /// Statically installed productions: transitive closure of the
    /// materialised class and role hierarchies
    pub fn bootstrap(&mut self) -> Vec<Production> {
        let sco = self.production(
            "subClassOf-transitivity",
            vec![
                Pattern::new(
                    PatternSlot::Var(0),
                    PatternSlot::Const(reserved::SUB_CLASS_OF),
                    PatternSlot::Var(1),
                ),
                Pattern::new(
                    PatternSlot::Var(1),
                    PatternSlot::Const(reserved::SUB_CLASS_OF),
                    PatternSlot::Var(2),
                ),
            ],
            Vec::new(),
            vec![Pattern::new(
                PatternSlot::Var(0),
                PatternSlot::Const(reserved::SUB_CLASS_OF),
                PatternSlot::Var(2),
            )],
        );
        let spo = self.production(
            "subPropertyOf-transitivity",
            vec![
                Pattern::new(
                    PatternSlot::Var(0),
                    PatternSlot::Const(reserved::SUB_PROPERTY_OF),
                    PatternSlot::Var(1),
                ),
                Pattern::new(
                    PatternSlot::Var(1),
                    PatternSlot::Const(reserved::SUB_PROPERTY_OF),
                    PatternSlot::Var(2),
                ),
            ],
            Vec::new(),
            vec![Pattern::new(
                PatternSlot::Var(0),
                PatternSlot::Const(reserved::SUB_PROPERTY_OF),
                PatternSlot::Var(2),
            )],
        );
        vec![sco, spo]
    }

    /// Compile one axiom
    ///
    /// Non-RL forms produce a `NonRlAxiom` event and an empty output;
    /// structurally broken input (an empty role chain, a single-element
    /// equivalence) is an error.
    pub fn compile(&mut self, axiom: &Axiom) -> RlResult<CompileOutput> {
        if self.variant == Variant::RdfsPlus && !rdfs_plus_supported(&axiom.kind) {
            self.warn(axiom, "outside the RdfsPlus variant");
            return Ok(CompileOutput::default());
        }
        let mut out = CompileOutput::default();
        let result = match &axiom.kind {
            AxiomKind::ClassAssertion {
                concept,
                individual,
            } => self.compile_class_assertion(concept, *individual, &mut out),
            AxiomKind::RoleAssertion {
                role,
                subject,
                object,
            } => {
                let (s, o) = match role {
                    RoleRef::Named(_) => (*subject, *object),
                    RoleRef::Inverse(_) => (*object, *subject),
                };
                out.facts.push(Triple::new(s, role.name(), o));
                self.push_thing(s, &mut out);
                self.push_thing(o, &mut out);
                Ok(())
            }
            AxiomKind::DataAssertion {
                role,
                subject,
                value,
            } => {
                out.facts.push(Triple::new(*subject, *role, *value));
                self.push_thing(*subject, &mut out);
                Ok(())
            }
            AxiomKind::SubClassOf { sub, sup } => self.compile_subclass(sub, sup, &mut out),
            AxiomKind::EquivClasses { classes } => {
                if classes.len() < 2 {
                    return Err(RlError::InvalidAxiom(
                        "EquivClasses needs at least two classes".to_string(),
                    ));
                }
                let mut result = Ok(());
                for window in classes.windows(2) {
                    result = result
                        .and(self.compile_subclass(&window[0], &window[1], &mut out))
                        .and(self.compile_subclass(&window[1], &window[0], &mut out));
                }
                result
            }
            AxiomKind::DisjointClasses { classes } => {
                if classes.len() < 2 {
                    return Err(RlError::InvalidAxiom(
                        "DisjointClasses needs at least two classes".to_string(),
                    ));
                }
                let mut result = Ok(());
                for i in 0..classes.len() {
                    for j in (i + 1)..classes.len() {
                        result = result.and(self.compile_disjoint_pair(
                            &classes[i],
                            &classes[j],
                            &mut out,
                        ));
                    }
                }
                result
            }
            AxiomKind::SubRole { sub, sup } => {
                self.compile_subrole(*sub, *sup, &mut out);
                Ok(())
            }
            AxiomKind::EquivRoles { roles } => {
                if roles.len() < 2 {
                    return Err(RlError::InvalidAxiom(
                        "EquivRoles needs at least two roles".to_string(),
                    ));
                }
                for window in roles.windows(2) {
                    self.compile_subrole(window[0], window[1], &mut out);
                    self.compile_subrole(window[1], window[0], &mut out);
                }
                Ok(())
            }
            AxiomKind::DisjointRoles { roles } => {
                if roles.len() < 2 {
                    return Err(RlError::InvalidAxiom(
                        "DisjointRoles needs at least two roles".to_string(),
                    ));
                }
                for i in 0..roles.len() {
                    for j in (i + 1)..roles.len() {
                        let lhs = vec![
                            role_pattern(roles[i], PatternSlot::Var(0), PatternSlot::Var(1)),
                            role_pattern(roles[j], PatternSlot::Var(0), PatternSlot::Var(1)),
                        ];
                        let rhs = vec![type_template(0, reserved::NOTHING)];
                        let production = self.production("disjoint-roles", lhs, Vec::new(), rhs);
                        out.productions.push(production);
                    }
                }
                Ok(())
            }
            AxiomKind::InverseRoles { first, second } => {
                self.compile_subrole(
                    RoleRef::Named(*first),
                    RoleRef::Inverse(*second),
                    &mut out,
                );
                self.compile_subrole(
                    RoleRef::Named(*second),
                    RoleRef::Inverse(*first),
                    &mut out,
                );
                Ok(())
            }
            AxiomKind::RoleChain { chain, sup } => {
                if chain.is_empty() {
                    return Err(RlError::InvalidAxiom("empty role chain".to_string()));
                }
                let mut lhs = Vec::with_capacity(chain.len());
                for (i, role) in chain.iter().enumerate() {
                    lhs.push(role_pattern(
                        *role,
                        PatternSlot::Var(i as u16),
                        PatternSlot::Var(i as u16 + 1),
                    ));
                }
                let rhs = vec![role_template(
                    *sup,
                    PatternSlot::Var(0),
                    PatternSlot::Var(chain.len() as u16),
                )];
                let production = self.production("role-chain", lhs, Vec::new(), rhs);
                out.productions.push(production);
                Ok(())
            }
            AxiomKind::FunctionalRole { role } => {
                if self.guard_cardinality(axiom, role.name()) {
                    return Ok(CompileOutput::default());
                }
                let lhs = vec![
                    role_pattern(*role, PatternSlot::Var(0), PatternSlot::Var(1)),
                    role_pattern(*role, PatternSlot::Var(0), PatternSlot::Var(2)),
                ];
                let rhs = vec![same_as_template(1, 2)];
                let production = self.production("functional-role", lhs, Vec::new(), rhs);
                out.productions.push(production);
                Ok(())
            }
            AxiomKind::InverseFunctionalRole { role } => {
                if self.guard_cardinality(axiom, role.name()) {
                    return Ok(CompileOutput::default());
                }
                let lhs = vec![
                    role_pattern(*role, PatternSlot::Var(1), PatternSlot::Var(0)),
                    role_pattern(*role, PatternSlot::Var(2), PatternSlot::Var(0)),
                ];
                let rhs = vec![same_as_template(1, 2)];
                let production = self.production("inverse-functional-role", lhs, Vec::new(), rhs);
                out.productions.push(production);
                Ok(())
            }
            AxiomKind::TransitiveRole { role } => {
                if self.cardinality_roles.contains(&role.name()) {
                    self.warn(
                        axiom,
                        "transitivity combined with a cardinality restriction on the same role",
                    );
                    return Ok(CompileOutput::default());
                }
                self.transitive_roles.insert(role.name());
                let lhs = vec![
                    role_pattern(*role, PatternSlot::Var(0), PatternSlot::Var(1)),
                    role_pattern(*role, PatternSlot::Var(1), PatternSlot::Var(2)),
                ];
                let rhs = vec![role_template(*role, PatternSlot::Var(0), PatternSlot::Var(2))];
                let production = self.production("transitive-role", lhs, Vec::new(), rhs);
                out.productions.push(production);
                Ok(())
            }
            AxiomKind::SymmetricRole { role } => {
                let lhs = vec![role_pattern(
                    *role,
                    PatternSlot::Var(0),
                    PatternSlot::Var(1),
                )];
                let rhs = vec![role_template(*role, PatternSlot::Var(1), PatternSlot::Var(0))];
                let production = self.production("symmetric-role", lhs, Vec::new(), rhs);
                out.productions.push(production);
                Ok(())
            }
            AxiomKind::AsymmetricRole { role } => {
                let lhs = vec![
                    role_pattern(*role, PatternSlot::Var(0), PatternSlot::Var(1)),
                    role_pattern(*role, PatternSlot::Var(1), PatternSlot::Var(0)),
                ];
                let rhs = vec![type_template(0, reserved::NOTHING)];
                let production = self.production("asymmetric-role", lhs, Vec::new(), rhs);
                out.productions.push(production);
                Ok(())
            }
            AxiomKind::ReflexiveRole { role } => {
                let lhs = vec![Pattern::new(
                    PatternSlot::Var(0),
                    PatternSlot::Const(reserved::RDF_TYPE),
                    PatternSlot::Const(reserved::THING),
                )];
                let rhs = vec![role_template(*role, PatternSlot::Var(0), PatternSlot::Var(0))];
                let production = self.production("reflexive-role", lhs, Vec::new(), rhs);
                out.productions.push(production);
                Ok(())
            }
            AxiomKind::IrreflexiveRole { role } => {
                let lhs = vec![role_pattern(
                    *role,
                    PatternSlot::Var(0),
                    PatternSlot::Var(0),
                )];
                let rhs = vec![type_template(0, reserved::NOTHING)];
                let production = self.production("irreflexive-role", lhs, Vec::new(), rhs);
                out.productions.push(production);
                Ok(())
            }
            AxiomKind::SameAs { individuals } => {
                if individuals.len() < 2 {
                    return Err(RlError::InvalidAxiom(
                        "SameAs needs at least two individuals".to_string(),
                    ));
                }
                for window in individuals.windows(2) {
                    out.facts
                        .push(Triple::new(window[0], reserved::SAME_AS, window[1]));
                }
                for i in individuals {
                    self.push_thing(*i, &mut out);
                }
                Ok(())
            }
            AxiomKind::DifferentFrom { individuals } => {
                if individuals.len() < 2 {
                    return Err(RlError::InvalidAxiom(
                        "DifferentFrom needs at least two individuals".to_string(),
                    ));
                }
                for i in 0..individuals.len() {
                    for j in (i + 1)..individuals.len() {
                        out.facts.push(Triple::new(
                            individuals[i],
                            reserved::DIFFERENT_FROM,
                            individuals[j],
                        ));
                    }
                }
                for i in individuals {
                    self.push_thing(*i, &mut out);
                }
                Ok(())
            }
            AxiomKind::HasKey { class, keys } => self.compile_has_key(class, keys, &mut out),
            AxiomKind::DatatypeDefinition { name, base } => {
                // Literal interning already collapses the value spaces, so a
                // definition carries no rule content.
                debug!(
                    "datatype definition {} := {} accepted with no rule content",
                    self.terms.render(*name),
                    self.terms.render(*base)
                );
                Ok(())
            }
            AxiomKind::SwrlRule(rule) => self.compile_swrl(rule, &mut out),
        };
        match result {
            Ok(()) => Ok(out),
            Err(NonRl(reason)) => {
                self.warn(axiom, &reason);
                Ok(CompileOutput::default())
            }
        }
    }

    fn warn(&self, axiom: &Axiom, reason: &str) {
        debug!("dropping non-RL axiom {}: {}", axiom.kind.name(), reason);
        self.events.record(ReasonerEvent::NonRlAxiom {
            axiom: axiom.kind.name().to_string(),
            reason: reason.to_string(),
        });
    }

    /// Returns true (and warns) when the role is already transitive and the
    /// new axiom constrains its cardinality
    fn guard_cardinality(&mut self, axiom: &Axiom, role: TermId) -> bool {
        if self.transitive_roles.contains(&role) {
            self.warn(
                axiom,
                "cardinality restriction on a transitive role is outside OWL 2 RL",
            );
            return true;
        }
        self.cardinality_roles.insert(role);
        false
    }

    fn push_thing(&self, individual: TermId, out: &mut CompileOutput) {
        if !individual.is_literal_id() {
            out.facts
                .push(Triple::new(individual, reserved::RDF_TYPE, reserved::THING));
        }
    }

    fn compile_class_assertion(
        &mut self,
        concept: &ConceptExpr,
        individual: TermId,
        out: &mut CompileOutput,
    ) -> Result<(), NonRl> {
        self.push_thing(individual, out);
        self.assert_concept(concept, individual, out)
    }

    fn assert_concept(
        &mut self,
        concept: &ConceptExpr,
        individual: TermId,
        out: &mut CompileOutput,
    ) -> Result<(), NonRl> {
        match concept {
            ConceptExpr::Atomic(class) => {
                out.facts
                    .push(Triple::new(individual, reserved::RDF_TYPE, *class));
                Ok(())
            }
            ConceptExpr::Top => Ok(()),
            ConceptExpr::Bottom => {
                out.facts
                    .push(Triple::new(individual, reserved::RDF_TYPE, reserved::NOTHING));
                Ok(())
            }
            ConceptExpr::And(left, right) => {
                self.assert_concept(left, individual, out)?;
                self.assert_concept(right, individual, out)
            }
            ConceptExpr::HasValue(role, value) => {
                let (s, o) = match role {
                    RoleRef::Named(_) => (individual, *value),
                    RoleRef::Inverse(_) => (*value, individual),
                };
                out.facts.push(Triple::new(s, role.name(), o));
                self.push_thing(*value, out);
                Ok(())
            }
            ConceptExpr::HasSelf(role) => {
                out.facts
                    .push(Triple::new(individual, role.name(), individual));
                Ok(())
            }
            other => Err(NonRl(format!(
                "class assertion over {:?} would need an anonymous witness",
                variant_name(other)
            ))),
        }
    }

    fn compile_subclass(
        &mut self,
        sub: &ConceptExpr,
        sup: &ConceptExpr,
        out: &mut CompileOutput,
    ) -> Result<(), NonRl> {
        // Enumerated subclasses are ground: {a, b} ⊑ D is D(a), D(b).
        if let ConceptExpr::OneOf(individuals) = sub {
            for individual in individuals {
                self.compile_class_assertion(sup, *individual, out)?;
            }
            return Ok(());
        }
        if let (ConceptExpr::Atomic(sub_id), ConceptExpr::Atomic(sup_id)) = (sub, sup) {
            out.facts
                .push(Triple::new(*sub_id, reserved::SUB_CLASS_OF, *sup_id));
        }
        let mut next_var = 1u16;
        let branches = self.lower_body(sub, 0, &mut next_var)?;
        for branch in branches {
            let templates = self.lower_head(sup, 0, &branch, &mut next_var, out)?;
            if !templates.is_empty() {
                let production =
                    self.production("subclass-inclusion", branch.clone(), Vec::new(), templates);
                out.productions.push(production);
            }
        }
        Ok(())
    }

    fn compile_disjoint_pair(
        &mut self,
        left: &ConceptExpr,
        right: &ConceptExpr,
        out: &mut CompileOutput,
    ) -> Result<(), NonRl> {
        let mut next_var = 1u16;
        let left_branches = self.lower_body(left, 0, &mut next_var)?;
        let right_branches = self.lower_body(right, 0, &mut next_var)?;
        for lb in &left_branches {
            for rb in &right_branches {
                let mut lhs = lb.clone();
                lhs.extend(rb.iter().copied());
                let rhs = vec![type_template(0, reserved::NOTHING)];
                let production = self.production("disjoint-classes", lhs, Vec::new(), rhs);
                out.productions.push(production);
            }
        }
        Ok(())
    }

    fn compile_has_key(
        &mut self,
        class: &ConceptExpr,
        keys: &[TermId],
        out: &mut CompileOutput,
    ) -> Result<(), NonRl> {
        if keys.is_empty() {
            return Err(NonRl("HasKey with no key roles".to_string()));
        }
        // Variables: 0 = x, 1 = y, then one shared value var per key.
        let mut next_var = 2u16;
        let x_branches = self.lower_body(class, 0, &mut next_var)?;
        let y_branches = self.lower_body(class, 1, &mut next_var)?;
        for xb in &x_branches {
            for yb in &y_branches {
                let mut lhs = xb.clone();
                lhs.extend(yb.iter().copied());
                let mut value_var = next_var;
                for key in keys {
                    lhs.push(Pattern::new(
                        PatternSlot::Var(0),
                        PatternSlot::Const(*key),
                        PatternSlot::Var(value_var),
                    ));
                    lhs.push(Pattern::new(
                        PatternSlot::Var(1),
                        PatternSlot::Const(*key),
                        PatternSlot::Var(value_var),
                    ));
                    value_var += 1;
                }
                let rhs = vec![same_as_template(0, 1)];
                let production = self.production("has-key", lhs, Vec::new(), rhs);
                out.productions.push(production);
            }
        }
        Ok(())
    }

    /// Lower a concept in body (subclass) position to disjunctive branches
    /// of pattern conjunctions rooted at `var`
    fn lower_body(
        &mut self,
        concept: &ConceptExpr,
        var: u16,
        next_var: &mut u16,
    ) -> Result<Vec<Vec<Pattern>>, NonRl> {
        match concept {
            ConceptExpr::Atomic(class) => Ok(vec![vec![type_pattern(var, *class)]]),
            ConceptExpr::Top => Ok(vec![vec![type_pattern(var, reserved::THING)]]),
            ConceptExpr::Bottom => Ok(vec![vec![type_pattern(var, reserved::NOTHING)]]),
            ConceptExpr::And(left, right) => {
                let lbs = self.lower_body(left, var, next_var)?;
                let rbs = self.lower_body(right, var, next_var)?;
                let mut branches = Vec::with_capacity(lbs.len() * rbs.len());
                for lb in &lbs {
                    for rb in &rbs {
                        let mut combined = lb.clone();
                        combined.extend(rb.iter().copied());
                        branches.push(combined);
                    }
                }
                Ok(branches)
            }
            ConceptExpr::Or(left, right) => {
                let mut branches = self.lower_body(left, var, next_var)?;
                branches.extend(self.lower_body(right, var, next_var)?);
                Ok(branches)
            }
            ConceptExpr::Some(role, filler) | ConceptExpr::MinCard(1, role, filler) => {
                let filler_var = *next_var;
                *next_var += 1;
                let role_pat =
                    role_pattern(*role, PatternSlot::Var(var), PatternSlot::Var(filler_var));
                if matches!(**filler, ConceptExpr::Top) {
                    return Ok(vec![vec![role_pat]]);
                }
                let filler_branches = self.lower_body(filler, filler_var, next_var)?;
                Ok(filler_branches
                    .into_iter()
                    .map(|branch| {
                        let mut combined = vec![role_pat];
                        combined.extend(branch);
                        combined
                    })
                    .collect())
            }
            ConceptExpr::MinCard(0, _, _) => Ok(vec![Vec::new()]),
            ConceptExpr::HasValue(role, value) => Ok(vec![vec![role_pattern(
                *role,
                PatternSlot::Var(var),
                PatternSlot::Const(*value),
            )]]),
            ConceptExpr::HasSelf(role) => Ok(vec![vec![role_pattern(
                *role,
                PatternSlot::Var(var),
                PatternSlot::Var(var),
            )]]),
            ConceptExpr::MinCard(n, _, _) => Err(NonRl(format!(
                "min-cardinality {} in a class body exceeds the RL profile",
                n
            ))),
            ConceptExpr::MaxCard(..) | ConceptExpr::ExactCard(..) => Err(NonRl(
                "counting restriction in a class body is outside OWL 2 RL".to_string(),
            )),
            ConceptExpr::Not(_) => Err(NonRl(
                "complement in a class body is outside OWL 2 RL".to_string(),
            )),
            ConceptExpr::Only(..) => Err(NonRl(
                "universal restriction in a class body is outside OWL 2 RL".to_string(),
            )),
            ConceptExpr::OneOf(_) => Err(NonRl(
                "nested enumeration in a class body is outside OWL 2 RL".to_string(),
            )),
        }
    }

    /// Lower a concept in head (superclass) position: returns templates for
    /// the base production and may push auxiliary productions with extended
    /// bodies (universal and max-cardinality heads)
    fn lower_head(
        &mut self,
        concept: &ConceptExpr,
        var: u16,
        body: &[Pattern],
        next_var: &mut u16,
        out: &mut CompileOutput,
    ) -> Result<Vec<TripleTemplate>, NonRl> {
        match concept {
            ConceptExpr::Atomic(class) => Ok(vec![type_template(var, *class)]),
            ConceptExpr::Top => Ok(Vec::new()),
            ConceptExpr::Bottom => Ok(vec![type_template(var, reserved::NOTHING)]),
            ConceptExpr::And(left, right) => {
                let mut templates = self.lower_head(left, var, body, next_var, out)?;
                templates.extend(self.lower_head(right, var, body, next_var, out)?);
                Ok(templates)
            }
            ConceptExpr::Only(role, filler) => {
                let filler_var = *next_var;
                *next_var += 1;
                let mut extended = body.to_vec();
                extended.push(role_pattern(
                    *role,
                    PatternSlot::Var(var),
                    PatternSlot::Var(filler_var),
                ));
                let templates = self.lower_head(filler, filler_var, &extended, next_var, out)?;
                if !templates.is_empty() {
                    let production = self.production(
                        "universal-restriction",
                        extended,
                        Vec::new(),
                        templates,
                    );
                    out.productions.push(production);
                }
                Ok(Vec::new())
            }
            ConceptExpr::HasValue(role, value) => Ok(vec![role_template(
                *role,
                PatternSlot::Var(var),
                PatternSlot::Const(*value),
            )]),
            ConceptExpr::HasSelf(role) => Ok(vec![role_template(
                *role,
                PatternSlot::Var(var),
                PatternSlot::Var(var),
            )]),
            ConceptExpr::MaxCard(1, role, filler) => {
                self.cardinality_roles.insert(role.name());
                if self.transitive_roles.contains(&role.name()) {
                    return Err(NonRl(
                        "cardinality restriction on a transitive role is outside OWL 2 RL"
                            .to_string(),
                    ));
                }
                let y1 = *next_var;
                let y2 = *next_var + 1;
                *next_var += 2;
                let mut extended = body.to_vec();
                extended.push(role_pattern(*role, PatternSlot::Var(var), PatternSlot::Var(y1)));
                self.extend_with_filler(filler, y1, &mut extended)?;
                extended.push(role_pattern(*role, PatternSlot::Var(var), PatternSlot::Var(y2)));
                self.extend_with_filler(filler, y2, &mut extended)?;
                let production = self.production(
                    "max-one-cardinality",
                    extended,
                    Vec::new(),
                    vec![same_as_template(y1, y2)],
                );
                out.productions.push(production);
                Ok(Vec::new())
            }
            ConceptExpr::MaxCard(0, role, filler) => {
                let y = *next_var;
                *next_var += 1;
                let mut extended = body.to_vec();
                extended.push(role_pattern(*role, PatternSlot::Var(var), PatternSlot::Var(y)));
                self.extend_with_filler(filler, y, &mut extended)?;
                let production = self.production(
                    "max-zero-cardinality",
                    extended,
                    Vec::new(),
                    vec![type_template(var, reserved::NOTHING)],
                );
                out.productions.push(production);
                Ok(Vec::new())
            }
            ConceptExpr::Some(..) | ConceptExpr::MinCard(..) => Err(NonRl(
                "existential on the right of an inclusion would generate a fresh individual"
                    .to_string(),
            )),
            ConceptExpr::ExactCard(..) => Err(NonRl(
                "exact cardinality in a superclass is outside OWL 2 RL".to_string(),
            )),
            ConceptExpr::MaxCard(n, _, _) => Err(NonRl(format!(
                "max-cardinality {} in a superclass exceeds the RL profile",
                n
            ))),
            ConceptExpr::Or(..) => Err(NonRl(
                "disjunction in a superclass is outside OWL 2 RL".to_string(),
            )),
            ConceptExpr::Not(_) => Err(NonRl(
                "complement in a superclass is outside OWL 2 RL".to_string(),
            )),
            ConceptExpr::OneOf(_) => Err(NonRl(
                "enumeration in a superclass is outside OWL 2 RL".to_string(),
            )),
        }
    }

    /// Add the qualification patterns of a cardinality filler to a body
    fn extend_with_filler(
        &mut self,
        filler: &ConceptExpr,
        var: u16,
        body: &mut Vec<Pattern>,
    ) -> Result<(), NonRl> {
        match filler {
            ConceptExpr::Top => Ok(()),
            ConceptExpr::Atomic(class) => {
                body.push(type_pattern(var, *class));
                Ok(())
            }
            _ => Err(NonRl(
                "complex cardinality qualification is outside OWL 2 RL".to_string(),
            )),
        }
    }

    fn compile_subrole(&mut self, sub: RoleRef, sup: RoleRef, out: &mut CompileOutput) {
        if let (RoleRef::Named(sub_id), RoleRef::Named(sup_id)) = (sub, sup) {
            out.facts
                .push(Triple::new(sub_id, reserved::SUB_PROPERTY_OF, sup_id));
        }
        let lhs = vec![role_pattern(sub, PatternSlot::Var(0), PatternSlot::Var(1))];
        let rhs = vec![role_template(sup, PatternSlot::Var(0), PatternSlot::Var(1))];
        let production = self.production("subrole-inclusion", lhs, Vec::new(), rhs);
        out.productions.push(production);
    }

    fn compile_swrl(&mut self, rule: &SwrlRule, out: &mut CompileOutput) -> Result<(), NonRl> {
        let mut vars: IndexMap<String, u16> = IndexMap::new();
        let mut slot = |arg: &SwrlArg, vars: &mut IndexMap<String, u16>| match arg {
            SwrlArg::Var(name) => {
                let next = vars.len() as u16;
                PatternSlot::Var(*vars.entry(name.clone()).or_insert(next))
            }
            SwrlArg::Term(id) => PatternSlot::Const(*id),
        };
        let mut lhs = Vec::new();
        let mut builtins = Vec::new();
        for atom in &rule.body {
            match atom {
                SwrlAtom::Class(class, arg) => {
                    let s = slot(arg, &mut vars);
                    lhs.push(Pattern::new(
                        s,
                        PatternSlot::Const(reserved::RDF_TYPE),
                        PatternSlot::Const(*class),
                    ));
                }
                SwrlAtom::Role(role, subject, object) => {
                    let s = slot(subject, &mut vars);
                    let o = slot(object, &mut vars);
                    lhs.push(Pattern::new(s, PatternSlot::Const(*role), o));
                }
                SwrlAtom::SameAs(a, b) => {
                    let s = slot(a, &mut vars);
                    let o = slot(b, &mut vars);
                    lhs.push(Pattern::new(s, PatternSlot::Const(reserved::SAME_AS), o));
                }
                SwrlAtom::DifferentFrom(a, b) => {
                    let s = slot(a, &mut vars);
                    let o = slot(b, &mut vars);
                    lhs.push(Pattern::new(
                        s,
                        PatternSlot::Const(reserved::DIFFERENT_FROM),
                        o,
                    ));
                }
                SwrlAtom::Builtin(builtin, args) => {
                    let op = BuiltinOp::from_swrl(*builtin);
                    if args.is_empty() {
                        return Err(NonRl("builtin with no arguments".to_string()));
                    }
                    let (output, inputs) = if builtin.binds_output() {
                        match &args[0] {
                            SwrlArg::Var(name) => {
                                let next = vars.len() as u16;
                                let out_slot = *vars.entry(name.clone()).or_insert(next);
                                (Some(out_slot), &args[1..])
                            }
                            SwrlArg::Term(_) => (None, &args[..]),
                        }
                    } else {
                        (None, &args[..])
                    };
                    let call_args = inputs
                        .iter()
                        .map(|a| match slot(a, &mut vars) {
                            PatternSlot::Var(v) => BuiltinArg::Var(v),
                            PatternSlot::Const(c) => BuiltinArg::Const(c),
                        })
                        .collect();
                    builtins.push(BuiltinCall {
                        op,
                        args: call_args,
                        output,
                    });
                }
            }
        }
        if lhs.is_empty() {
            return Err(NonRl("rule body has no triple patterns".to_string()));
        }
        // Every builtin input must be bound by a pattern or an earlier
        // builtin output; the network evaluates them at that point.
        let mut bound: HashSet<u16> = lhs
            .iter()
            .flat_map(|p| p.vars())
            .collect();
        for call in &builtins {
            if call.input_vars().iter().any(|v| !bound.contains(v)) {
                return Err(NonRl(format!(
                    "builtin {} uses a variable no pattern binds",
                    call.op.name()
                )));
            }
            if let Some(out_var) = call.output {
                bound.insert(out_var);
            }
        }
        let mut rhs = Vec::new();
        for atom in &rule.head {
            match atom {
                SwrlAtom::Class(class, arg) => {
                    let s = slot(arg, &mut vars);
                    rhs.push(Pattern::new(
                        s,
                        PatternSlot::Const(reserved::RDF_TYPE),
                        PatternSlot::Const(*class),
                    ));
                }
                SwrlAtom::Role(role, subject, object) => {
                    let s = slot(subject, &mut vars);
                    let o = slot(object, &mut vars);
                    rhs.push(Pattern::new(s, PatternSlot::Const(*role), o));
                }
                SwrlAtom::SameAs(a, b) => {
                    let s = slot(a, &mut vars);
                    let o = slot(b, &mut vars);
                    rhs.push(Pattern::new(s, PatternSlot::Const(reserved::SAME_AS), o));
                }
                SwrlAtom::DifferentFrom(a, b) => {
                    let s = slot(a, &mut vars);
                    let o = slot(b, &mut vars);
                    rhs.push(Pattern::new(
                        s,
                        PatternSlot::Const(reserved::DIFFERENT_FROM),
                        o,
                    ));
                }
                SwrlAtom::Builtin(..) => {
                    return Err(NonRl("builtin atom in a rule head".to_string()));
                }
            }
        }
        if rhs.is_empty() {
            return Err(NonRl("rule head has no atoms".to_string()));
        }
        for template in &rhs {
            for v in template.vars() {
                if !bound.contains(&v) {
                    return Err(NonRl(
                        "rule head uses a variable the body does not bind".to_string(),
                    ));
                }
            }
        }
        let production = self.production("swrl-rule", lhs, builtins, rhs);
        out.productions.push(production);
        Ok(())
    }
}

fn rdfs_plus_supported(kind: &AxiomKind) -> bool {
    matches!(
        kind,
        AxiomKind::ClassAssertion { .. }
            | AxiomKind::RoleAssertion { .. }
            | AxiomKind::DataAssertion { .. }
            | AxiomKind::SubClassOf { .. }
            | AxiomKind::EquivClasses { .. }
            | AxiomKind::SubRole { .. }
            | AxiomKind::EquivRoles { .. }
            | AxiomKind::InverseRoles { .. }
            | AxiomKind::SameAs { .. }
            | AxiomKind::DifferentFrom { .. }
    )
}

fn variant_name(concept: &ConceptExpr) -> &'static str {
    match concept {
        ConceptExpr::Atomic(_) => "Atomic",
        ConceptExpr::Top => "Top",
        ConceptExpr::Bottom => "Bottom",
        ConceptExpr::And(..) => "And",
        ConceptExpr::Or(..) => "Or",
        ConceptExpr::Not(_) => "Not",
        ConceptExpr::Some(..) => "Some",
        ConceptExpr::Only(..) => "Only",
        ConceptExpr::HasValue(..) => "HasValue",
        ConceptExpr::HasSelf(_) => "HasSelf",
        ConceptExpr::MinCard(..) => "MinCard",
        ConceptExpr::MaxCard(..) => "MaxCard",
        ConceptExpr::ExactCard(..) => "ExactCard",
        ConceptExpr::OneOf(_) => "OneOf",
    }
}

fn type_pattern(var: u16, class: TermId) -> Pattern {
    Pattern::new(
        PatternSlot::Var(var),
        PatternSlot::Const(reserved::RDF_TYPE),
        PatternSlot::Const(class),
    )
}

fn type_template(var: u16, class: TermId) -> TripleTemplate {
    type_pattern(var, class)
}

fn same_as_template(left: u16, right: u16) -> TripleTemplate {
    Pattern::new(
        PatternSlot::Var(left),
        PatternSlot::Const(reserved::SAME_AS),
        PatternSlot::Var(right),
    )
}

fn role_pattern(role: RoleRef, subject: PatternSlot, object: PatternSlot) -> Pattern {
    match role {
        RoleRef::Named(id) => Pattern::new(subject, PatternSlot::Const(id), object),
        RoleRef::Inverse(id) => Pattern::new(object, PatternSlot::Const(id), subject),
    }
}

fn role_template(role: RoleRef, subject: PatternSlot, object: PatternSlot) -> TripleTemplate {
    role_pattern(role, subject, object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axioms::ConceptExpr as C;

    fn test_compiler() -> (Arc<TermStore>, Arc<EventLog>, AxiomCompiler) {
        let terms = Arc::new(TermStore::new());
        let events = Arc::new(EventLog::new());
        let compiler = AxiomCompiler::new(Arc::clone(&terms), Arc::clone(&events), Variant::OwlRl);
        (terms, events, compiler)
    }

    #[test]
    fn test_atomic_subclass_compiles_to_type_rule_and_schema_triple() {
        let (terms, _events, mut compiler) = test_compiler();
        let person = terms.intern_name("http://example.org/Person");
        let animal = terms.intern_name("http://example.org/Animal");
        let axiom = Axiom::new(AxiomKind::SubClassOf {
            sub: C::Atomic(person),
            sup: C::Atomic(animal),
        });

        let out = compiler.compile(&axiom).expect("compiles");
        assert_eq!(out.productions.len(), 1);
        let production = &out.productions[0];
        assert_eq!(production.lhs.len(), 1);
        assert_eq!(
            production.lhs[0],
            Pattern::new(
                PatternSlot::Var(0),
                PatternSlot::Const(reserved::RDF_TYPE),
                PatternSlot::Const(person)
            )
        );
        assert_eq!(
            production.rhs[0],
            Pattern::new(
                PatternSlot::Var(0),
                PatternSlot::Const(reserved::RDF_TYPE),
                PatternSlot::Const(animal)
            )
        );
        assert!(out
            .facts
            .contains(&Triple::new(person, reserved::SUB_CLASS_OF, animal)));
    }

    #[test]
    fn test_existential_body_compiles_to_join() {
        let (terms, _events, mut compiler) = test_compiler();
        let r = terms.intern_name("http://example.org/r");
        let c = terms.intern_name("http://example.org/C");
        let d = terms.intern_name("http://example.org/D");
        let axiom = Axiom::new(AxiomKind::SubClassOf {
            sub: C::some(RoleRef::Named(r), C::Atomic(c)),
            sup: C::Atomic(d),
        });

        let out = compiler.compile(&axiom).expect("compiles");
        assert_eq!(out.productions.len(), 1);
        let production = &out.productions[0];
        assert_eq!(production.lhs.len(), 2);
        assert_eq!(production.rhs.len(), 1);
    }

    #[test]
    fn test_existential_head_is_refused() {
        let (terms, events, mut compiler) = test_compiler();
        let r = terms.intern_name("http://example.org/r");
        let c = terms.intern_name("http://example.org/C");
        let d = terms.intern_name("http://example.org/D");
        let axiom = Axiom::new(AxiomKind::SubClassOf {
            sub: C::Atomic(c),
            sup: C::some(RoleRef::Named(r), C::Atomic(d)),
        });

        let out = compiler.compile(&axiom).expect("warns, does not fail");
        assert!(out.productions.is_empty());
        assert!(out.facts.is_empty());
        assert!(events
            .snapshot()
            .iter()
            .any(|e| matches!(e, ReasonerEvent::NonRlAxiom { .. })));
    }

    #[test]
    fn test_union_body_splits_into_branches() {
        let (terms, _events, mut compiler) = test_compiler();
        let c = terms.intern_name("http://example.org/C");
        let d = terms.intern_name("http://example.org/D");
        let e = terms.intern_name("http://example.org/E");
        let axiom = Axiom::new(AxiomKind::SubClassOf {
            sub: C::or(C::Atomic(c), C::Atomic(d)),
            sup: C::Atomic(e),
        });

        let out = compiler.compile(&axiom).expect("compiles");
        assert_eq!(out.productions.len(), 2);
    }

    #[test]
    fn test_universal_head_extends_body() {
        let (terms, _events, mut compiler) = test_compiler();
        let r = terms.intern_name("http://example.org/r");
        let c = terms.intern_name("http://example.org/C");
        let d = terms.intern_name("http://example.org/D");
        // C ⊑ ∀R.D becomes C(x) ∧ R(x,y) → D(y)
        let axiom = Axiom::new(AxiomKind::SubClassOf {
            sub: C::Atomic(c),
            sup: C::only(RoleRef::Named(r), C::Atomic(d)),
        });

        let out = compiler.compile(&axiom).expect("compiles");
        assert_eq!(out.productions.len(), 1);
        let production = &out.productions[0];
        assert_eq!(production.lhs.len(), 2);
        assert_eq!(production.rhs.len(), 1);
    }

    #[test]
    fn test_role_chain_compiles_left_deep() {
        let (terms, _events, mut compiler) = test_compiler();
        let has_parent = terms.intern_name("http://example.org/hasParent");
        let has_grandparent = terms.intern_name("http://example.org/hasGrandparent");
        let axiom = Axiom::new(AxiomKind::RoleChain {
            chain: vec![RoleRef::Named(has_parent), RoleRef::Named(has_parent)],
            sup: RoleRef::Named(has_grandparent),
        });

        let out = compiler.compile(&axiom).expect("compiles");
        assert_eq!(out.productions.len(), 1);
        let production = &out.productions[0];
        assert_eq!(production.lhs.len(), 2);
        assert_eq!(production.var_count, 3);
    }

    #[test]
    fn test_functional_role_produces_same_as() {
        let (terms, _events, mut compiler) = test_compiler();
        let has_father = terms.intern_name("http://example.org/hasFather");
        let axiom = Axiom::new(AxiomKind::FunctionalRole {
            role: RoleRef::Named(has_father),
        });

        let out = compiler.compile(&axiom).expect("compiles");
        let production = &out.productions[0];
        assert_eq!(
            production.rhs[0],
            Pattern::new(
                PatternSlot::Var(1),
                PatternSlot::Const(reserved::SAME_AS),
                PatternSlot::Var(2)
            )
        );
    }

    #[test]
    fn test_transitive_plus_cardinality_is_rejected() {
        let (terms, events, mut compiler) = test_compiler();
        let r = terms.intern_name("http://example.org/r");
        let transitive = Axiom::new(AxiomKind::TransitiveRole {
            role: RoleRef::Named(r),
        });
        let functional = Axiom::new(AxiomKind::FunctionalRole {
            role: RoleRef::Named(r),
        });

        let out = compiler.compile(&transitive).expect("compiles");
        assert_eq!(out.productions.len(), 1);
        let out = compiler.compile(&functional).expect("warns");
        assert!(out.productions.is_empty());
        assert!(events
            .snapshot()
            .iter()
            .any(|e| matches!(e, ReasonerEvent::NonRlAxiom { .. })));
    }

    #[test]
    fn test_ground_assertions_stamp_thing() {
        let (terms, _events, mut compiler) = test_compiler();
        let person = terms.intern_name("http://example.org/Person");
        let john = terms.intern_name("http://example.org/john");
        let axiom = Axiom::new(AxiomKind::ClassAssertion {
            concept: C::Atomic(person),
            individual: john,
        });

        let out = compiler.compile(&axiom).expect("compiles");
        assert!(out
            .facts
            .contains(&Triple::new(john, reserved::RDF_TYPE, person)));
        assert!(out
            .facts
            .contains(&Triple::new(john, reserved::RDF_TYPE, reserved::THING)));
    }

    #[test]
    fn test_swrl_rule_with_builtin() {
        let (terms, _events, mut compiler) = test_compiler();
        let person = terms.intern_name("http://example.org/Person");
        let adult = terms.intern_name("http://example.org/Adult");
        let age = terms.intern_name("http://example.org/age");
        let eighteen = terms.intern_literal("18", Some(crate::constants::xsd::INTEGER));
        let rule = SwrlRule {
            body: vec![
                SwrlAtom::Class(person, SwrlArg::Var("x".to_string())),
                SwrlAtom::Role(age, SwrlArg::Var("x".to_string()), SwrlArg::Var("a".to_string())),
                SwrlAtom::Builtin(
                    SwrlBuiltin::GreaterThanOrEqual,
                    vec![SwrlArg::Var("a".to_string()), SwrlArg::Term(eighteen)],
                ),
            ],
            head: vec![SwrlAtom::Class(adult, SwrlArg::Var("x".to_string()))],
        };
        let axiom = Axiom::new(AxiomKind::SwrlRule(rule));

        let out = compiler.compile(&axiom).expect("compiles");
        assert_eq!(out.productions.len(), 1);
        let production = &out.productions[0];
        assert_eq!(production.lhs.len(), 2);
        assert_eq!(production.builtins.len(), 1);
        assert_eq!(production.builtins[0].op, BuiltinOp::GreaterOrEqual);
    }

    #[test]
    fn test_swrl_unbound_builtin_variable_is_refused() {
        let (terms, _events, mut compiler) = test_compiler();
        let person = terms.intern_name("http://example.org/Person");
        let rule = SwrlRule {
            body: vec![
                SwrlAtom::Class(person, SwrlArg::Var("x".to_string())),
                SwrlAtom::Builtin(
                    SwrlBuiltin::GreaterThan,
                    vec![SwrlArg::Var("y".to_string()), SwrlArg::Var("x".to_string())],
                ),
            ],
            head: vec![SwrlAtom::Class(person, SwrlArg::Var("y".to_string()))],
        };
        let axiom = Axiom::new(AxiomKind::SwrlRule(rule));

        let out = compiler.compile(&axiom).expect("warns");
        assert!(out.productions.is_empty());
    }

    #[test]
    fn test_rdfs_plus_variant_downgrades() {
        let terms = Arc::new(TermStore::new());
        let events = Arc::new(EventLog::new());
        let mut compiler =
            AxiomCompiler::new(Arc::clone(&terms), Arc::clone(&events), Variant::RdfsPlus);
        let r = terms.intern_name("http://example.org/r");
        let axiom = Axiom::new(AxiomKind::TransitiveRole {
            role: RoleRef::Named(r),
        });

        let out = compiler.compile(&axiom).expect("warns");
        assert!(out.productions.is_empty());
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_one_of_subclass_grounds_out() {
        let (terms, _events, mut compiler) = test_compiler();
        let d = terms.intern_name("http://example.org/D");
        let a = terms.intern_name("http://example.org/a");
        let b = terms.intern_name("http://example.org/b");
        let axiom = Axiom::new(AxiomKind::SubClassOf {
            sub: C::OneOf(vec![a, b]),
            sup: C::Atomic(d),
        });

        let out = compiler.compile(&axiom).expect("compiles");
        assert!(out.productions.is_empty());
        assert!(out.facts.contains(&Triple::new(a, reserved::RDF_TYPE, d)));
        assert!(out.facts.contains(&Triple::new(b, reserved::RDF_TYPE, d)));
    }

    #[test]
    fn test_bootstrap_installs_hierarchy_closure() {
        let (_terms, _events, mut compiler) = test_compiler();
        let productions = compiler.bootstrap();
        assert_eq!(productions.len(), 2);
        assert!(productions.iter().all(|p| p.lhs.len() == 2));
    }
}
