//! Abstract axiom IR: the core's only input shape
//!
//! Surface syntaxes (DL text, SWRL, annotation extractors) are external
//! translators; everything they produce arrives here as tagged variants
//! over interned [`TermId`](crate::terms::TermId)s. The IR is modelled as
//! closed sums with exhaustive matching so compiler passes are plain
//! pattern matches and serialisation is trivial.

use crate::terms::TermId;
use serde::Serialize;

/// Opaque label attached to axioms for bulk retraction
pub type SourceTag = String;

/// A role reference: a named role or the inverse of one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RoleRef {
    Named(TermId),
    Inverse(TermId),
}

impl RoleRef {
    /// The underlying role name
    pub fn name(&self) -> TermId {
        match self {
            RoleRef::Named(id) | RoleRef::Inverse(id) => *id,
        }
    }

    /// Flip the direction of the reference
    pub fn inverse(&self) -> RoleRef {
        match self {
            RoleRef::Named(id) => RoleRef::Inverse(*id),
            RoleRef::Inverse(id) => RoleRef::Named(*id),
        }
    }
}

/// Recursive concept (class) expression
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ConceptExpr {
    /// A named class
    Atomic(TermId),
    /// `owl:Thing`
    Top,
    /// `owl:Nothing`
    Bottom,
    And(Box<ConceptExpr>, Box<ConceptExpr>),
    Or(Box<ConceptExpr>, Box<ConceptExpr>),
    Not(Box<ConceptExpr>),
    /// Existential restriction `∃R.C`
    Some(RoleRef, Box<ConceptExpr>),
    /// Universal restriction `∀R.C`
    Only(RoleRef, Box<ConceptExpr>),
    /// `∃R.{i}`
    HasValue(RoleRef, TermId),
    /// `∃R.Self`
    HasSelf(RoleRef),
    MinCard(u32, RoleRef, Box<ConceptExpr>),
    MaxCard(u32, RoleRef, Box<ConceptExpr>),
    ExactCard(u32, RoleRef, Box<ConceptExpr>),
    /// Enumerated class `{i₁, …, iₙ}`
    OneOf(Vec<TermId>),
}

impl ConceptExpr {
    /// Conjunction helper
    pub fn and(left: ConceptExpr, right: ConceptExpr) -> ConceptExpr {
        ConceptExpr::And(Box::new(left), Box::new(right))
    }

    /// Disjunction helper
    pub fn or(left: ConceptExpr, right: ConceptExpr) -> ConceptExpr {
        ConceptExpr::Or(Box::new(left), Box::new(right))
    }

    /// Existential helper
    pub fn some(role: RoleRef, filler: ConceptExpr) -> ConceptExpr {
        ConceptExpr::Some(role, Box::new(filler))
    }

    /// Universal helper
    pub fn only(role: RoleRef, filler: ConceptExpr) -> ConceptExpr {
        ConceptExpr::Only(role, Box::new(filler))
    }
}

/// SWRL atom argument: a rule variable or an interned constant
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum SwrlArg {
    Var(String),
    Term(TermId),
}

/// Builtin predicates available in SWRL rule bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SwrlBuiltin {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Add,
    Subtract,
    Multiply,
    Divide,
    StringLength,
    Contains,
    StartsWith,
    Matches,
}

impl SwrlBuiltin {
    /// True for builtins that bind their first argument from the rest
    pub fn binds_output(&self) -> bool {
        matches!(
            self,
            SwrlBuiltin::Add
                | SwrlBuiltin::Subtract
                | SwrlBuiltin::Multiply
                | SwrlBuiltin::Divide
                | SwrlBuiltin::StringLength
        )
    }
}

/// An atom in a SWRL rule body or head
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SwrlAtom {
    /// `C(x)` with an atomic concept
    Class(TermId, SwrlArg),
    /// `R(x, y)`
    Role(TermId, SwrlArg, SwrlArg),
    SameAs(SwrlArg, SwrlArg),
    DifferentFrom(SwrlArg, SwrlArg),
    /// Builtin call; only allowed in rule bodies
    Builtin(SwrlBuiltin, Vec<SwrlArg>),
}

/// A SWRL rule: conjunctive body, conjunctive head
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwrlRule {
    pub body: Vec<SwrlAtom>,
    pub head: Vec<SwrlAtom>,
}

/// One axiom of the ontology
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axiom {
    pub kind: AxiomKind,
    /// Label used by `retract_source`; axioms without one cannot be retracted
    pub source: Option<SourceTag>,
}

impl Axiom {
    /// Wrap an axiom kind without a source tag
    pub fn new(kind: AxiomKind) -> Self {
        Axiom { kind, source: None }
    }

    /// Attach a source tag
    pub fn with_source(kind: AxiomKind, tag: impl Into<SourceTag>) -> Self {
        Axiom {
            kind,
            source: Some(tag.into()),
        }
    }
}

/// The tagged sum of all supported axiom forms
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AxiomKind {
    ClassAssertion {
        concept: ConceptExpr,
        individual: TermId,
    },
    RoleAssertion {
        role: RoleRef,
        subject: TermId,
        object: TermId,
    },
    DataAssertion {
        role: TermId,
        subject: TermId,
        value: TermId,
    },
    SubClassOf {
        sub: ConceptExpr,
        sup: ConceptExpr,
    },
    EquivClasses {
        classes: Vec<ConceptExpr>,
    },
    DisjointClasses {
        classes: Vec<ConceptExpr>,
    },
    SubRole {
        sub: RoleRef,
        sup: RoleRef,
    },
    EquivRoles {
        roles: Vec<RoleRef>,
    },
    DisjointRoles {
        roles: Vec<RoleRef>,
    },
    InverseRoles {
        first: TermId,
        second: TermId,
    },
    RoleChain {
        chain: Vec<RoleRef>,
        sup: RoleRef,
    },
    FunctionalRole {
        role: RoleRef,
    },
    InverseFunctionalRole {
        role: RoleRef,
    },
    TransitiveRole {
        role: RoleRef,
    },
    SymmetricRole {
        role: RoleRef,
    },
    AsymmetricRole {
        role: RoleRef,
    },
    ReflexiveRole {
        role: RoleRef,
    },
    IrreflexiveRole {
        role: RoleRef,
    },
    SameAs {
        individuals: Vec<TermId>,
    },
    DifferentFrom {
        individuals: Vec<TermId>,
    },
    HasKey {
        class: ConceptExpr,
        keys: Vec<TermId>,
    },
    DatatypeDefinition {
        name: TermId,
        base: TermId,
    },
    SwrlRule(SwrlRule),
}

impl AxiomKind {
    /// Short tag for diagnostics and events
    pub fn name(&self) -> &'static str {
        match self {
            AxiomKind::ClassAssertion { .. } => "ClassAssertion",
            AxiomKind::RoleAssertion { .. } => "RoleAssertion",
            AxiomKind::DataAssertion { .. } => "DataAssertion",
            AxiomKind::SubClassOf { .. } => "SubClassOf",
            AxiomKind::EquivClasses { .. } => "EquivClasses",
            AxiomKind::DisjointClasses { .. } => "DisjointClasses",
            AxiomKind::SubRole { .. } => "SubRole",
            AxiomKind::EquivRoles { .. } => "EquivRoles",
            AxiomKind::DisjointRoles { .. } => "DisjointRoles",
            AxiomKind::InverseRoles { .. } => "InverseRoles",
            AxiomKind::RoleChain { .. } => "RoleChain",
            AxiomKind::FunctionalRole { .. } => "FunctionalRole",
            AxiomKind::InverseFunctionalRole { .. } => "InverseFunctionalRole",
            AxiomKind::TransitiveRole { .. } => "TransitiveRole",
            AxiomKind::SymmetricRole { .. } => "SymmetricRole",
            AxiomKind::AsymmetricRole { .. } => "AsymmetricRole",
            AxiomKind::ReflexiveRole { .. } => "ReflexiveRole",
            AxiomKind::IrreflexiveRole { .. } => "IrreflexiveRole",
            AxiomKind::SameAs { .. } => "SameAs",
            AxiomKind::DifferentFrom { .. } => "DifferentFrom",
            AxiomKind::HasKey { .. } => "HasKey",
            AxiomKind::DatatypeDefinition { .. } => "DatatypeDefinition",
            AxiomKind::SwrlRule(_) => "SwrlRule",
        }
    }
}
