//! Source retraction and provenance tests
//!
//! Round-trips, counting invalidation over multiple derivation paths, and
//! the replay fallback for stores with equivalence merges.

use owl2_rl_reasoner::terms::reserved;
use owl2_rl_reasoner::{Axiom, AxiomKind, ConceptExpr, Reasoner, RoleRef, TermId};

const EX: &str = "http://example.org/";

fn name(reasoner: &Reasoner, local: &str) -> TermId {
    reasoner.intern(&format!("{}{}", EX, local))
}

fn class_assertion(concept: TermId, individual: TermId, source: &str) -> Axiom {
    Axiom::with_source(
        AxiomKind::ClassAssertion {
            concept: ConceptExpr::Atomic(concept),
            individual,
        },
        source,
    )
}

fn role_assertion(role: TermId, subject: TermId, object: TermId, source: &str) -> Axiom {
    Axiom::with_source(
        AxiomKind::RoleAssertion {
            role: RoleRef::Named(role),
            subject,
            object,
        },
        source,
    )
}

#[test]
fn test_round_trip_restores_prior_state() {
    let reasoner = Reasoner::default();
    let person = name(&reasoner, "Person");
    let animal = name(&reasoner, "Animal");
    let john = name(&reasoner, "john");

    reasoner
        .load_axioms(vec![Axiom::new(AxiomKind::SubClassOf {
            sub: ConceptExpr::Atomic(person),
            sup: ConceptExpr::Atomic(animal),
        })])
        .expect("loads");
    reasoner.reason();
    let baseline = reasoner.triple_count();

    reasoner
        .load_axioms(vec![class_assertion(person, john, "john.owl")])
        .expect("loads");
    reasoner.reason();
    assert!(reasoner.triple_count() > baseline);

    let report = reasoner.retract_source("john.owl");
    assert!(report.removed > 0);
    assert_eq!(reasoner.triple_count(), baseline);
    assert!(reasoner.instances_of(animal).is_empty());
}

#[test]
fn test_retract_unknown_tag_is_noop() {
    let reasoner = Reasoner::default();
    let person = name(&reasoner, "Person");
    let john = name(&reasoner, "john");
    reasoner
        .load_axioms(vec![class_assertion(person, john, "data")])
        .expect("loads");
    reasoner.reason();
    let before = reasoner.triple_count();

    let report = reasoner.retract_source("never-loaded");
    assert_eq!(report.removed, 0);
    assert_eq!(reasoner.triple_count(), before);
}

#[test]
fn test_counting_invalidation_survives_partial_removal() {
    let reasoner = Reasoner::default();
    let has_parent = name(&reasoner, "hasParent");
    let has_ancestor = name(&reasoner, "hasAncestor");
    let step_parent = name(&reasoner, "hasStepParent");
    let a = name(&reasoner, "a");
    let b = name(&reasoner, "b");

    // Two independent rules derive the same hasAncestor(a, b).
    reasoner
        .load_axioms(vec![
            Axiom::new(AxiomKind::SubRole {
                sub: RoleRef::Named(has_parent),
                sup: RoleRef::Named(has_ancestor),
            }),
            Axiom::new(AxiomKind::SubRole {
                sub: RoleRef::Named(step_parent),
                sup: RoleRef::Named(has_ancestor),
            }),
            role_assertion(has_parent, a, b, "bio"),
            role_assertion(step_parent, a, b, "step"),
        ])
        .expect("loads");
    reasoner.reason();
    assert_eq!(
        reasoner.role_assertions(Some(has_ancestor), None, None).len(),
        1
    );

    // One of two justifications goes away; the derived fact stays.
    reasoner.retract_source("bio");
    assert_eq!(
        reasoner.role_assertions(Some(has_ancestor), None, None).len(),
        1
    );

    // The last justification goes away; the derived fact follows.
    reasoner.retract_source("step");
    assert!(reasoner
        .role_assertions(Some(has_ancestor), None, None)
        .is_empty());
}

#[test]
fn test_multiply_tagged_assertion_needs_all_tags_removed() {
    let reasoner = Reasoner::default();
    let person = name(&reasoner, "Person");
    let john = name(&reasoner, "john");

    reasoner
        .load_axioms(vec![
            class_assertion(person, john, "census"),
            class_assertion(person, john, "registry"),
        ])
        .expect("loads");
    reasoner.reason();

    reasoner.retract_source("census");
    assert_eq!(reasoner.instances_of(person).len(), 1);

    reasoner.retract_source("registry");
    assert!(reasoner.instances_of(person).is_empty());
}

#[test]
fn test_retraction_cascades_through_chains() {
    let reasoner = Reasoner::default();
    let r = name(&reasoner, "r");
    let s = name(&reasoner, "s");
    let t = name(&reasoner, "t");
    let x = name(&reasoner, "x");
    let y = name(&reasoner, "y");

    // r ⊑ s, s ⊑ t: retracting the base fact unwinds both levels.
    reasoner
        .load_axioms(vec![
            Axiom::new(AxiomKind::SubRole {
                sub: RoleRef::Named(r),
                sup: RoleRef::Named(s),
            }),
            Axiom::new(AxiomKind::SubRole {
                sub: RoleRef::Named(s),
                sup: RoleRef::Named(t),
            }),
            role_assertion(r, x, y, "base"),
        ])
        .expect("loads");
    reasoner.reason();
    assert_eq!(reasoner.role_assertions(Some(t), None, None).len(), 1);

    let report = reasoner.retract_source("base");
    assert!(!report.rebuilt);
    assert!(reasoner.role_assertions(Some(r), None, None).is_empty());
    assert!(reasoner.role_assertions(Some(s), None, None).is_empty());
    assert!(reasoner.role_assertions(Some(t), None, None).is_empty());
}

#[test]
fn test_retraction_over_merged_store_rebuilds() {
    let reasoner = Reasoner::default();
    let has_father = name(&reasoner, "hasFather");
    let person = name(&reasoner, "Person");
    let a = name(&reasoner, "a");
    let b = name(&reasoner, "b");
    let c = name(&reasoner, "c");

    reasoner
        .load_axioms(vec![
            Axiom::new(AxiomKind::FunctionalRole {
                role: RoleRef::Named(has_father),
            }),
            role_assertion(has_father, a, b, "keep"),
            role_assertion(has_father, a, c, "drop"),
            class_assertion(person, a, "keep"),
        ])
        .expect("loads");
    reasoner.reason();
    // b and c merged while both assertions were present.
    assert_eq!(
        reasoner.role_assertions(Some(has_father), Some(a), None).len(),
        1
    );

    // Retraction cannot unwind a union-find merge incrementally; the store
    // rebuilds from the surviving asserted facts.
    let report = reasoner.retract_source("drop");
    assert!(report.rebuilt);
    let fathers = reasoner.role_assertions(Some(has_father), Some(a), None);
    assert_eq!(fathers.len(), 1);
    assert_eq!(fathers.cell(0, 2), Some(b));
    // c is no longer merged with b: querying via c finds nothing.
    assert!(reasoner
        .role_assertions(Some(has_father), Some(a), Some(c))
        .is_empty());
    assert_eq!(reasoner.instances_of(person).len(), 1);
}

#[test]
fn test_monotonicity_of_additions() {
    let reasoner = Reasoner::default();
    let person = name(&reasoner, "Person");
    let animal = name(&reasoner, "Animal");
    let john = name(&reasoner, "john");

    reasoner
        .load_axioms(vec![class_assertion(person, john, "data")])
        .expect("loads");
    reasoner.reason();
    let before = reasoner.triple_count();

    reasoner
        .load_axioms(vec![Axiom::new(AxiomKind::SubClassOf {
            sub: ConceptExpr::Atomic(person),
            sup: ConceptExpr::Atomic(animal),
        })])
        .expect("loads");
    reasoner.reason();

    // Adding an axiom only ever adds triples.
    assert!(reasoner.triple_count() > before);
    assert_eq!(reasoner.instances_of(person).len(), 1);
    assert!(reasoner
        .instances_of(reserved::THING)
        .column_values("instance")
        .contains(&john));
}
