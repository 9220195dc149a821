//! Query engine integration tests
//!
//! Covers join planning, UNION/MINUS semantics, filters, solution
//! modifiers, snapshot isolation and the graph-traversal operator.

use owl2_rl_reasoner::constants::{rdf, xsd};
use owl2_rl_reasoner::{
    iri, lit, typed_lit, var, Axiom, AxiomKind, CompareOp, ConceptExpr, FilterExpr, FilterValue,
    GroupPattern, Query, Reasoner, RlError, RoleRef, SortDirection, TermId, TriplePattern,
};

const EX: &str = "http://example.org/";

fn ex(local: &str) -> String {
    format!("{}{}", EX, local)
}

fn name(reasoner: &Reasoner, local: &str) -> TermId {
    reasoner.intern(&ex(local))
}

fn class_assertion(concept: TermId, individual: TermId) -> Axiom {
    Axiom::new(AxiomKind::ClassAssertion {
        concept: ConceptExpr::Atomic(concept),
        individual,
    })
}

fn role_assertion(role: TermId, subject: TermId, object: TermId) -> Axiom {
    Axiom::new(AxiomKind::RoleAssertion {
        role: RoleRef::Named(role),
        subject,
        object,
    })
}

fn data_assertion(role: TermId, subject: TermId, value: TermId) -> Axiom {
    Axiom::new(AxiomKind::DataAssertion {
        role,
        subject,
        value,
    })
}

/// People with names and ages, some typed Person, some Doctor.
fn people_fixture() -> Reasoner {
    let reasoner = Reasoner::default();
    let person = name(&reasoner, "Person");
    let doctor = name(&reasoner, "Doctor");
    let has_name = name(&reasoner, "name");
    let age = name(&reasoner, "age");
    let works_for = name(&reasoner, "worksFor");
    let acme = name(&reasoner, "acme");

    let alice = name(&reasoner, "alice");
    let bob = name(&reasoner, "bob");
    let carol = name(&reasoner, "carol");

    let alice_name = reasoner.intern_literal("Alice", None);
    let bob_name = reasoner.intern_literal("Bob", None);
    let carol_name = reasoner.intern_literal("Carol", None);
    let age30 = reasoner.intern_literal("30", Some(xsd::INTEGER));
    let age40 = reasoner.intern_literal("40", Some(xsd::INTEGER));
    let age25 = reasoner.intern_literal("25", Some(xsd::INTEGER));

    reasoner
        .load_axioms(vec![
            class_assertion(person, alice),
            class_assertion(doctor, bob),
            class_assertion(person, carol),
            data_assertion(has_name, alice, alice_name),
            data_assertion(has_name, bob, bob_name),
            data_assertion(has_name, carol, carol_name),
            data_assertion(age, alice, age30),
            data_assertion(age, bob, age40),
            data_assertion(age, carol, age25),
            role_assertion(works_for, alice, acme),
        ])
        .expect("loads");
    reasoner.reason();
    reasoner
}

#[test]
fn test_basic_join_over_shared_variable() {
    let reasoner = people_fixture();
    let table = reasoner
        .select(
            &Query::select(&["x", "n"])
                .pattern(var("x"), iri(rdf::TYPE), iri(&ex("Person")))
                .pattern(var("x"), iri(&ex("name")), var("n")),
        )
        .expect("query runs");
    assert_eq!(table.len(), 2);
    let people = table.column_values("x");
    assert!(people.contains(&reasoner.term(&ex("alice")).unwrap()));
    assert!(people.contains(&reasoner.term(&ex("carol")).unwrap()));
}

#[test]
fn test_s5_double_union_with_outer_pattern() {
    let reasoner = people_fixture();
    let union_block = || {
        vec![
            GroupPattern::new(vec![TriplePattern::new(
                var("x"),
                iri(rdf::TYPE),
                iri(&ex("Person")),
            )]),
            GroupPattern::new(vec![TriplePattern::new(
                var("x"),
                iri(rdf::TYPE),
                iri(&ex("Doctor")),
            )]),
        ]
    };
    // { ?x type Person } UNION { ?x type Doctor } . ?x name ?n .
    // { ?x type Person } UNION { ?x type Doctor }
    let table = reasoner
        .select(
            &Query::select(&["x"])
                .pattern(var("x"), iri(&ex("name")), var("n"))
                .union(union_block())
                .union(union_block())
                .distinct(),
        )
        .expect("query runs");
    // All three individuals match a branch; the second UNION block must not
    // collapse the result to empty.
    assert_eq!(table.len(), 3);
}

#[test]
fn test_union_branches_concatenate() {
    let reasoner = people_fixture();
    let table = reasoner
        .select(
            &Query::select(&["x"])
                .union(vec![
                    GroupPattern::new(vec![TriplePattern::new(
                        var("x"),
                        iri(rdf::TYPE),
                        iri(&ex("Person")),
                    )]),
                    GroupPattern::new(vec![TriplePattern::new(
                        var("x"),
                        iri(rdf::TYPE),
                        iri(&ex("Doctor")),
                    )]),
                ])
                .distinct(),
        )
        .expect("query runs");
    assert_eq!(table.len(), 3);
}

#[test]
fn test_minus_anti_join() {
    let reasoner = people_fixture();
    // Persons that do not work for anyone.
    let table = reasoner
        .select(
            &Query::select(&["x"])
                .pattern(var("x"), iri(rdf::TYPE), iri(&ex("Person")))
                .minus(GroupPattern::new(vec![TriplePattern::new(
                    var("x"),
                    iri(&ex("worksFor")),
                    var("y"),
                )])),
        )
        .expect("query runs");
    assert_eq!(table.len(), 1);
    assert_eq!(table.cell(0, 0), reasoner.term(&ex("carol")));
}

#[test]
fn test_minus_without_shared_variables_keeps_everything() {
    let reasoner = people_fixture();
    let table = reasoner
        .select(
            &Query::select(&["x"])
                .pattern(var("x"), iri(rdf::TYPE), iri(&ex("Person")))
                .minus(GroupPattern::new(vec![TriplePattern::new(
                    var("z"),
                    iri(rdf::TYPE),
                    iri(&ex("Doctor")),
                )])),
        )
        .expect("query runs");
    // ?z is disjoint from the outer solution; nothing is removed.
    assert_eq!(table.len(), 2);
}

#[test]
fn test_filter_pushdown_on_numeric_literal() {
    let reasoner = people_fixture();
    let table = reasoner
        .select(
            &Query::select(&["x"])
                .pattern(var("x"), iri(&ex("age")), var("a"))
                .filter(FilterExpr::Compare(
                    CompareOp::Ge,
                    FilterValue::Var("a".to_string()),
                    FilterValue::Literal {
                        lexical: "30".to_string(),
                        datatype: Some(xsd::INTEGER.to_string()),
                    },
                )),
        )
        .expect("query runs");
    assert_eq!(table.len(), 2);
}

#[test]
fn test_filter_type_error_drops_row() {
    let reasoner = people_fixture();
    // Comparing a string name numerically is a type error; those rows fail
    // the filter rather than aborting the query.
    let table = reasoner
        .select(
            &Query::select(&["x"])
                .pattern(var("x"), iri(&ex("name")), var("n"))
                .filter(FilterExpr::Compare(
                    CompareOp::Lt,
                    FilterValue::Var("n".to_string()),
                    FilterValue::Literal {
                        lexical: "10".to_string(),
                        datatype: Some(xsd::INTEGER.to_string()),
                    },
                )),
        )
        .expect("query runs");
    assert!(table.is_empty());
}

#[test]
fn test_string_filters() {
    let reasoner = people_fixture();
    let starts = reasoner
        .select(
            &Query::select(&["x"])
                .pattern(var("x"), iri(&ex("name")), var("n"))
                .filter(FilterExpr::StartsWith(
                    FilterValue::Var("n".to_string()),
                    FilterValue::Literal {
                        lexical: "A".to_string(),
                        datatype: None,
                    },
                )),
        )
        .expect("query runs");
    assert_eq!(starts.len(), 1);

    let regex = reasoner
        .select(
            &Query::select(&["x"])
                .pattern(var("x"), iri(&ex("name")), var("n"))
                .filter(FilterExpr::Regex(
                    FilterValue::Var("n".to_string()),
                    "^(Alice|Bob)$".to_string(),
                )),
        )
        .expect("query runs");
    assert_eq!(regex.len(), 2);
}

#[test]
fn test_modifier_pipeline_order() {
    let reasoner = people_fixture();
    // Ages descending: 40, 30, 25. Offset 1 + limit 1 picks 30.
    let table = reasoner
        .select(
            &Query::select(&["x", "a"])
                .pattern(var("x"), iri(&ex("age")), var("a"))
                .order_by("a", SortDirection::Desc)
                .offset(1)
                .limit(1),
        )
        .expect("query runs");
    assert_eq!(table.len(), 1);
    assert_eq!(table.render(0, 1).as_deref(), Some("\"30\""));
}

#[test]
fn test_distinct_deduplicates_projection() {
    let reasoner = people_fixture();
    // Projecting only the type column over all typed individuals repeats
    // owl:Thing three times without DISTINCT.
    let plain = reasoner
        .select(&Query::select(&["t"]).pattern(var("x"), iri(rdf::TYPE), var("t")))
        .expect("query runs");
    let deduped = reasoner
        .select(
            &Query::select(&["t"])
                .pattern(var("x"), iri(rdf::TYPE), var("t"))
                .distinct(),
        )
        .expect("query runs");
    assert!(plain.len() > deduped.len());
}

#[test]
fn test_unknown_constant_yields_empty_result() {
    let reasoner = people_fixture();
    let table = reasoner
        .select(
            &Query::select(&["x"]).pattern(var("x"), iri(rdf::TYPE), iri(&ex("NeverMentioned"))),
        )
        .expect("query runs");
    assert!(table.is_empty());
    assert!(reasoner
        .events()
        .iter()
        .any(|e| matches!(e, owl2_rl_reasoner::ReasonerEvent::UnknownTerm { .. })));
}

#[test]
fn test_unknown_literal_yields_empty_result() {
    let reasoner = people_fixture();
    let table = reasoner
        .select(
            &Query::select(&["x"]).pattern(var("x"), iri(&ex("name")), lit("Nobody")),
        )
        .expect("query runs");
    assert!(table.is_empty());
}

#[test]
fn test_invalid_query_select_variable() {
    let reasoner = people_fixture();
    let result = reasoner.select(
        &Query::select(&["missing"]).pattern(var("x"), iri(rdf::TYPE), iri(&ex("Person"))),
    );
    assert!(matches!(result, Err(RlError::InvalidQuery(_))));

    // A variable bound only inside MINUS cannot be selected.
    let result = reasoner.select(
        &Query::select(&["y"])
            .pattern(var("x"), iri(rdf::TYPE), iri(&ex("Person")))
            .minus(GroupPattern::new(vec![TriplePattern::new(
                var("x"),
                iri(&ex("worksFor")),
                var("y"),
            )])),
    );
    assert!(matches!(result, Err(RlError::InvalidQuery(_))));
}

#[test]
fn test_ask_and_describe() {
    let reasoner = people_fixture();
    let yes = reasoner
        .ask(&Query::select(&["x"]).pattern(var("x"), iri(rdf::TYPE), iri(&ex("Doctor"))))
        .expect("ask runs");
    assert!(yes);

    let alice = reasoner.term(&ex("alice")).unwrap();
    let description = reasoner.describe(alice);
    // type Person, type Thing, name, age, worksFor.
    assert_eq!(description.len(), 5);
}

#[test]
fn test_snapshot_isolation_across_writes() {
    let reasoner = people_fixture();
    let snapshot = reasoner.snapshot();
    let person = reasoner.term(&ex("Person")).unwrap();
    let dave = name(&reasoner, "dave");

    reasoner
        .load_axioms(vec![class_assertion(person, dave)])
        .expect("loads");
    reasoner.reason();

    let now = reasoner
        .select(&Query::select(&["x"]).pattern(var("x"), iri(rdf::TYPE), iri(&ex("Person"))))
        .expect("query runs");
    assert_eq!(now.len(), 3);

    let before = reasoner
        .select_at(
            snapshot,
            &Query::select(&["x"]).pattern(var("x"), iri(rdf::TYPE), iri(&ex("Person"))),
        )
        .expect("query runs");
    assert_eq!(before.len(), 2);
}

#[test]
fn test_plan_cache_hits_on_same_shape() {
    let reasoner = people_fixture();
    let first = Query::select(&["x"]).pattern(var("x"), iri(rdf::TYPE), iri(&ex("Person")));
    let second = Query::select(&["y"]).pattern(var("y"), iri(rdf::TYPE), iri(&ex("Doctor")));
    reasoner.select(&first).expect("query runs");
    reasoner.select(&second).expect("query runs");

    let stats = reasoner.query_stats();
    assert!(stats.plan_cache_hits >= 1);
}

#[test]
fn test_cross_product_is_explicit_not_an_error() {
    let reasoner = people_fixture();
    let table = reasoner
        .select(
            &Query::select(&["x", "y"])
                .pattern(var("x"), iri(rdf::TYPE), iri(&ex("Person")))
                .pattern(var("y"), iri(rdf::TYPE), iri(&ex("Doctor"))),
        )
        .expect("query runs");
    // 2 persons x 1 doctor.
    assert_eq!(table.len(), 2);
}

#[test]
fn test_s6_graph_traversal_subgraph() {
    let reasoner = Reasoner::default();
    let edge = name(&reasoner, "edge");
    let nodes: Vec<TermId> = ["A", "B", "C", "D", "E", "F", "G"]
        .iter()
        .map(|n| name(&reasoner, n))
        .collect();
    reasoner
        .load_axioms(vec![
            role_assertion(edge, nodes[0], nodes[1]),
            role_assertion(edge, nodes[1], nodes[2]),
            role_assertion(edge, nodes[1], nodes[3]),
            role_assertion(edge, nodes[4], nodes[5]),
            role_assertion(edge, nodes[5], nodes[6]),
        ])
        .expect("loads");
    reasoner.reason();

    let mut subgraph = reasoner.subgraph(edge, nodes[0], 2);
    subgraph.sort();
    let mut expected = vec![
        (nodes[0], nodes[1]),
        (nodes[1], nodes[2]),
        (nodes[1], nodes[3]),
    ];
    expected.sort();
    assert_eq!(subgraph, expected);

    let missing = name(&reasoner, "NONEXISTENT");
    assert!(reasoner.subgraph(edge, missing, 2).is_empty());
    assert!(reasoner.subgraph(edge, nodes[0], 0).is_empty());
}

#[test]
fn test_table_json_export() {
    let reasoner = people_fixture();
    let table = reasoner
        .select(
            &Query::select(&["x", "n"])
                .pattern(var("x"), iri(rdf::TYPE), iri(&ex("Person")))
                .pattern(var("x"), iri(&ex("name")), var("n")),
        )
        .expect("query runs");
    let json = table.to_json();
    assert!(json.contains("alice") || json.contains("Alice"));
}

#[test]
fn test_typed_literal_constant_in_pattern() {
    let reasoner = people_fixture();
    let table = reasoner
        .select(
            &Query::select(&["x"]).pattern(
                var("x"),
                iri(&ex("age")),
                typed_lit("30", xsd::INTEGER),
            ),
        )
        .expect("query runs");
    assert_eq!(table.len(), 1);
    assert_eq!(table.cell(0, 0), reasoner.term(&ex("alice")));
}
