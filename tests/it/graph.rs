// -*- coding: utf-8 -*-
// ------------------------------------------------------------------------------------------------
// Copyright © 2022, statement-graphs authors.
// Licensed under either of Apache License, Version 2.0, or MIT license, at your option.
// Please see the LICENSE-APACHE or LICENSE-MIT files in this distribution for license details.
// ------------------------------------------------------------------------------------------------

use std::collections::HashSet;

use maplit::hashset;
use statement_graphs::graph::BinaryOperator;
use statement_graphs::graph::Statement;
use statement_graphs::graph::StatementGraph;

use crate::test_graphs;

#[test]
fn can_create_symbols() {
    let mut graph = StatementGraph::new();
    let a1 = graph.add_symbol("a");
    let a2 = graph.add_symbol("a");
    let b = graph.add_symbol("b");
    let c = graph.add_symbol("c");
    let empty = graph.add_symbol("");
    // The content of each symbol should be comparable
    assert_eq!(&graph[a1], &graph[a2]);
    assert_eq!(&graph[a1], "a");
    assert_ne!(&graph[a1], &graph[b]);
    assert_ne!(&graph[b], &graph[c]);
    assert_ne!(&graph[empty], &graph[a1]);
    // and because we deduplicate symbols, the handles should be comparable too.
    assert_eq!(a1, a2);
    assert_ne!(a1, b);
    assert_ne!(b, c);
    assert_ne!(empty, a1);
}

#[test]
fn can_iterate_symbols() {
    let mut graph = StatementGraph::new();
    graph.add_symbol("a");
    graph.add_symbol("b");
    graph.add_symbol("c");
    // We should get all of the symbols that we've created — though there's no guarantee in which
    // order they'll come out of the iterator.
    let symbols = graph
        .iter_symbols()
        .map(|symbol| &graph[symbol])
        .collect::<HashSet<_>>();
    assert_eq!(symbols, hashset! {"a", "b", "c"});
}

#[test]
fn can_display_symbols() {
    let mut graph = StatementGraph::new();
    graph.add_symbol("a");
    graph.add_symbol("b");
    graph.add_symbol("c");
    let mut symbols = graph
        .iter_symbols()
        .map(|symbol| symbol.display(&graph).to_string())
        .collect::<Vec<_>>();
    symbols.sort();
    assert_eq!(symbols, vec!["a", "b", "c"]);
}

#[test]
fn can_create_value_types() {
    let mut graph = StatementGraph::new();
    let object = graph.add_value_type("Object", None);
    let string1 = graph.add_value_type("String", Some(object));
    // Value types are deduplicated by name, and the supertype given at first registration wins.
    let string2 = graph.add_value_type("String", None);
    assert_eq!(string1, string2);
    assert_eq!(graph[string1].supertype.into_option(), Some(object));
    assert_eq!(graph[object].supertype.into_option(), None);
    assert_eq!(string1.display(&graph).to_string(), "String");
}

#[test]
fn can_relate_value_types() {
    let mut graph = StatementGraph::new();
    let object = graph.add_value_type("Object", None);
    let number = graph.add_value_type("Number", Some(object));
    let integer = graph.add_value_type("Integer", Some(number));
    let string = graph.add_value_type("String", Some(object));
    assert!(graph.is_subtype_of(integer, number));
    assert!(graph.is_subtype_of(integer, object));
    assert!(!graph.is_subtype_of(object, integer));
    // A type is not a subtype of itself, but it is compatible with itself.
    assert!(!graph.is_subtype_of(integer, integer));
    assert!(graph.value_types_compatible(integer, integer));
    assert!(graph.value_types_compatible(integer, object));
    assert!(graph.value_types_compatible(object, integer));
    // Sibling types do not become compatible through their common supertype.
    assert!(!graph.value_types_compatible(integer, string));
    assert!(!graph.value_types_compatible(string, number));
}

#[test]
fn can_create_values_without_deduplication() {
    let mut graph = StatementGraph::new();
    let int = test_graphs::int_type(&mut graph);
    let x1 = graph.add_local("x", int);
    let x2 = graph.add_local("x", int);
    // Every added value is a fresh handle, even for the same name; reusing a variable means
    // reusing its handle.
    assert_ne!(x1, x2);
    assert!(graph.values_equivalent(x1, x2));
}

#[test]
fn values_match_by_shape() {
    let mut graph = StatementGraph::new();
    let int = test_graphs::int_type(&mut graph);
    let string = graph.add_value_type("String", None);

    let x = graph.add_local("x", int);
    let y = graph.add_local("y", int);
    let s = graph.add_local("s", string);
    let one = graph.add_constant("1", int);
    let two = graph.add_constant("2", int);
    assert!(graph.values_equivalent(x, y));
    assert!(graph.values_equivalent(one, two));
    assert!(!graph.values_equivalent(x, one));
    // Types gate equivalence even when the shapes agree.
    assert!(!graph.values_equivalent(x, s));

    let sum1 = graph.add_binary(BinaryOperator::Add, x, one, int);
    let sum2 = graph.add_binary(BinaryOperator::Add, y, two, int);
    let difference = graph.add_binary(BinaryOperator::Sub, x, one, int);
    assert!(graph.values_equivalent(sum1, sum2));
    assert!(!graph.values_equivalent(sum1, difference));

    let call1 = graph.add_invocation("frobnicate", Some(x), &[one], int);
    let call2 = graph.add_invocation("frobnicate", Some(y), &[two], int);
    let other_method = graph.add_invocation("tweak", Some(x), &[one], int);
    let other_arity = graph.add_invocation("frobnicate", Some(x), &[one, two], int);
    let no_receiver = graph.add_invocation("frobnicate", None, &[one], int);
    assert!(graph.values_equivalent(call1, call2));
    assert!(!graph.values_equivalent(call1, other_method));
    assert!(!graph.values_equivalent(call1, other_arity));
    assert!(!graph.values_equivalent(call1, no_receiver));
}

#[test]
fn nodes_are_equivalent_by_kind_and_shape() {
    let mut graph = StatementGraph::new();
    let assign1 = test_graphs::assign_node(&mut graph);
    let assign2 = test_graphs::assign_node(&mut graph);
    let ret = test_graphs::return_node(&mut graph);
    assert!(graph.nodes_equivalent(assign1, assign2));
    assert!(!graph.nodes_equivalent(assign1, ret));
    assert_eq!(
        graph.node_equiv_hash(assign1),
        graph.node_equiv_hash(assign2)
    );

    // Branch targets do not participate in equivalence.
    let goto1 = test_graphs::goto_node(&mut graph, assign1);
    let goto2 = test_graphs::goto_node(&mut graph, ret);
    assert!(graph.nodes_equivalent(goto1, goto2));
    assert_eq!(graph.node_equiv_hash(goto1), graph.node_equiv_hash(goto2));

    let condition1 = test_graphs::relational_condition(&mut graph);
    let condition2 = test_graphs::relational_condition(&mut graph);
    let if1 = test_graphs::if_node(&mut graph, condition1, assign1, ret);
    let if2 = test_graphs::if_node(&mut graph, condition2, assign2, assign1);
    assert!(graph.nodes_equivalent(if1, if2));

    // Statements of differing kinds never compare equivalent, targets or not.
    assert!(!graph.nodes_equivalent(goto1, if1));
}

#[test]
fn can_add_and_deduplicate_edges() {
    let mut graph = StatementGraph::new();
    let n1 = test_graphs::assign_node(&mut graph);
    let n2 = test_graphs::assign_node(&mut graph);
    let n3 = test_graphs::assign_node(&mut graph);
    graph.add_edge(n1, n2);
    graph.add_edge(n1, n2);
    graph.add_edge(n1, n3);
    assert_eq!(graph.successors(n1), &[n2, n3]);
    assert_eq!(graph.successors(n2), &[]);
}

#[test]
fn can_iterate_nodes_in_insertion_order() {
    let mut graph = StatementGraph::new();
    let n1 = test_graphs::assign_node(&mut graph);
    let n2 = test_graphs::return_node(&mut graph);
    let n3 = test_graphs::assign_node(&mut graph);
    let handles = graph.iter_nodes().collect::<Vec<_>>();
    assert_eq!(handles, vec![n1, n2, n3]);
}

#[test]
fn can_copy_nodes() {
    let mut graph = StatementGraph::new();
    let original = test_graphs::assign_node(&mut graph);
    let successor = test_graphs::return_node(&mut graph);
    graph.add_edge(original, successor);
    let copy = graph.copy_node(original);
    assert_ne!(copy, original);
    assert!(graph.nodes_equivalent(copy, original));
    assert_eq!(graph.successors(copy), graph.successors(original));
}

#[test]
fn can_display_statements() {
    let mut graph = StatementGraph::new();
    let int = test_graphs::int_type(&mut graph);
    let object = graph.add_value_type("Object", None);

    let local = graph.add_local("local", int);
    let zero = graph.add_constant("0", int);
    let assign = graph.add_node(Statement::Assign {
        target: local,
        source: zero,
    });
    assert_eq!(assign.display(&graph).to_string(), "local = 0");

    let bare_call = graph.add_invocation("foo", None, &[], int);
    let bare_invoke = graph.add_node(Statement::Invoke { call: bare_call });
    assert_eq!(bare_invoke.display(&graph).to_string(), "foo()");

    let receiver = graph.add_local("r", object);
    let x = graph.add_local("x", int);
    let seven = graph.add_constant("7", int);
    let call = graph.add_invocation("frobnicate", Some(receiver), &[x, seven], int);
    let invoke = graph.add_node(Statement::Invoke { call });
    assert_eq!(invoke.display(&graph).to_string(), "r.frobnicate(x, 7)");

    let condition = test_graphs::relational_condition(&mut graph);
    let branch = graph.add_node(Statement::If {
        condition,
        target: assign,
    });
    assert_eq!(
        branch.display(&graph).to_string(),
        format!("if 1 == 2 goto [{}]", assign.as_u32())
    );

    let goto = graph.add_node(Statement::Goto { target: assign });
    assert_eq!(
        goto.display(&graph).to_string(),
        format!("goto [{}]", assign.as_u32())
    );

    let key = graph.add_local("key", int);
    let switch = test_graphs::switch_node(&mut graph, key, assign, &[bare_invoke, invoke]);
    assert_eq!(
        switch.display(&graph).to_string(),
        format!(
            "switch key [{}, {}] default [{}]",
            bare_invoke.as_u32(),
            invoke.as_u32(),
            assign.as_u32()
        )
    );

    let ret = graph.add_node(Statement::Return { value: x });
    assert_eq!(ret.display(&graph).to_string(), "return x");
    let ret_void = graph.add_node(Statement::ReturnVoid);
    assert_eq!(ret_void.display(&graph).to_string(), "return");
    let throw = graph.add_node(Statement::Throw { value: x });
    assert_eq!(throw.display(&graph).to_string(), "throw x");
    let exit = graph.add_node(Statement::Exit);
    assert_eq!(exit.display(&graph).to_string(), "<exit>");
}
