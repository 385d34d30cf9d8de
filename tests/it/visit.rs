// -*- coding: utf-8 -*-
// ------------------------------------------------------------------------------------------------
// Copyright © 2022, statement-graphs authors.
// Licensed under either of Apache License, Version 2.0, or MIT license, at your option.
// Please see the LICENSE-APACHE or LICENSE-MIT files in this distribution for license details.
// ------------------------------------------------------------------------------------------------

use statement_graphs::graph::StatementGraph;

use crate::test_graphs;

#[test]
fn can_visit_a_single_node() {
    let mut graph = StatementGraph::new();
    let only = test_graphs::return_node(&mut graph);
    let visited = graph.depth_first(only).collect::<Vec<_>>();
    assert_eq!(visited, vec![only]);
}

#[test]
fn visits_successors_in_list_order() {
    let mut graph = StatementGraph::new();
    let entry = test_graphs::assign_node(&mut graph);
    let left = test_graphs::assign_node(&mut graph);
    let right = test_graphs::assign_node(&mut graph);
    let join = test_graphs::return_node(&mut graph);
    graph.add_edge(entry, left);
    graph.add_edge(entry, right);
    graph.add_edge(left, join);
    graph.add_edge(right, join);
    // Pre-order: the first successor's whole subtree comes before the second successor, and the
    // join node is only visited once.
    let visited = graph.depth_first(entry).collect::<Vec<_>>();
    assert_eq!(visited, vec![entry, left, join, right]);
}

#[test]
fn visits_cycles_once() {
    let mut graph = StatementGraph::new();
    let a = test_graphs::assign_node(&mut graph);
    let b = test_graphs::assign_node(&mut graph);
    let c = test_graphs::assign_node(&mut graph);
    graph.add_edge(a, b);
    graph.add_edge(b, c);
    graph.add_edge(c, a);
    let visited = graph.depth_first(a).collect::<Vec<_>>();
    assert_eq!(visited, vec![a, b, c]);
}

#[test]
fn skips_unreachable_nodes() {
    let mut graph = StatementGraph::new();
    let entry = test_graphs::assign_node(&mut graph);
    let next = test_graphs::return_node(&mut graph);
    let unreachable = test_graphs::assign_node(&mut graph);
    graph.add_edge(entry, next);
    graph.add_edge(unreachable, next);
    let visited = graph.depth_first(entry).collect::<Vec<_>>();
    assert_eq!(visited, vec![entry, next]);
}
