// -*- coding: utf-8 -*-
// ------------------------------------------------------------------------------------------------
// Copyright © 2022, statement-graphs authors.
// Licensed under either of Apache License, Version 2.0, or MIT license, at your option.
// Please see the LICENSE-APACHE or LICENSE-MIT files in this distribution for license details.
// ------------------------------------------------------------------------------------------------

use statement_graphs::equiv::EquivMap;
use statement_graphs::equiv::EquivSet;
use statement_graphs::equiv::NodeEquivalence;
use statement_graphs::equiv::SequenceEquivalence;
use statement_graphs::graph::StatementGraph;

use crate::test_graphs;

#[test]
fn equiv_map_buckets_keys_by_node_equivalence() {
    let mut graph = StatementGraph::new();
    let assign1 = test_graphs::assign_node(&mut graph);
    let assign2 = test_graphs::assign_node(&mut graph);
    let ret = test_graphs::return_node(&mut graph);

    let mut map = EquivMap::new(NodeEquivalence::new(&graph));
    assert!(map.is_empty());
    assert_eq!(map.insert(assign1, "first"), None);
    // An equivalent key replaces the value; the first-seen key stays the representative.
    assert_eq!(map.insert(assign2, "second"), Some("first"));
    assert_eq!(map.len(), 1);
    assert_eq!(map.get(&assign1), Some(&"second"));
    assert_eq!(map.get(&assign2), Some(&"second"));

    assert_eq!(map.insert(ret, "other"), None);
    assert_eq!(map.len(), 2);
    assert!(map.contains_key(&ret));

    assert_eq!(map.remove(&assign2), Some("second"));
    assert_eq!(map.len(), 1);
    assert_eq!(map.get(&assign1), None);
}

#[test]
fn equiv_map_supports_in_place_updates() {
    let mut graph = StatementGraph::new();
    let assign1 = test_graphs::assign_node(&mut graph);
    let assign2 = test_graphs::assign_node(&mut graph);

    let mut map = EquivMap::new(NodeEquivalence::new(&graph));
    map.insert(assign1, 1usize);
    *map.get_mut(&assign2).unwrap() += 1;
    assert_eq!(map.get(&assign1), Some(&2));
}

#[test]
fn equiv_set_deduplicates_equivalent_nodes() {
    let mut graph = StatementGraph::new();
    let assign1 = test_graphs::assign_node(&mut graph);
    let assign2 = test_graphs::assign_node(&mut graph);
    let ret = test_graphs::return_node(&mut graph);

    let mut set = EquivSet::new(NodeEquivalence::new(&graph));
    assert!(set.insert(assign1));
    assert!(!set.insert(assign2));
    assert!(set.insert(ret));
    assert_eq!(set.len(), 2);
    assert!(set.contains(&assign1));
    assert!(set.contains(&assign2));
    assert!(set.contains(&ret));
}

#[test]
fn sequences_are_equivalent_elementwise() {
    let mut graph = StatementGraph::new();
    let assign1 = test_graphs::assign_node(&mut graph);
    let assign2 = test_graphs::assign_node(&mut graph);
    let invoke1 = test_graphs::invoke_node(&mut graph, "foo");
    let invoke2 = test_graphs::invoke_node(&mut graph, "foo");
    let other_invoke = test_graphs::invoke_node(&mut graph, "bar");

    let mut set = EquivSet::new(SequenceEquivalence::new(&graph));
    assert!(set.insert(vec![assign1, invoke1]));
    // Same statement kinds and shapes in the same order: the same sequence.
    assert!(!set.insert(vec![assign2, invoke2]));
    // A different method, a different order, or a different length is a different sequence.
    assert!(set.insert(vec![assign1, other_invoke]));
    assert!(set.insert(vec![invoke1, assign1]));
    assert!(set.insert(vec![assign1, invoke1, invoke2]));
    assert_eq!(set.len(), 4);
}
