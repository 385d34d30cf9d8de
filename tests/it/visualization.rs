// -*- coding: utf-8 -*-
// ------------------------------------------------------------------------------------------------
// Copyright © 2022, statement-graphs authors.
// Licensed under either of Apache License, Version 2.0, or MIT license, at your option.
// Please see the LICENSE-APACHE or LICENSE-MIT files in this distribution for license details.
// ------------------------------------------------------------------------------------------------

use pretty_assertions::assert_eq;
use statement_graphs::graph::StatementGraph;
use statement_graphs::visualization::DotRenderer;

use crate::test_graphs;

#[test]
fn can_render_a_chain_as_dot() {
    let mut graph = StatementGraph::new();
    let assign = test_graphs::assign_node(&mut graph);
    let end = test_graphs::return_node(&mut graph);
    graph.add_edge(assign, end);

    let rendered = DotRenderer::new(&graph).render("chain", assign);
    let expected = format!(
        concat!(
            "digraph \"chain\" {{\n",
            "    \"{a}\" [shape=ellipse, label=\"local = 0\"]\n",
            "    \"{a}\" -> \"{e}\"\n",
            "    \"{e}\" [shape=ellipse, label=\"return\"]\n",
            "}}",
        ),
        a = assign.as_u32(),
        e = end.as_u32(),
    );
    assert_eq!(rendered, expected);
}

#[test]
fn rendering_declares_shared_descendants_once() {
    let mut graph = StatementGraph::new();
    let condition = test_graphs::relational_condition(&mut graph);
    let then_branch = test_graphs::assign_node(&mut graph);
    let else_branch = test_graphs::assign_node(&mut graph);
    let end = test_graphs::return_node(&mut graph);
    let branch = test_graphs::if_node(&mut graph, condition, then_branch, else_branch);
    graph.add_edge(then_branch, end);
    graph.add_edge(else_branch, end);

    // The join point is declared under the then arm; the else arm only adds its edge to it.
    let rendered = DotRenderer::new(&graph).render("diamond", branch);
    let expected = format!(
        concat!(
            "digraph \"diamond\" {{\n",
            "    \"{b}\" [shape=ellipse, label=\"if 1 == 2 goto [{e}]\"]\n",
            "    \"{b}\" -> \"{t}\"\n",
            "    \"{t}\" [shape=ellipse, label=\"local = 0\"]\n",
            "    \"{t}\" -> \"{n}\"\n",
            "    \"{n}\" [shape=ellipse, label=\"return\"]\n",
            "    \"{b}\" -> \"{e}\"\n",
            "    \"{e}\" [shape=ellipse, label=\"local = 0\"]\n",
            "    \"{e}\" -> \"{n}\"\n",
            "}}",
        ),
        b = branch.as_u32(),
        t = then_branch.as_u32(),
        e = else_branch.as_u32(),
        n = end.as_u32(),
    );
    assert_eq!(rendered, expected);
}
