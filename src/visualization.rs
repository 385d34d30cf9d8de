// -*- coding: utf-8 -*-
// ------------------------------------------------------------------------------------------------
// Copyright © 2022, statement-graphs authors.
// Licensed under either of Apache License, Version 2.0, or MIT license, at your option.
// Please see the LICENSE-APACHE or LICENSE-MIT files in this distribution for license details.
// ------------------------------------------------------------------------------------------------

//! Renders statement graphs as GraphViz DOT, for eyeballing a graph while debugging the
//! algorithms that walk it.  The output is a plain `digraph`: one ellipse per reachable node,
//! labelled with its displayed statement, and one edge per successor entry.

use crate::arena::Handle;
use crate::arena::HandleSet;
use crate::graph::Node;
use crate::graph::StatementGraph;

/// Renders the part of a statement graph that is reachable from one entry node.
pub struct DotRenderer<'a> {
    graph: &'a StatementGraph,
    result: String,
    visited: HandleSet<Node>,
}

impl<'a> DotRenderer<'a> {
    pub fn new(graph: &'a StatementGraph) -> DotRenderer<'a> {
        DotRenderer {
            graph,
            result: String::new(),
            visited: HandleSet::new(),
        }
    }

    /// Renders the graph from `entry` into a DOT string named `name`.
    pub fn render(mut self, name: &str, entry: Handle<Node>) -> String {
        self.result.push_str(&format!("digraph \"{}\" {{\n", name));
        self.render_node(entry);
        self.result.push('}');
        self.result
    }

    fn render_node(&mut self, node: Handle<Node>) {
        self.visited.add(node);
        self.result.push_str(&format!(
            "    \"{}\" [shape=ellipse, label=\"{}\"]\n",
            node.as_u32(),
            node_label(self.graph, node),
        ));
        let successors = self.graph[node].successors().to_vec();
        for successor in successors {
            self.result.push_str(&format!(
                "    \"{}\" -> \"{}\"\n",
                node.as_u32(),
                successor.as_u32(),
            ));
            if !self.visited.contains(successor) {
                self.render_node(successor);
            }
        }
    }
}

// Statement displays can contain string literals; a quote would end the DOT label early.
fn node_label(graph: &StatementGraph, node: Handle<Node>) -> String {
    node.display(graph).to_string().replace('"', "^")
}
