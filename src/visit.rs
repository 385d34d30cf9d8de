// -*- coding: utf-8 -*-
// ------------------------------------------------------------------------------------------------
// Copyright © 2022, statement-graphs authors.
// Licensed under either of Apache License, Version 2.0, or MIT license, at your option.
// Please see the LICENSE-APACHE or LICENSE-MIT files in this distribution for license details.
// ------------------------------------------------------------------------------------------------

//! Depth-first traversal over the nodes of a statement graph.

use crate::arena::Handle;
use crate::arena::HandleSet;
use crate::graph::Node;
use crate::graph::StatementGraph;

/// Iterates over the nodes reachable from an entry node in depth-first pre-order.
///
/// Each node is yielded exactly once, no matter how many edges lead to it; cycles and self-loops
/// terminate naturally.  Successors are explored in successor-list order.  The traversal keeps
/// its own explicit stack, so deeply nested graphs cannot overflow the call stack.
pub struct DepthFirstIterator<'a> {
    graph: &'a StatementGraph,
    visited: HandleSet<Node>,
    stack: Vec<Handle<Node>>,
}

impl<'a> DepthFirstIterator<'a> {
    pub fn new(graph: &'a StatementGraph, entry: Handle<Node>) -> DepthFirstIterator<'a> {
        DepthFirstIterator {
            graph,
            visited: HandleSet::new(),
            stack: vec![entry],
        }
    }
}

impl<'a> Iterator for DepthFirstIterator<'a> {
    type Item = Handle<Node>;

    fn next(&mut self) -> Option<Handle<Node>> {
        while let Some(node) = self.stack.pop() {
            if self.visited.contains(node) {
                continue;
            }
            self.visited.add(node);
            // Successors are pushed in reverse so that they pop in list order.
            for successor in self.graph.successors(node).iter().rev() {
                if !self.visited.contains(*successor) {
                    self.stack.push(*successor);
                }
            }
            return Some(node);
        }
        None
    }
}

impl StatementGraph {
    /// Returns an iterator over the nodes reachable from `entry`, in depth-first pre-order.
    pub fn depth_first(&self, entry: Handle<Node>) -> DepthFirstIterator<'_> {
        DepthFirstIterator::new(self, entry)
    }
}
