// -*- coding: utf-8 -*-
// ------------------------------------------------------------------------------------------------
// Copyright © 2022, statement-graphs authors.
// Licensed under either of Apache License, Version 2.0, or MIT license, at your option.
// Please see the LICENSE-APACHE or LICENSE-MIT files in this distribution for license details.
// ------------------------------------------------------------------------------------------------

//! Enumerates the control-flow paths of a statement graph.
//!
//! Pattern detection does not work on graphs directly; it works on _paths_, the straight-line
//! node sequences a single execution could take.  This module turns a graph into its bounded set
//! of paths:
//!
//! 1. A synthetic [exit sentinel][] is attached below every leaf of the graph (or below the last
//!    node in traversal order, if a cycle leaves the graph without leaves), so that every path
//!    has a uniform end marker.
//! 2. A recursive depth-first search collects every path from the entry node to the sentinel.
//!    To give loop bodies a chance to appear both once and twice in the result without making
//!    cyclic graphs diverge, a node may occur _at most twice_ on any one path.  Paths longer
//!    than the configured maximum are not explored; a path that completes exactly at the maximum
//!    is still recorded.
//! 3. The sentinel is stripped again, restoring every successor list exactly, and each recorded
//!    path is [branch-coerced][] so that its branching statements jump only at nodes of that
//!    same path.
//!
//! [exit sentinel]: ../graph/enum.Statement.html#variant.Exit
//! [branch-coerced]: ../coerce/index.html

use smallvec::SmallVec;
use thiserror::Error;

use crate::arena::Handle;
use crate::coerce::BranchCoercer;
use crate::coerce::CoercionError;
use crate::graph::Node;
use crate::graph::Statement;
use crate::graph::StatementGraph;

/// Errors that can occur while enumerating the paths of a statement graph.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum EnumerationError {
    /// The maximum path length must leave room for at least one node.
    #[error("maximum path length must be at least 1, got {0}")]
    InvalidMaximumPathLength(usize),
    /// Branch coercion of a recorded path failed.
    #[error(transparent)]
    Coercion(#[from] CoercionError),
}

/// Enumerates all paths through a statement graph, starting at a given entry node.
///
/// The enumerator needs mutable access to the graph: it temporarily attaches the exit sentinel,
/// and branch coercion allocates the coerced copies of branching nodes in the graph's arena.
/// No preexisting node or successor list is changed by the time [`enumerate`][] returns.
///
/// [`enumerate`]: #method.enumerate
pub struct PathEnumerator<'a> {
    graph: &'a mut StatementGraph,
    entry: Handle<Node>,
    maximum_path_length: usize,
}

impl<'a> PathEnumerator<'a> {
    /// Creates a new path enumerator rooted at `entry`.  `maximum_path_length` bounds the number
    /// of nodes on any recorded path and must be at least 1.
    pub fn new(
        graph: &'a mut StatementGraph,
        entry: Handle<Node>,
        maximum_path_length: usize,
    ) -> Result<PathEnumerator<'a>, EnumerationError> {
        if maximum_path_length == 0 {
            return Err(EnumerationError::InvalidMaximumPathLength(
                maximum_path_length,
            ));
        }
        Ok(PathEnumerator {
            graph,
            entry,
            maximum_path_length,
        })
    }

    /// Enumerates the paths of the graph, in discovery order.  Every returned path starts at the
    /// entry node; branching statements on each path have been coerced to jump only at nodes of
    /// that path.
    pub fn enumerate(mut self) -> Result<Vec<Vec<Handle<Node>>>, EnumerationError> {
        copious_debugging!("--> Enumerate paths from [{}]", self.entry.as_u32());
        let exit_node = self.attach_exit_node();
        let mut paths = Vec::new();
        let mut current = vec![self.entry];
        self.collect_paths(self.entry, exit_node, &mut current, &mut paths);
        self.remove_exit_nodes();
        for path in paths.iter_mut() {
            BranchCoercer::new(self.graph).coerce_path(path)?;
        }
        copious_debugging!("<-- Enumerated {} paths", paths.len());
        Ok(paths)
    }

    /// Attaches the exit sentinel below every leaf reachable from the entry node.  A graph whose
    /// every node has successors (a closing cycle) has no leaves; the last node in traversal
    /// order stands in for them.
    fn attach_exit_node(&mut self) -> Handle<Node> {
        let reachable = self.graph.depth_first(self.entry).collect::<Vec<_>>();
        let mut leaves = reachable
            .iter()
            .copied()
            .filter(|node| self.graph.successors(*node).is_empty())
            .collect::<SmallVec<[Handle<Node>; 4]>>();
        if leaves.is_empty() {
            leaves.extend(reachable.last().copied());
        }
        let exit_node = self.graph.add_node(Statement::Exit);
        copious_debugging!(
            " * Attached exit node [{}] below {} leaves",
            exit_node.as_u32(),
            leaves.len()
        );
        for leaf in leaves {
            self.graph.node_mut(leaf).successors.push(exit_node);
        }
        exit_node
    }

    /// Removes the exit sentinel from every reachable successor list, restoring the lists the
    /// graph had before [`attach_exit_node`][].
    ///
    /// [`attach_exit_node`]: #method.attach_exit_node
    fn remove_exit_nodes(&mut self) {
        let reachable = self.graph.depth_first(self.entry).collect::<Vec<_>>();
        for node in reachable {
            let exits = self
                .graph
                .successors(node)
                .iter()
                .copied()
                .filter(|successor| self.graph[*successor].statement().is_exit())
                .collect::<SmallVec<[Handle<Node>; 1]>>();
            if exits.is_empty() {
                continue;
            }
            self.graph
                .node_mut(node)
                .successors
                .retain(|successor| !exits.contains(successor));
        }
    }

    fn collect_paths(
        &self,
        node: Handle<Node>,
        exit_node: Handle<Node>,
        current: &mut Vec<Handle<Node>>,
        paths: &mut Vec<Vec<Handle<Node>>>,
    ) {
        let successors = self.graph.successors(node);
        if successors.contains(&exit_node) {
            copious_debugging!(" * Recorded path of length {}", current.len());
            paths.push(current.clone());
        }
        if current.len() >= self.maximum_path_length {
            return;
        }
        for successor in successors {
            if *successor == exit_node || !visited_at_most_once(current, *successor) {
                continue;
            }
            current.push(*successor);
            self.collect_paths(*successor, exit_node, current, paths);
            current.pop();
        }
    }
}

/// A node may appear at most twice on a path; a successor already seen twice in the current
/// prefix is not explored again.
fn visited_at_most_once(current: &[Handle<Node>], node: Handle<Node>) -> bool {
    current.iter().filter(|visited| **visited == node).count() <= 1
}
