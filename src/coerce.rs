// -*- coding: utf-8 -*-
// ------------------------------------------------------------------------------------------------
// Copyright © 2022, statement-graphs authors.
// Licensed under either of Apache License, Version 2.0, or MIT license, at your option.
// Please see the LICENSE-APACHE or LICENSE-MIT files in this distribution for license details.
// ------------------------------------------------------------------------------------------------

//! Straightens the branching statements of an enumerated path.
//!
//! A path records one concrete route through a graph, but the branching statements on it still
//! jump wherever they jumped in the graph — possibly at nodes the path never visits.  A path is
//! only useful to pattern detection (and to any consumer that wants to treat it as straight-line
//! code) if every branch on it stays within it.  This module rewrites each path accordingly:
//!
//! * A branching node is never mutated in place.  It is _copied_, the copy takes over the node's
//!   slot on the path, and every other in-path statement that jumped at the original is itself
//!   copied with its jump retargeted at the new copy.  The graph's own nodes and edges are left
//!   untouched, so the same node can be coerced differently on each path it appears on.
//! * The copy's jump targets are redirected to the first common descendant of the original
//!   branch successors that lies on the path, falling back to the path's last node when the
//!   branches never reconverge (a branch arm that returns, for instance).
//! * An `if` whose path continues at its jump target gets its condition flipped, so that the
//!   rewritten statement _falls through_ into the next path node instead.
//!
//! Coercion runs after the exit sentinel has been stripped, so copies never carry sentinel
//! successors.

use fxhash::FxHashMap;
use itertools::Itertools;
use smallvec::SmallVec;
use thiserror::Error;

use crate::arena::Handle;
use crate::arena::HandleSet;
use crate::graph::Node;
use crate::graph::Statement;
use crate::graph::StatementGraph;
use crate::graph::ValueExpr;

/// Errors that can occur while coercing the branches of a path.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum CoercionError {
    /// A path took the jump branch of a condition that has no inverse operator.
    #[error("cannot flip a non-relational branch condition")]
    UnflippableCondition,
    /// One original node resolved to several conflicting copies on the same path, so no single
    /// jump target can stand for it.  This indicates a malformed graph.
    #[error("branch target resolves to conflicting copies on the path")]
    AmbiguousCoercionTarget,
    /// None of a branching node's successors continues the path it lies on, or a branching
    /// statement names targets while its node has no outgoing edges.  Either way the graph and
    /// the statement disagree about where control can go.
    #[error("a branching node's successors do not continue its path")]
    DisconnectedBranch,
}

/// Rewrites the branching statements of one path.  Create one coercer per path; the replacement
/// table it keeps is path-local state.
pub(crate) struct BranchCoercer<'a> {
    graph: &'a mut StatementGraph,
    // Original node -> the copies that replaced it on this path, in replacement order.  A copy
    // can itself be replaced later, so resolution follows chains.
    replacements: FxHashMap<Handle<Node>, SmallVec<[Handle<Node>; 1]>>,
}

impl<'a> BranchCoercer<'a> {
    pub(crate) fn new(graph: &'a mut StatementGraph) -> BranchCoercer<'a> {
        BranchCoercer {
            graph,
            replacements: FxHashMap::default(),
        }
    }

    pub(crate) fn coerce_path(
        mut self,
        path: &mut Vec<Handle<Node>>,
    ) -> Result<(), CoercionError> {
        // Snapshot the branching slots up front.  Replacements swap slot contents underneath us,
        // but they never add or remove slots, so indices stay stable.  By the time a slot's turn
        // comes, it may already hold a retargeted copy of the node seen at snapshot time; the
        // copy is the one to coerce, since its statement carries the accumulated retargets.
        let branching = path
            .iter()
            .enumerate()
            .filter(|(_, node)| self.graph[**node].statement().branches())
            .map(|(index, _)| index)
            .collect::<Vec<_>>();
        for index in branching {
            match self.graph[path[index]].statement() {
                Statement::If { .. } => self.coerce_if(index, path)?,
                Statement::Switch { .. } => self.coerce_switch(index, path)?,
                // A goto has a single successor; there is nothing to straighten.
                Statement::Goto { .. } => {}
                _ => unreachable!(),
            }
        }
        Ok(())
    }

    fn coerce_if(
        &mut self,
        index: usize,
        path: &mut Vec<Handle<Node>>,
    ) -> Result<(), CoercionError> {
        let node = path[index];
        let successors = self.graph[node].successors();
        if successors.is_empty() {
            // The statement names a jump target, but the node has no edges at all.
            return Err(CoercionError::DisconnectedBranch);
        }
        if successors.len() < 2 {
            // Both arms collapsed onto one node; there is no branch left to straighten.
            return Ok(());
        }
        let first_branch = successors[0];
        let second_branch = successors[1];
        let original_target = match self.graph[node].statement() {
            Statement::If { target, .. } => *target,
            _ => unreachable!(),
        };
        // The target's slot may already hold a copy made while coercing an earlier slot, so
        // membership resolves through the replacement table rather than comparing raw handles.
        let jump_taken = self.resolve_on_path(original_target, path)?.is_some();

        copious_debugging!(
            "   straighten if [{}] on path of length {}",
            node.as_u32(),
            path.len()
        );
        let copy = self.replace_at(index, path);
        let new_target = self.coercion_target(first_branch, second_branch, path)?;
        match &mut self.graph.node_mut(copy).statement {
            Statement::If { target, .. } => *target = new_target,
            _ => unreachable!(),
        }
        if jump_taken {
            // The path goes through the jump target, so the rewritten statement must fall
            // through into it.
            self.flip_condition(copy)?;
        }
        Ok(())
    }

    fn coerce_switch(
        &mut self,
        index: usize,
        path: &mut Vec<Handle<Node>>,
    ) -> Result<(), CoercionError> {
        let node = path[index];
        let successor_count = self.graph[node].successors().len();
        if successor_count == 0 {
            // The statement names targets, but the node has no edges at all.
            return Err(CoercionError::DisconnectedBranch);
        }
        if successor_count < 2 {
            return Ok(());
        }
        let (case_targets, default_target) = match self.graph[node].statement() {
            Statement::Switch {
                targets,
                default_target,
                ..
            } => (targets.clone(), *default_target),
            _ => unreachable!(),
        };

        // The active branch is the first successor this path continues through.  A successor's
        // slot may already hold a copy made while coercing an earlier slot, so membership
        // resolves through the replacement table rather than comparing raw handles.
        let successors = SmallVec::<[Handle<Node>; 4]>::from_slice(self.graph[node].successors());
        let mut active = None;
        for successor in successors {
            if self.resolve_on_path(successor, path)?.is_some() {
                active = Some(successor);
                break;
            }
        }
        let active = active.ok_or(CoercionError::DisconnectedBranch)?;

        copious_debugging!(
            "   straighten switch [{}], active branch [{}]",
            node.as_u32(),
            active.as_u32()
        );
        let copy = self.replace_at(index, path);
        for (case, target) in case_targets.iter().copied().enumerate() {
            if target == active || target == default_target {
                continue;
            }
            let coerced = self.coercion_target(active, target, path)?;
            match &mut self.graph.node_mut(copy).statement {
                Statement::Switch { targets, .. } => targets[case] = coerced,
                _ => unreachable!(),
            }
        }
        let coerced_default = self.coercion_target(active, default_target, path)?;
        match &mut self.graph.node_mut(copy).statement {
            Statement::Switch { default_target, .. } => *default_target = coerced_default,
            _ => unreachable!(),
        }
        Ok(())
    }

    /// Copies the node in the given path slot, lets the copy take over the slot, and gives every
    /// other in-path statement jumping at the replaced node the same copy-on-write treatment so
    /// it jumps at the new copy instead.
    fn replace_at(&mut self, index: usize, path: &mut Vec<Handle<Node>>) -> Handle<Node> {
        let original = path[index];
        let copy = self.graph.copy_node(original);
        path[index] = copy;
        self.replacements.entry(original).or_default().push(copy);
        let jumpers = path
            .iter()
            .copied()
            .filter(|node| *node != copy && self.statement_jumps_at(*node, original))
            .unique()
            .collect::<Vec<_>>();
        for jumper in jumpers {
            let patched = self.graph.copy_node(jumper);
            Self::retarget(&mut self.graph.node_mut(patched).statement, original, copy);
            for slot in path.iter_mut() {
                if *slot == jumper {
                    *slot = patched;
                }
            }
            self.replacements.entry(jumper).or_default().push(patched);
        }
        copy
    }

    fn statement_jumps_at(&self, node: Handle<Node>, target: Handle<Node>) -> bool {
        match self.graph[node].statement() {
            Statement::If { target: jump, .. } | Statement::Goto { target: jump } => {
                *jump == target
            }
            Statement::Switch {
                targets,
                default_target,
                ..
            } => targets.contains(&target) || *default_target == target,
            _ => false,
        }
    }

    fn retarget(statement: &mut Statement, old: Handle<Node>, new: Handle<Node>) {
        match statement {
            Statement::If { target, .. } | Statement::Goto { target } => {
                if *target == old {
                    *target = new;
                }
            }
            Statement::Switch {
                targets,
                default_target,
                ..
            } => {
                for target in targets.iter_mut() {
                    if *target == old {
                        *target = new;
                    }
                }
                if *default_target == old {
                    *default_target = new;
                }
            }
            _ => {}
        }
    }

    /// Returns the node the coerced branch should jump at: the first common descendant of the
    /// two branch successors that lies on the path, in depth-first pre-order from the first
    /// successor; the path's last node if the branches never reconverge on it.
    fn coercion_target(
        &self,
        first: Handle<Node>,
        second: Handle<Node>,
        path: &[Handle<Node>],
    ) -> Result<Handle<Node>, CoercionError> {
        let mut reachable_from_second = HandleSet::new();
        for node in self.graph.depth_first(second) {
            reachable_from_second.add(node);
        }
        for candidate in self.graph.depth_first(first) {
            if !reachable_from_second.contains(candidate) {
                continue;
            }
            if let Some(on_path) = self.resolve_on_path(candidate, path)? {
                return Ok(on_path);
            }
        }
        // The branching node itself came from this path, so the path cannot be empty.
        Ok(path[path.len() - 1])
    }

    /// Resolves a graph node to its representative on the path: the node itself if it still
    /// occupies a slot, or the copy that replaced it, following replacement chains.  Errors if
    /// the node resolves to several conflicting copies.
    fn resolve_on_path(
        &self,
        node: Handle<Node>,
        path: &[Handle<Node>],
    ) -> Result<Option<Handle<Node>>, CoercionError> {
        if path.contains(&node) {
            return Ok(Some(node));
        }
        let copies = match self.replacements.get(&node) {
            Some(copies) => copies,
            None => return Ok(None),
        };
        let mut on_path = SmallVec::<[Handle<Node>; 2]>::new();
        for copy in copies.iter().copied() {
            if let Some(resolved) = self.resolve_on_path(copy, path)? {
                on_path.push(resolved);
            }
        }
        match on_path.len() {
            0 => Ok(None),
            1 => Ok(Some(on_path[0])),
            _ => {
                // Several copies of one original can share a path (a loop body traversed twice),
                // but only if they still carry interchangeable statements.
                if on_path
                    .iter()
                    .tuple_windows()
                    .all(|(left, right)| self.graph.nodes_equivalent(*left, *right))
                {
                    Ok(Some(on_path[0]))
                } else {
                    Err(CoercionError::AmbiguousCoercionTarget)
                }
            }
        }
    }

    /// Replaces the condition of a coerced `if` with its inverse, so that the rewritten
    /// statement accepts exactly the executions the original jumped away on.  The original
    /// condition value is left alone; the copy gets a fresh value sharing the same operands.
    fn flip_condition(&mut self, node: Handle<Node>) -> Result<(), CoercionError> {
        let condition = match self.graph[node].statement() {
            Statement::If { condition, .. } => *condition,
            _ => unreachable!(),
        };
        let (operator, lhs, rhs) = match &self.graph[condition].expr {
            ValueExpr::Binary { operator, lhs, rhs } => (*operator, *lhs, *rhs),
            _ => return Err(CoercionError::UnflippableCondition),
        };
        let flipped = operator
            .flipped()
            .ok_or(CoercionError::UnflippableCondition)?;
        let ty = self.graph[condition].ty;
        let new_condition = self.graph.add_binary(flipped, lhs, rhs, ty);
        match &mut self.graph.node_mut(node).statement {
            Statement::If { condition, .. } => *condition = new_condition,
            _ => unreachable!(),
        }
        Ok(())
    }
}
