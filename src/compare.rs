// -*- coding: utf-8 -*-
// ------------------------------------------------------------------------------------------------
// Copyright © 2022, statement-graphs authors.
// Licensed under either of Apache License, Version 2.0, or MIT license, at your option.
// Please see the LICENSE-APACHE or LICENSE-MIT files in this distribution for license details.
// ------------------------------------------------------------------------------------------------

//! Decides whether two statement nodes are interchangeable for pattern-mining purposes.
//!
//! Pattern detection needs a looser notion of "the same statement" than the structural
//! equivalence of [`graph`][crate::graph]: `a = b` and `x = y` describe the same pattern element
//! even though they name different locals, as long as the correspondence between operands stays
//! consistent across the statements being matched — once `a` stands for `x`, a later statement
//! reusing `a` must pair it with `x` again.  The [`GeneralizedNodeComparator`] captures this by
//! abstracting operand values into _tags_: the first time a pair of operand values is seen
//! together, both receive a fresh shared tag, and from then on the two values stand for each
//! other wherever that tag is expected.
//!
//! One of the compared nodes plays the _template_ and the other the _instance_.  The caller
//! designates them, and must keep the same node in the template position across the comparisons
//! that are meant to be checked against one another.  Tags accumulate inside the comparator, so
//! a comparator instance embodies one _matching session_: comparisons are order-sensitive,
//! `satisfies(a, b)` followed by `satisfies(b, c)` says nothing about `satisfies(a, c)`, and a
//! session's conclusions are meaningless to any other session.  Create a fresh comparator (or
//! call [`reset`][NodeComparator::reset]) for each independent question you want answered.

use fxhash::FxHashMap;
use thiserror::Error;

use crate::arena::Handle;
use crate::graph::Node;
use crate::graph::StatementGraph;
use crate::graph::Value;

/// Errors that can occur while comparing two nodes.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ComparisonError {
    /// The comparator was handed a node kind it cannot interpret, such as the exit sentinel.
    /// This is always an error and never a non-match; reporting it as `false` would silently
    /// corrupt pattern detection.
    #[error("cannot compare {0} statements")]
    UnsupportedNode(&'static str),
}

/// Compares a designated _template_ node against _instance_ nodes.
///
/// Implementations are allowed to keep state across calls; see the module docs for the session
/// discipline this implies.
pub trait NodeComparator {
    /// Returns whether `instance` satisfies both the structure and the generalized values of
    /// `template`.
    fn satisfies(
        &mut self,
        graph: &StatementGraph,
        template: Handle<Node>,
        instance: Handle<Node>,
    ) -> Result<bool, ComparisonError>;

    /// Returns whether `template` and `instance` have the same structure.  Must be stateless
    /// and commutative.
    fn structures_are_equal(
        &self,
        graph: &StatementGraph,
        template: Handle<Node>,
        instance: Handle<Node>,
    ) -> Result<bool, ComparisonError>;

    /// Returns whether `instance` satisfies the generalized values of `template`.  May mutate
    /// session state.
    fn generalized_values_are_equal(
        &mut self,
        graph: &StatementGraph,
        template: Handle<Node>,
        instance: Handle<Node>,
    ) -> Result<bool, ComparisonError>;

    /// Discards all session state, as if the comparator had just been created.
    fn reset(&mut self);
}

//-------------------------------------------------------------------------------------------------
// Generalized comparison

/// An equivalence class of operand values, learned during a matching session.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
struct Tag(u32);

/// The tag-based [`NodeComparator`].
///
/// Holds two tables for the life of a session: the tag assigned to each value seen so far, and
/// the template node each tag was first created at.  A tag can only be propagated to an untagged
/// instance value while the template under comparison is the node the tag was created at; once
/// comparison moves on to other templates the tag is frozen, and instances are expected to
/// already carry it from an earlier binding step.
pub struct GeneralizedNodeComparator {
    value_tags: FxHashMap<Handle<Value>, Tag>,
    tag_origins: FxHashMap<Tag, Handle<Node>>,
}

impl GeneralizedNodeComparator {
    pub fn new() -> GeneralizedNodeComparator {
        GeneralizedNodeComparator {
            value_tags: FxHashMap::default(),
            tag_origins: FxHashMap::default(),
        }
    }

    fn fresh_tag(&self) -> Tag {
        // Tags are never removed outside of reset, so the table size doubles as a counter.
        Tag(self.tag_origins.len() as u32)
    }

    fn ensure_supported(
        &self,
        graph: &StatementGraph,
        node: Handle<Node>,
    ) -> Result<(), ComparisonError> {
        let statement = graph[node].statement();
        if statement.is_exit() {
            return Err(ComparisonError::UnsupportedNode(statement.kind_name()));
        }
        Ok(())
    }
}

impl NodeComparator for GeneralizedNodeComparator {
    fn satisfies(
        &mut self,
        graph: &StatementGraph,
        template: Handle<Node>,
        instance: Handle<Node>,
    ) -> Result<bool, ComparisonError> {
        Ok(self.structures_are_equal(graph, template, instance)?
            && self.generalized_values_are_equal(graph, template, instance)?)
    }

    fn structures_are_equal(
        &self,
        graph: &StatementGraph,
        template: Handle<Node>,
        instance: Handle<Node>,
    ) -> Result<bool, ComparisonError> {
        self.ensure_supported(graph, template)?;
        self.ensure_supported(graph, instance)?;

        // Structure is a weaker check than the structural equivalence of the graph module: the
        // statements must be of the same kind and their operand types must line up, but the
        // shapes of the operand expressions themselves do not matter.
        let template_statement = graph[template].statement();
        let instance_statement = graph[instance].statement();
        if template_statement.kind_code() != instance_statement.kind_code() {
            return Ok(false);
        }
        let template_values = template_statement.values();
        let instance_values = instance_statement.values();
        if template_values.len() != instance_values.len() {
            return Ok(false);
        }
        Ok(template_values
            .into_iter()
            .zip(instance_values.into_iter())
            .all(|(template_value, instance_value)| {
                graph.value_types_compatible(graph[template_value].ty, graph[instance_value].ty)
            }))
    }

    fn generalized_values_are_equal(
        &mut self,
        graph: &StatementGraph,
        template: Handle<Node>,
        instance: Handle<Node>,
    ) -> Result<bool, ComparisonError> {
        self.ensure_supported(graph, template)?;
        self.ensure_supported(graph, instance)?;

        let template_values = graph[template].statement().values();
        let instance_values = graph[instance].statement().values();
        if template_values.len() != instance_values.len() {
            return Ok(false);
        }

        for (template_value, instance_value) in
            template_values.into_iter().zip(instance_values.into_iter())
        {
            let template_tag = self.value_tags.get(&template_value).copied();
            let instance_tag = self.value_tags.get(&instance_value).copied();
            match (template_tag, instance_tag) {
                (None, None) => {
                    let tag = self.fresh_tag();
                    self.value_tags.insert(template_value, tag);
                    self.value_tags.insert(instance_value, tag);
                    self.tag_origins.insert(tag, template);
                }
                // The instance carries comparison history the template lacks.
                (None, Some(_)) => return Ok(false),
                (Some(tag), None) => {
                    if self.tag_origins.get(&tag) == Some(&template) {
                        self.value_tags.insert(instance_value, tag);
                    } else {
                        // The tag was finalized at a different statement; this instance should
                        // already carry it from an earlier binding step.
                        return Ok(false);
                    }
                }
                (Some(template_tag), Some(instance_tag)) => {
                    if template_tag != instance_tag {
                        return Ok(false);
                    }
                }
            }
        }
        Ok(true)
    }

    fn reset(&mut self) {
        self.value_tags.clear();
        self.tag_origins.clear();
    }
}

impl Default for GeneralizedNodeComparator {
    fn default() -> GeneralizedNodeComparator {
        GeneralizedNodeComparator::new()
    }
}
