// -*- coding: utf-8 -*-
// ------------------------------------------------------------------------------------------------
// Copyright © 2022, statement-graphs authors.
// Licensed under either of Apache License, Version 2.0, or MIT license, at your option.
// Please see the LICENSE-APACHE or LICENSE-MIT files in this distribution for license details.
// ------------------------------------------------------------------------------------------------

//! Mines frequent statement sequences out of enumerated paths.
//!
//! Given many paths through one graph, a _pattern_ is a contiguous subsequence of nodes that
//! occurs in at least a configured number of paths, where "occurs" is judged by a
//! [`NodeComparator`][] rather than by handle identity.  The search is the closed contiguous
//! sequential pattern mining of CCSpan (Zhang et al., 2015): frequent sequences are grown level
//! by level, a length-k candidate is only considered if both its prefix and its suffix were
//! frequent at length k-1, and a sequence is reported only while no frequent extension of it has
//! at least its support (closedness, which keeps the output free of redundant sub-patterns).
//!
//! [`FrequentSequenceFinder`][] mines a prepared collection of sequences;
//! [`PatternDetector`][] is the end-to-end entry point that first enumerates the paths of a
//! graph (see [`paths`][crate::paths]) and then mines them.
//!
//! [`NodeComparator`]: ../compare/trait.NodeComparator.html
//! [`FrequentSequenceFinder`]: struct.FrequentSequenceFinder.html
//! [`PatternDetector`]: struct.PatternDetector.html

use thiserror::Error;

use crate::arena::Handle;
use crate::compare::ComparisonError;
use crate::compare::NodeComparator;
use crate::equiv::EquivMap;
use crate::equiv::EquivSet;
use crate::equiv::NodeEquivalence;
use crate::equiv::SequenceEquivalence;
use crate::graph::Node;
use crate::graph::StatementGraph;
use crate::paths::EnumerationError;
use crate::paths::PathEnumerator;

//-------------------------------------------------------------------------------------------------
// Errors

/// Errors that can occur while detecting frequent sequences.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum DetectionError {
    /// The minimum occurrence count must admit at least one occurrence.
    #[error("minimum occurrence count must be at least 1, got {0}")]
    InvalidMinimumCount(usize),
    /// The maximum sequence length must leave room for at least one node.
    #[error("maximum sequence length must be at least 1, got {0}")]
    InvalidMaximumSequenceLength(usize),
    #[error(transparent)]
    Comparison(#[from] ComparisonError),
    #[error(transparent)]
    Enumeration(#[from] EnumerationError),
}

//-------------------------------------------------------------------------------------------------
// Containment

/// Returns whether `sub` occurs contiguously in `sequence`, judged by the comparator: at some
/// offset, every element of `sub` satisfies the sequence element above it.  The sequence element
/// plays the template and the `sub` element the instance, and the comparator keeps its tag state
/// across the whole scan.  An empty `sub` is contained in everything.
pub fn sequence_contains_subsequence<C>(
    graph: &StatementGraph,
    sequence: &[Handle<Node>],
    sub: &[Handle<Node>],
    comparator: &mut C,
) -> Result<bool, ComparisonError>
where
    C: NodeComparator,
{
    if sub.is_empty() {
        return Ok(true);
    }
    for offset in 0..sequence.len() {
        let mut matched = true;
        for (index, sub_element) in sub.iter().enumerate() {
            if offset + index >= sequence.len()
                || !comparator.satisfies(graph, sequence[offset + index], *sub_element)?
            {
                matched = false;
                break;
            }
        }
        if matched {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Counts how often each node occurs across the given sequences, deduplicating per sequence (a
/// node occurring twice in one sequence counts once for it), and returns the nodes whose total
/// count reaches `minimum_count`.  Counting buckets by node equivalence; each returned handle is
/// the first-seen representative of its equivalence class.
pub fn frequent_nodes(
    graph: &StatementGraph,
    sequences: &[Vec<Handle<Node>>],
    minimum_count: usize,
) -> Vec<(Handle<Node>, usize)> {
    let mut counts = EquivMap::new(NodeEquivalence::new(graph));
    let mut order = Vec::new();
    for sequence in sequences {
        let mut in_sequence = EquivSet::new(NodeEquivalence::new(graph));
        for node in sequence {
            if !in_sequence.insert(*node) {
                continue;
            }
            match counts.get_mut(node) {
                Some(count) => *count += 1,
                None => {
                    counts.insert(*node, 1usize);
                    order.push(*node);
                }
            }
        }
    }
    order
        .into_iter()
        .filter_map(|node| {
            let count = *counts.get(&node)?;
            if count >= minimum_count {
                Some((node, count))
            } else {
                None
            }
        })
        .collect()
}

//-------------------------------------------------------------------------------------------------
// Frequent sequences

/// A frequent node sequence, together with the number of input sequences it occurred in.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FrequentSequence {
    pub nodes: Vec<Handle<Node>>,
    pub support: usize,
}

// One generation of surviving candidate sequences, in discovery order.  The equivalence-keyed
// index makes prefix and suffix lookups cheap; the entries list keeps the output deterministic.
struct Level<'a> {
    indices: EquivMap<Vec<Handle<Node>>, usize, SequenceEquivalence<'a>>,
    entries: Vec<LevelEntry>,
}

struct LevelEntry {
    nodes: Vec<Handle<Node>>,
    support: usize,
    closed: bool,
}

impl<'a> Level<'a> {
    fn new(graph: &'a StatementGraph) -> Level<'a> {
        Level {
            indices: EquivMap::new(SequenceEquivalence::new(graph)),
            entries: Vec::new(),
        }
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn add(&mut self, nodes: Vec<Handle<Node>>, support: usize) {
        let index = self.entries.len();
        self.indices.insert(nodes.clone(), index);
        self.entries.push(LevelEntry {
            nodes,
            support,
            closed: true,
        });
    }

    fn contains(&self, nodes: &Vec<Handle<Node>>) -> bool {
        self.indices.contains_key(nodes)
    }

    fn entry_mut(&mut self, nodes: &Vec<Handle<Node>>) -> Option<&mut LevelEntry> {
        let index = *self.indices.get(nodes)?;
        Some(&mut self.entries[index])
    }
}

/// Mines closed contiguous frequent sequences out of a prepared sequence collection.
///
/// The comparator is handed over at construction and lives for the whole run: support counting
/// is one long matching session, so values bound to a tag early in the run keep standing for
/// each other in every later containment scan.  Reuse a finder only for reruns over the same
/// logical input; independent inputs get independent finders.
pub struct FrequentSequenceFinder<C> {
    minimum_count: usize,
    maximum_sequence_length: usize,
    comparator: C,
}

impl<C> FrequentSequenceFinder<C>
where
    C: NodeComparator,
{
    /// Creates a new finder.  Both scalars must be at least 1.
    pub fn new(
        minimum_count: usize,
        maximum_sequence_length: usize,
        comparator: C,
    ) -> Result<FrequentSequenceFinder<C>, DetectionError> {
        if minimum_count == 0 {
            return Err(DetectionError::InvalidMinimumCount(minimum_count));
        }
        if maximum_sequence_length == 0 {
            return Err(DetectionError::InvalidMaximumSequenceLength(
                maximum_sequence_length,
            ));
        }
        Ok(FrequentSequenceFinder {
            minimum_count,
            maximum_sequence_length,
            comparator,
        })
    }

    /// Finds all closed contiguous sequences occurring in at least `minimum_count` of the given
    /// sequences, in discovery order (shorter sequences first).  Levels beyond the maximum
    /// sequence length are not generated; survivors of the final generated level are still
    /// reported.
    pub fn find_frequent_sequences(
        &mut self,
        graph: &StatementGraph,
        sequences: &[Vec<Handle<Node>>],
    ) -> Result<Vec<FrequentSequence>, DetectionError> {
        copious_debugging!(
            "--> Detect frequent sequences across {} sequences",
            sequences.len()
        );
        let mut results = Vec::new();
        // The first generation counts node occurrences by equivalence; the comparator only
        // comes into play once windows of length 2 and up are matched across sequences.
        let mut previous = Level::new(graph);
        for (node, support) in frequent_nodes(graph, sequences, self.minimum_count) {
            previous.add(vec![node], support);
        }
        let mut length = 2;
        while !previous.is_empty() {
            let mut current = Level::new(graph);
            if length <= self.maximum_sequence_length {
                self.generate_level(graph, sequences, length, &previous, &mut current)?;
            }
            Self::mark_non_closed(&current, &mut previous);
            for entry in &previous.entries {
                if entry.closed {
                    copious_debugging!(
                        " * Closed frequent sequence of length {} with support {}",
                        entry.nodes.len(),
                        entry.support
                    );
                    results.push(FrequentSequence {
                        nodes: entry.nodes.clone(),
                        support: entry.support,
                    });
                }
            }
            previous = current;
            length += 1;
        }
        copious_debugging!("<-- Detected {} closed frequent sequences", results.len());
        Ok(results)
    }

    /// Generates the frequent sequences of the given length into `current`.  A window is only a
    /// candidate if both its prefix and its suffix survived the previous level.
    fn generate_level<'a>(
        &mut self,
        graph: &StatementGraph,
        sequences: &[Vec<Handle<Node>>],
        length: usize,
        previous: &Level<'a>,
        current: &mut Level<'a>,
    ) -> Result<(), DetectionError> {
        let mut checked = EquivSet::new(SequenceEquivalence::new(graph));
        for sequence in sequences {
            if sequence.len() < length {
                continue;
            }
            for start in 0..=(sequence.len() - length) {
                let window = sequence[start..start + length].to_vec();
                if !checked.insert(window.clone()) {
                    continue;
                }
                let prefix = window[..length - 1].to_vec();
                let suffix = window[1..].to_vec();
                if !previous.contains(&prefix) || !previous.contains(&suffix) {
                    continue;
                }
                let support = self.support(graph, sequences, &window)?;
                if support >= self.minimum_count {
                    current.add(window, support);
                }
            }
        }
        Ok(())
    }

    /// Marks every previous-level survivor that some current-level sequence extends with at
    /// least its support.  Such a survivor is subsumed by its extension and is not reported.
    fn mark_non_closed(current: &Level, previous: &mut Level) {
        for entry in &current.entries {
            let prefix = entry.nodes[..entry.nodes.len() - 1].to_vec();
            let suffix = entry.nodes[1..].to_vec();
            if let Some(shorter) = previous.entry_mut(&prefix) {
                if entry.support >= shorter.support {
                    shorter.closed = false;
                }
            }
            if let Some(shorter) = previous.entry_mut(&suffix) {
                if entry.support >= shorter.support {
                    shorter.closed = false;
                }
            }
        }
    }

    /// The number of sequences containing `candidate` under the comparator.
    fn support(
        &mut self,
        graph: &StatementGraph,
        sequences: &[Vec<Handle<Node>>],
        candidate: &[Handle<Node>],
    ) -> Result<usize, ComparisonError> {
        let mut support = 0;
        for sequence in sequences {
            // A sequence shorter than the candidate can never contain it, and must not reach
            // the comparator: a partial scan would leave tag bindings behind.
            if sequence.len() < candidate.len() {
                continue;
            }
            if sequence_contains_subsequence(graph, sequence, candidate, &mut self.comparator)? {
                support += 1;
            }
        }
        Ok(support)
    }
}

/// Maps each pattern back to the input sequences that contain it, as indexes into `sequences`.
pub fn patterns_to_sequences<C>(
    graph: &StatementGraph,
    patterns: &[FrequentSequence],
    sequences: &[Vec<Handle<Node>>],
    comparator: &mut C,
) -> Result<Vec<Vec<usize>>, ComparisonError>
where
    C: NodeComparator,
{
    let mut mapping = Vec::with_capacity(patterns.len());
    for pattern in patterns {
        let mut containing = Vec::new();
        for (index, sequence) in sequences.iter().enumerate() {
            if sequence_contains_subsequence(graph, sequence, &pattern.nodes, comparator)? {
                containing.push(index);
            }
        }
        mapping.push(containing);
    }
    Ok(mapping)
}

//-------------------------------------------------------------------------------------------------
// End-to-end detection

/// The end-to-end pattern detector: enumerates every path of a graph from the given entry nodes
/// (coercing branches along the way) and mines the collected paths for frequent sequences.
pub struct PatternDetector<C> {
    maximum_path_length: usize,
    finder: FrequentSequenceFinder<C>,
}

impl<C> PatternDetector<C>
where
    C: NodeComparator,
{
    /// Creates a new detector.  All three scalars must be at least 1.
    pub fn new(
        minimum_count: usize,
        maximum_path_length: usize,
        maximum_sequence_length: usize,
        comparator: C,
    ) -> Result<PatternDetector<C>, DetectionError> {
        if maximum_path_length == 0 {
            return Err(EnumerationError::InvalidMaximumPathLength(maximum_path_length).into());
        }
        Ok(PatternDetector {
            maximum_path_length,
            finder: FrequentSequenceFinder::new(minimum_count, maximum_sequence_length, comparator)?,
        })
    }

    /// Enumerates the paths rooted at each of `entries` and finds the frequent sequences across
    /// all of them together.
    pub fn find_patterns(
        &mut self,
        graph: &mut StatementGraph,
        entries: &[Handle<Node>],
    ) -> Result<Vec<FrequentSequence>, DetectionError> {
        let mut sequences = Vec::new();
        for entry in entries {
            let enumerator = PathEnumerator::new(graph, *entry, self.maximum_path_length)?;
            sequences.extend(enumerator.enumerate()?);
        }
        self.finder.find_frequent_sequences(graph, &sequences)
    }
}
