// -*- coding: utf-8 -*-
// ------------------------------------------------------------------------------------------------
// Copyright © 2022, statement-graphs authors.
// Licensed under either of Apache License, Version 2.0, or MIT license, at your option.
// Please see the LICENSE-APACHE or LICENSE-MIT files in this distribution for license details.
// ------------------------------------------------------------------------------------------------

//! Collections keyed by an externally supplied equivalence.
//!
//! Node handles are plain indexes, and their native `Eq` and `Hash` are reference identity.
//! Pattern detection needs to bucket nodes by _equivalence_ instead (same statement shape, see
//! [`nodes_equivalent`][]), which cannot be expressed through `Hash` + `Eq` impls because it
//! needs the graph at hand.  The containers in this module take the equivalence as an explicit
//! collaborator: keys are hashed with [`Equivalence::equiv_hash`][] into buckets, and buckets are
//! scanned with [`Equivalence::equiv_equals`][].
//!
//! Two handles with equivalent payloads collide into a single entry, whichever was inserted
//! first acting as the representative.  The containers make no promise about iteration order.
//!
//! [`nodes_equivalent`]: ../graph/struct.StatementGraph.html#method.nodes_equivalent
//! [`Equivalence::equiv_hash`]: trait.Equivalence.html#tymethod.equiv_hash
//! [`Equivalence::equiv_equals`]: trait.Equivalence.html#tymethod.equiv_equals

use fxhash::FxHashMap;
use smallvec::SmallVec;

use crate::arena::Handle;
use crate::graph::Node;
use crate::graph::StatementGraph;

/// An externally supplied equivalence relation over keys of type `K`.
///
/// Implementations must be consistent: `equiv_equals(a, b)` implies
/// `equiv_hash(a) == equiv_hash(b)`.
pub trait Equivalence<K> {
    fn equiv_hash(&self, key: &K) -> u64;
    fn equiv_equals(&self, left: &K, right: &K) -> bool;
}

/// The standard equivalence over node handles, delegating to the graph's
/// [`node_equiv_hash`][] and [`nodes_equivalent`][].
///
/// [`node_equiv_hash`]: ../graph/struct.StatementGraph.html#method.node_equiv_hash
/// [`nodes_equivalent`]: ../graph/struct.StatementGraph.html#method.nodes_equivalent
pub struct NodeEquivalence<'a> {
    graph: &'a StatementGraph,
}

impl<'a> NodeEquivalence<'a> {
    pub fn new(graph: &'a StatementGraph) -> NodeEquivalence<'a> {
        NodeEquivalence { graph }
    }
}

impl<'a> Equivalence<Handle<Node>> for NodeEquivalence<'a> {
    fn equiv_hash(&self, key: &Handle<Node>) -> u64 {
        self.graph.node_equiv_hash(*key)
    }

    fn equiv_equals(&self, left: &Handle<Node>, right: &Handle<Node>) -> bool {
        self.graph.nodes_equivalent(*left, *right)
    }
}

/// Element-wise [`NodeEquivalence`][] lifted to node sequences.  Two sequences are equivalent if
/// they have the same length and equivalent nodes at every index.
pub struct SequenceEquivalence<'a> {
    graph: &'a StatementGraph,
}

impl<'a> SequenceEquivalence<'a> {
    pub fn new(graph: &'a StatementGraph) -> SequenceEquivalence<'a> {
        SequenceEquivalence { graph }
    }
}

impl<'a> Equivalence<Vec<Handle<Node>>> for SequenceEquivalence<'a> {
    fn equiv_hash(&self, key: &Vec<Handle<Node>>) -> u64 {
        let mut hash = key.len() as u64;
        for node in key {
            hash = hash
                .wrapping_mul(31)
                .wrapping_add(self.graph.node_equiv_hash(*node));
        }
        hash
    }

    fn equiv_equals(&self, left: &Vec<Handle<Node>>, right: &Vec<Handle<Node>>) -> bool {
        left.len() == right.len()
            && left
                .iter()
                .zip(right.iter())
                .all(|(left, right)| self.graph.nodes_equivalent(*left, *right))
    }
}

//-------------------------------------------------------------------------------------------------
// Equivalence-keyed maps

/// A hash map whose keys are compared with an [`Equivalence`][] instead of `Eq` + `Hash`.
///
/// [`Equivalence`]: trait.Equivalence.html
pub struct EquivMap<K, V, E> {
    equivalence: E,
    buckets: FxHashMap<u64, SmallVec<[(K, V); 2]>>,
    len: usize,
}

impl<K, V, E> EquivMap<K, V, E>
where
    E: Equivalence<K>,
{
    /// Creates a new, empty map using the given equivalence.
    pub fn new(equivalence: E) -> EquivMap<K, V, E> {
        EquivMap {
            equivalence,
            buckets: FxHashMap::default(),
            len: 0,
        }
    }

    /// Returns the number of entries in this map.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inserts an entry.  If the map already contains a key equivalent to `key`, its value is
    /// replaced and returned, and the existing key stays the representative.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let Self {
            equivalence,
            buckets,
            len,
        } = self;
        let hash = equivalence.equiv_hash(&key);
        let bucket = buckets.entry(hash).or_default();
        for (existing, existing_value) in bucket.iter_mut() {
            if equivalence.equiv_equals(existing, &key) {
                return Some(std::mem::replace(existing_value, value));
            }
        }
        bucket.push((key, value));
        *len += 1;
        None
    }

    /// Returns the value for the key equivalent to `key`, if there is one.
    pub fn get(&self, key: &K) -> Option<&V> {
        let bucket = self.buckets.get(&self.equivalence.equiv_hash(key))?;
        bucket
            .iter()
            .find(|(existing, _)| self.equivalence.equiv_equals(existing, key))
            .map(|(_, value)| value)
    }

    /// Returns a mutable reference to the value for the key equivalent to `key`, if there is
    /// one.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let Self {
            equivalence,
            buckets,
            ..
        } = self;
        let bucket = buckets.get_mut(&equivalence.equiv_hash(key))?;
        bucket
            .iter_mut()
            .find(|(existing, _)| equivalence.equiv_equals(existing, key))
            .map(|(_, value)| value)
    }

    /// Returns whether this map contains a key equivalent to `key`.
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Removes the entry for the key equivalent to `key`, returning its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let Self {
            equivalence,
            buckets,
            len,
        } = self;
        let bucket = buckets.get_mut(&equivalence.equiv_hash(key))?;
        let index = bucket
            .iter()
            .position(|(existing, _)| equivalence.equiv_equals(existing, key))?;
        *len -= 1;
        Some(bucket.remove(index).1)
    }

    /// Returns an iterator over the entries of this map, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.buckets
            .values()
            .flat_map(|bucket| bucket.iter().map(|(key, value)| (key, value)))
    }
}

//-------------------------------------------------------------------------------------------------
// Equivalence-keyed sets

/// A hash set whose elements are compared with an [`Equivalence`][] instead of `Eq` + `Hash`.
///
/// [`Equivalence`]: trait.Equivalence.html
pub struct EquivSet<K, E> {
    map: EquivMap<K, (), E>,
}

impl<K, E> EquivSet<K, E>
where
    E: Equivalence<K>,
{
    /// Creates a new, empty set using the given equivalence.
    pub fn new(equivalence: E) -> EquivSet<K, E> {
        EquivSet {
            map: EquivMap::new(equivalence),
        }
    }

    /// Returns the number of elements in this set.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Adds an element to this set, returning whether it was newly added (false when an
    /// equivalent element was already present).
    pub fn insert(&mut self, key: K) -> bool {
        self.map.insert(key, ()).is_none()
    }

    /// Returns whether this set contains an element equivalent to `key`.
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Returns an iterator over the elements of this set, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &K> + '_ {
        self.map.iter().map(|(key, _)| key)
    }
}
