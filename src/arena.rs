// -*- coding: utf-8 -*-
// ------------------------------------------------------------------------------------------------
// Copyright © 2022, statement-graphs authors.
// Licensed under either of Apache License, Version 2.0, or MIT license, at your option.
// Please see the LICENSE-APACHE or LICENSE-MIT files in this distribution for license details.
// ------------------------------------------------------------------------------------------------

//! Cache-friendly arena allocation for statement graph data.
//!
//! A statement graph is cyclic and self-referential: nodes point at their successors, branch
//! statements point back at nodes, and values refer to other values.  The typical way to express
//! this in Rust is [arena allocation][]: all of the instances of a particular type are stored in
//! one vector, and references between them are indexes into that vector.  Indexes are just
//! numbers, so they don't run afoul of the borrow checker, and keeping all instances in one
//! contiguous region of memory is friendly to your data cache.
//!
//! This module implements a simple arena allocation scheme for statement graphs.  An
//! [`Arena<T>`][`Arena`] holds all of the instances of type `T` for one graph.  A
//! [`Handle<T>`][`Handle`] holds the index of a particular instance of `T` in its arena.  All of
//! our graph data types use handles to refer to other parts of the graph.
//!
//! Note that our arena implementation does not support deletion!  Any content that you add to a
//! [`StatementGraph`][] will live as long as the graph itself does.  The entire region of memory
//! for each arena will be freed in a single operation when the graph is dropped.
//!
//! [arena allocation]: https://en.wikipedia.org/wiki/Region-based_memory_management
//! [`Arena`]: struct.Arena.html
//! [`Handle`]: struct.Handle.html
//! [`StatementGraph`]: ../graph/struct.StatementGraph.html

use std::fmt::Debug;
use std::hash::Hash;
use std::hash::Hasher;
use std::marker::PhantomData;
use std::num::NonZeroU32;

use bitvec::vec::BitVec;
use controlled_option::Niche;

//-------------------------------------------------------------------------------------------------
// Arenas and handles

/// A handle to an instance of type `T` that was allocated from an [`Arena`][].
///
/// #### Safety
///
/// Because of the type parameter `T`, the compiler can ensure that you don't use a handle for one
/// type to index into an arena of another type.  However, if you have multiple arenas for the
/// _same type_, we do not do anything to ensure that you only use a handle with the corresponding
/// arena.
#[repr(transparent)]
pub struct Handle<T> {
    index: NonZeroU32,
    _phantom: PhantomData<T>,
}

impl<T> Handle<T> {
    pub(crate) fn new(index: NonZeroU32) -> Handle<T> {
        Handle {
            index,
            _phantom: PhantomData,
        }
    }

    #[inline(always)]
    pub fn as_u32(self) -> u32 {
        self.index.get()
    }

    #[inline(always)]
    pub(crate) fn as_usize(self) -> usize {
        self.index.get() as usize
    }
}

impl<T> Niche for Handle<T> {
    type Output = u32;

    #[inline]
    fn none() -> Self::Output {
        0
    }

    #[inline]
    fn is_none(value: &Self::Output) -> bool {
        *value == 0
    }

    #[inline]
    fn into_some(value: Self) -> Self::Output {
        value.index.get()
    }

    #[inline]
    fn from_some(value: Self::Output) -> Self {
        Self::new(unsafe { NonZeroU32::new_unchecked(value) })
    }
}

// The derived implementations of these traits would all require T to implement the trait as well.
// A handle is only an index; none of these actually need anything from T.

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Handle<T> {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> Debug for Handle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Handle({})", self.index)
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

// A handle is just a number, so handles are always Send and Sync; dereferencing one requires the
// arena, which inherits T's auto traits the usual way.
unsafe impl<T> Send for Handle<T> {}
unsafe impl<T> Sync for Handle<T> {}

/// Allocates instances of type `T` for one statement graph.  Instances can only be added, never
/// removed; everything the arena owns is dropped in a single operation when the arena is.
pub struct Arena<T> {
    // Handle indexes are 1-based so that handles have a niche: slot i of this vector holds the
    // instance for handle i + 1.
    items: Vec<T>,
}

impl<T> Arena<T> {
    /// Creates a new, empty arena.
    pub fn new() -> Arena<T> {
        Arena { items: Vec::new() }
    }

    /// Adds a new instance to this arena, returning a stable handle to it.
    ///
    /// Note that we do not deduplicate instances of `T` in any way.  If you add two instances that
    /// have the same content, you will get distinct handles for each one.
    pub fn add(&mut self, item: T) -> Handle<T> {
        self.items.push(item);
        Handle::new(unsafe { NonZeroU32::new_unchecked(self.items.len() as u32) })
    }

    /// Dereferences a handle to an instance owned by this arena, returning a reference to it.
    pub fn get(&self, handle: Handle<T>) -> &T {
        &self.items[handle.as_usize() - 1]
    }

    /// Dereferences a handle to an instance owned by this arena, returning a mutable reference to
    /// it.
    pub fn get_mut(&mut self, handle: Handle<T>) -> &mut T {
        &mut self.items[handle.as_usize() - 1]
    }

    /// Returns an iterator of all of the handles in this arena, in insertion order.  (Note that
    /// this iterator does not retain a reference to the arena!)
    pub fn iter_handles(&self) -> impl Iterator<Item = Handle<T>> {
        (1..=self.items.len() as u32)
            .map(|index| Handle::new(unsafe { NonZeroU32::new_unchecked(index) }))
    }
}

//-------------------------------------------------------------------------------------------------
// Handle sets

/// A set of handles, stored as a bit set.
pub struct HandleSet<T> {
    elements: BitVec<u32, bitvec::order::Lsb0>,
    _phantom: PhantomData<T>,
}

impl<T> HandleSet<T> {
    /// Creates a new, empty handle set.
    pub fn new() -> HandleSet<T> {
        HandleSet::default()
    }

    /// Returns whether this set contains a particular handle.
    pub fn contains(&self, handle: Handle<T>) -> bool {
        self.elements.get(handle.as_usize()).map_or(false, |bit| *bit)
    }

    /// Adds a handle to this set.
    pub fn add(&mut self, handle: Handle<T>) {
        let index = handle.as_usize();
        if self.elements.len() <= index {
            self.elements.resize(index + 1, false);
        }
        self.elements.set(index, true);
    }

    /// Returns an iterator of all of the handles in this set.
    pub fn iter(&self) -> impl Iterator<Item = Handle<T>> + '_ {
        self.elements
            .iter_ones()
            .map(|index| Handle::new(unsafe { NonZeroU32::new_unchecked(index as u32) }))
    }
}

impl<T> Default for HandleSet<T> {
    fn default() -> HandleSet<T> {
        HandleSet {
            elements: BitVec::default(),
            _phantom: PhantomData,
        }
    }
}
