// -*- coding: utf-8 -*-
// ------------------------------------------------------------------------------------------------
// Copyright © 2022, statement-graphs authors.
// Licensed under either of Apache License, Version 2.0, or MIT license, at your option.
// Please see the LICENSE-APACHE or LICENSE-MIT files in this distribution for license details.
// ------------------------------------------------------------------------------------------------

//! Statement graphs represent the control flow of a unit of code — each node carries one
//! statement, each edge one possible transfer of control — and this crate mines them for
//! _usage patterns_: statement sequences that recur across many executions of the code.  The
//! pipeline has three stages.
//!
//! First, **path enumeration** unfolds a graph into the concrete routes execution can take
//! through it.  A synthetic exit sentinel is attached below every leaf so that enumeration has a
//! uniform notion of "the program ends here", and cycles are unrolled a bounded number of times
//! (each node may appear at most twice on one path, so a loop body shows up executed once and
//! twice).  Because a path commits to one side of every branch, the branching statements on it
//! are then _coerced_: each one is copied, and the copy's jump targets are redirected so they
//! land on the path itself.  The result is a collection of standalone statement sequences, each
//! one a plausible straight-line execution of the original code.
//!
//! Second, a **generalized node comparator** decides when two statements should count as the
//! same pattern element.  Exact value identity is too strict — `a = b + c` and `x = y + z` are
//! the same usage — but pure shape equality is too loose, since `x = y + y` reuses an operand
//! where the template uses two distinct ones.  The comparator abstracts operand values into
//! _tags_, learned incrementally as comparisons are made, so that operand identity relationships
//! must be preserved across an entire candidate pattern.
//!
//! Third, **frequent-sequence detection** runs a closed contiguous sequential pattern search
//! (CCSpan) over all enumerated paths, using the comparator as its equality.  Sequences
//! occurring in at least a configured number of paths are reported, but only _closed_ ones: a
//! sequence subsumed by an equally frequent extension of itself is suppressed.
//!
//! Graphs are built directly via [`graph::StatementGraph`][]; everything in them lives in
//! arenas and is addressed by small [`arena::Handle`][]s rather than references, which keeps the
//! enumeration and mining machinery free of lifetime entanglements and makes node identity
//! explicit (two nodes can carry equivalent statements while remaining distinct occurrences).

#[macro_use]
mod debugging;

pub mod arena;
pub mod coerce;
pub mod compare;
pub mod equiv;
pub mod graph;
pub mod paths;
pub mod patterns;
pub mod visit;
#[cfg(feature = "visualization")]
pub mod visualization;
