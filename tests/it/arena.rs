// -*- coding: utf-8 -*-
// ------------------------------------------------------------------------------------------------
// Copyright © 2022, statement-graphs authors.
// Licensed under either of Apache License, Version 2.0, or MIT license, at your option.
// Please see the LICENSE-APACHE or LICENSE-MIT files in this distribution for license details.
// ------------------------------------------------------------------------------------------------

use std::collections::HashSet;

use statement_graphs::arena::Arena;
use statement_graphs::arena::HandleSet;

#[test]
fn can_allocate_in_arena() {
    let mut arena = Arena::new();
    let hello1 = arena.add("hello".to_string());
    let hello2 = arena.add("hello".to_string());
    let there = arena.add("there".to_string());
    assert_ne!(hello1, hello2);
    assert_ne!(hello1, there);
    assert_ne!(hello2, there);
    assert_eq!(arena.get(hello1), arena.get(hello2));
    assert_ne!(arena.get(hello1), arena.get(there));
    assert_ne!(arena.get(hello2), arena.get(there));
}

#[test]
fn can_mutate_in_arena() {
    let mut arena = Arena::<u32>::new();
    let h = arena.add(1);
    *arena.get_mut(h) += 1;
    assert_eq!(*arena.get(h), 2);
}

#[test]
fn can_iterate_handles_in_insertion_order() {
    let mut arena = Arena::<u32>::new();
    let h1 = arena.add(10);
    let h2 = arena.add(20);
    let h3 = arena.add(30);
    let handles = arena.iter_handles().collect::<Vec<_>>();
    assert_eq!(handles, vec![h1, h2, h3]);
    let values = handles
        .into_iter()
        .map(|handle| *arena.get(handle))
        .collect::<Vec<_>>();
    assert_eq!(values, vec![10, 20, 30]);
}

#[test]
fn can_add_to_handle_set() {
    let mut arena = Arena::<u32>::new();
    let h1 = arena.add(1);
    let h2 = arena.add(2);
    let h3 = arena.add(3);
    let mut set = HandleSet::new();
    set.add(h1);
    set.add(h3);
    assert!(set.contains(h1));
    assert!(!set.contains(h2));
    assert!(set.contains(h3));
    let members = set.iter().collect::<HashSet<_>>();
    assert_eq!(members, vec![h1, h3].into_iter().collect::<HashSet<_>>());
}
