// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn increment_starts_at_one_and_accumulates() {
    let counter = LoopCounter::new();
    let key = LoopCounter::key("builder", 3);
    assert_eq!(counter.increment(&key), 1);
    assert_eq!(counter.increment(&key), 2);
    assert_eq!(counter.get(&key), 2);
}

#[test]
fn distinct_keys_are_independent() {
    let counter = LoopCounter::new();
    counter.increment("a:1");
    counter.increment("b:1");
    counter.increment("b:1");
    assert_eq!(counter.get("a:1"), 1);
    assert_eq!(counter.get("b:1"), 2);
}

#[test]
fn reset_clears_the_count() {
    let counter = LoopCounter::new();
    counter.increment("a:1");
    counter.reset("a:1");
    assert_eq!(counter.get("a:1"), 0);
}
