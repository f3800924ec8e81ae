// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-loop-key iteration counter.
//!
//! One of the two process-wide mutable maps in the system (the other is
//! `cm-adapters::AuthCache`); both are owned by a dedicated struct
//! constructed once by the Runner and threaded through by reference rather
//! than kept as a `static`.

use std::collections::HashMap;

use parking_lot::Mutex;

/// Key is `"{module_id}:{step_index}"`.
#[derive(Default)]
pub struct LoopCounter {
    counts: Mutex<HashMap<String, u32>>,
}

impl LoopCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(agent_id: &str, step_index: usize) -> String {
        format!("{agent_id}:{step_index}")
    }

    /// Increments and returns the new count for `key`, starting at 1.
    pub fn increment(&self, key: &str) -> u32 {
        let mut counts = self.counts.lock();
        let entry = counts.entry(key.to_string()).or_insert(0);
        *entry += 1;
        *entry
    }

    pub fn get(&self, key: &str) -> u32 {
        self.counts.lock().get(key).copied().unwrap_or(0)
    }

    pub fn reset(&self, key: &str) {
        self.counts.lock().remove(key);
    }
}

#[cfg(test)]
#[path = "loop_counter_tests.rs"]
mod tests;
