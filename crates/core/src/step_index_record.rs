// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-step persisted record shape (storage-agnostic).

use crate::id::{MonitoringId, SessionId, StepIndex};
use serde::{Deserialize, Serialize};

/// Durable per-step record.
///
/// Invariants enforced by the storage layer, never by this type alone:
/// - `completed_at` implies `started_at`.
/// - `completed_chains` is strictly increasing with no duplicates.
/// - `session_id` and `monitoring_id` are set together on first real
///   invocation (see [`StepIndexRecord::init_session`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepIndexRecord {
    pub step_index: StepIndex,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monitoring_id: Option<MonitoringId>,
    #[serde(default)]
    pub completed_chains: Vec<usize>,
}

impl StepIndexRecord {
    pub fn new(step_index: StepIndex) -> Self {
        Self {
            step_index,
            started_at: None,
            completed_at: None,
            session_id: None,
            monitoring_id: None,
            completed_chains: Vec::new(),
        }
    }

    /// `sessionId != nil AND completedAt == nil` — a step that has a live
    /// session but never finished can be resumed rather than restarted.
    pub fn is_resumable(&self) -> bool {
        self.session_id.is_some() && self.completed_at.is_none()
    }

    /// Idempotent: retains any earlier value.
    pub fn mark_started(&mut self, now_ms: u64) {
        if self.started_at.is_none() {
            self.started_at = Some(now_ms);
        }
    }

    /// Caller guarantees the step has already been started.
    pub fn init_session(&mut self, session_id: SessionId, monitoring_id: MonitoringId) {
        self.session_id = Some(session_id);
        self.monitoring_id = Some(monitoring_id);
    }

    /// Session may migrate across retries, so this overwrites unconditionally.
    pub fn update_session(&mut self, session_id: SessionId, monitoring_id: MonitoringId) {
        self.session_id = Some(session_id);
        self.monitoring_id = Some(monitoring_id);
    }

    /// Append-if-absent, keeping the list sorted.
    pub fn mark_chain_completed(&mut self, chain_index: usize) {
        if let Err(pos) = self.completed_chains.binary_search(&chain_index) {
            self.completed_chains.insert(pos, chain_index);
        }
    }

    /// No-op if already set.
    pub fn mark_completed(&mut self, now_ms: u64) {
        if self.completed_at.is_none() {
            self.completed_at = Some(now_ms);
        }
    }

    /// Smallest chain index not yet recorded as completed.
    pub fn next_chain_index(&self) -> usize {
        let mut next = 0usize;
        for &done in &self.completed_chains {
            if done == next {
                next += 1;
            } else {
                break;
            }
        }
        next
    }
}

#[cfg(test)]
#[path = "step_index_record_tests.rs"]
mod tests;
