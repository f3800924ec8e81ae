// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! UI-facing agent record: emitted on the event bus, never owned by the
//! runner past the moment it is published.

use crate::id::{AgentId, EngineId, StepIndex};
use serde::{Deserialize, Serialize};

/// Lifecycle status of one agent, as observed by any attached UI.
///
/// `Completed` and `Skipped` are terminal — once reached, no further status
/// transition is emitted for that agent within the same run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentUiStatus {
    Pending,
    Running,
    Awaiting,
    Completed,
    Skipped,
}

impl AgentUiStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, AgentUiStatus::Completed | AgentUiStatus::Skipped)
    }
}

/// Token counters reported by the engine while a step is executing. Fields
/// are cumulative for the current invocation, not the whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentTelemetry {
    pub tokens_in: u64,
    pub tokens_out: u64,
}

impl AgentTelemetry {
    pub fn new(tokens_in: u64, tokens_out: u64) -> Self {
        Self {
            tokens_in,
            tokens_out,
        }
    }
}

/// The record a UI renders for one agent. Produced by the runner and
/// published on the event bus; this struct is never mutated in place after
/// being emitted — each change is a fresh snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentUiRecord {
    pub id: AgentId,
    pub name: String,
    pub engine: Option<EngineId>,
    pub model: Option<String>,
    pub step_index: StepIndex,
    pub total_steps: usize,
    pub status: AgentUiStatus,
    pub order_index: usize,
    pub telemetry: AgentTelemetry,
}

impl AgentUiRecord {
    pub fn new(id: AgentId, name: impl Into<String>, step_index: StepIndex, total_steps: usize, order_index: usize) -> Self {
        Self {
            id,
            name: name.into(),
            engine: None,
            model: None,
            step_index,
            total_steps,
            status: AgentUiStatus::Pending,
            order_index,
            telemetry: AgentTelemetry::default(),
        }
    }
}

#[cfg(test)]
#[path = "agent_ui_tests.rs"]
mod tests;
