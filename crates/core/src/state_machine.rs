// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-step finite state machine and its carried context.

use serde::{Deserialize, Serialize};

/// States a single step's execution moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepState {
    Idle,
    Running,
    Awaiting,
    Delegated,
    Completed,
    Stopped,
}

/// Inputs accepted by [`StepState::apply`]. Any input not matched by a
/// transition in the current state is ignored — the state is returned
/// unchanged.
#[derive(Debug, Clone)]
pub enum StateEvent {
    Start,
    StepComplete,
    InputReceived { prompt: Option<String> },
    Resume,
    Skip,
    Stop,
    StepError,
    Pause,
}

impl StepState {
    /// Apply one event, returning the next state. `Pause` never changes the
    /// state directly — it only flags intent the runner consults on the next
    /// `Awaiting` entry or cancellation.
    pub fn apply(self, event: &StateEvent) -> StepState {
        use StateEvent::*;
        use StepState::*;
        match (self, event) {
            (Idle, Start) => Running,
            (Running, StepComplete) => Awaiting,
            (Running, StepError) => Stopped,
            (Running, Pause) => Running,
            (Awaiting, InputReceived { prompt: None }) => Running,
            (Awaiting, InputReceived { prompt: Some(p) }) if p.is_empty() => Running,
            (Awaiting, InputReceived { .. }) => Delegated,
            (Awaiting, Skip) => Running,
            (Awaiting, Stop) => Stopped,
            (Delegated, StepComplete) => Awaiting,
            (_, Resume) => Running,
            (current, _) => current,
        }
    }
}

/// Unifies the pause / chained-prompt / steering booleans the source
/// scatters across several flags into one carrier. `promptQueue` is the only
/// place queued prompts live.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum InputState {
    #[default]
    Idle,
    Active,
}

/// Context the Runner exclusively owns for the lifetime of one workflow run.
#[derive(Debug, Clone)]
pub struct StateMachineContext {
    pub current_step_index: usize,
    pub total_steps: usize,
    pub current_output: Option<String>,
    pub current_monitoring_id: Option<u64>,
    pub prompt_queue: Vec<String>,
    pub prompt_queue_index: usize,
    pub auto_mode: bool,
    pub paused: bool,
    pub continuation_prompt_sent: bool,
    pub input_state: InputState,
}

impl StateMachineContext {
    pub fn new(total_steps: usize, auto_mode: bool) -> Self {
        Self {
            current_step_index: 0,
            total_steps,
            current_output: None,
            current_monitoring_id: None,
            prompt_queue: Vec::new(),
            prompt_queue_index: 0,
            auto_mode,
            paused: false,
            continuation_prompt_sent: false,
            input_state: InputState::Idle,
        }
    }

    /// Reset on every transition into `Running`, per the state machine's
    /// invariant that a continuation prompt is sent at most once per step.
    pub fn reset_for_running(&mut self) {
        self.continuation_prompt_sent = false;
    }

    pub fn has_queued_prompt(&self) -> bool {
        self.prompt_queue_index < self.prompt_queue.len()
    }

    pub fn next_queued_prompt(&self) -> Option<&str> {
        self.prompt_queue.get(self.prompt_queue_index).map(|s| s.as_str())
    }
}

/// A loop currently rewinding execution, set by the Behavior Engine's Loop
/// decision and consulted by `shouldSkipStep` for its `skipList`.
#[derive(Debug, Clone)]
pub struct ActiveLoop {
    pub source_agent: crate::id::AgentId,
    pub back_steps: usize,
    pub iteration: u32,
    pub max_iterations: u32,
    pub skip_list: Vec<usize>,
    pub reason: String,
}

impl ActiveLoop {
    /// `iteration` exceeds `max_iterations` exactly once, at which point no
    /// further repeat decision may be honored.
    pub fn exceeded(&self) -> bool {
        self.iteration > self.max_iterations
    }
}

#[cfg(test)]
#[path = "state_machine_tests.rs"]
mod tests;
