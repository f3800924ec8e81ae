// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Behavior Engine: inspects step output for `[[codemachine:behavior <json>]]`
//! markers and turns them into Skip/Loop/Trigger/Checkpoint decisions.
//!
//! The engine is deliberately not a general-purpose parser: any line that
//! isn't a marker is ignored.

use std::collections::HashSet;
use std::sync::LazyLock;

use cm_core::{ActiveLoop, AgentId};
use cm_template::ModuleStep;
use regex::Regex;
use serde::Deserialize;

#[allow(clippy::expect_used)]
static MARKER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\[\[codemachine:behavior (.+)\]\]\s*$").expect("constant regex pattern is valid")
});

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum MarkerPayload {
    Repeat {
        #[serde(default)]
        steps_back: usize,
        #[serde(default)]
        skip_list: Vec<usize>,
        #[serde(default)]
        reason: String,
    },
    Trigger {
        #[serde(default)]
        requested: bool,
    },
    CheckpointContinue,
    CheckpointQuit,
}

/// Parsed marker decisions found in one step's output, in the order they
/// appeared.
fn parse_markers(output: &str) -> Vec<MarkerPayload> {
    MARKER_PATTERN
        .captures_iter(output)
        .filter_map(|caps| serde_json::from_str(&caps[1]).ok())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipDecision {
    pub skip: bool,
    pub reason: Option<String>,
}

/// Evaluated before each step, per the ordering rules in the module doc.
pub fn should_skip_step(
    step: &ModuleStep,
    already_complete: bool,
    active_loop: Option<&ActiveLoop>,
    step_index: usize,
    selected_track: Option<&str>,
    selected_conditions: &HashSet<String>,
) -> SkipDecision {
    if step.execute_once && already_complete {
        return SkipDecision {
            skip: true,
            reason: Some("step already completed and is execute-once".into()),
        };
    }
    if let Some(active_loop) = active_loop {
        if active_loop.skip_list.contains(&step_index) {
            return SkipDecision {
                skip: true,
                reason: Some("step is in the active loop's skip list".into()),
            };
        }
    }
    if step.excluded_by_track(selected_track) {
        return SkipDecision {
            skip: true,
            reason: Some("step excluded by selected track".into()),
        };
    }
    if step.excluded_by_conditions(selected_conditions) {
        return SkipDecision {
            skip: true,
            reason: Some("step excluded by selected conditions".into()),
        };
    }
    SkipDecision {
        skip: false,
        reason: None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopDecision {
    pub should_repeat: bool,
    pub steps_back: usize,
    pub skip_list: Vec<usize>,
    pub reason: String,
}

/// Evaluate a `loop` behavior's markers against the step's output.
///
/// `source_agent`/`step_index` identify the loop key consulted in
/// `LoopCounter`; `max_iterations` stops honoring further repeats once
/// exceeded.
pub fn evaluate_loop(output: &str, iteration: u32, max_iterations: u32) -> LoopDecision {
    if iteration > max_iterations {
        return LoopDecision {
            should_repeat: false,
            steps_back: 0,
            skip_list: Vec::new(),
            reason: "max iterations exceeded".into(),
        };
    }
    for marker in parse_markers(output) {
        if let MarkerPayload::Repeat {
            steps_back,
            skip_list,
            reason,
        } = marker
        {
            return LoopDecision {
                should_repeat: true,
                steps_back,
                skip_list,
                reason,
            };
        }
    }
    LoopDecision {
        should_repeat: false,
        steps_back: 0,
        skip_list: Vec::new(),
        reason: String::new(),
    }
}

/// `true` when the step's output requested its trigger agent run.
pub fn evaluate_trigger(output: &str) -> bool {
    parse_markers(output)
        .into_iter()
        .any(|marker| matches!(marker, MarkerPayload::Trigger { requested: true }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointOutcome {
    Continue,
    Quit,
}

/// Parses an explicit checkpoint marker from output, if the agent embedded
/// one proactively rather than the runner blocking on a user event.
pub fn parse_checkpoint_marker(output: &str) -> Option<CheckpointOutcome> {
    parse_markers(output).into_iter().find_map(|marker| match marker {
        MarkerPayload::CheckpointContinue => Some(CheckpointOutcome::Continue),
        MarkerPayload::CheckpointQuit => Some(CheckpointOutcome::Quit),
        _ => None,
    })
}

/// Build the `ActiveLoop` the Runner installs after a `Repeat` decision.
pub fn new_active_loop(
    source_agent: AgentId,
    decision: &LoopDecision,
    iteration: u32,
    max_iterations: u32,
) -> ActiveLoop {
    ActiveLoop {
        source_agent,
        back_steps: decision.steps_back,
        iteration,
        max_iterations,
        skip_list: decision.skip_list.clone(),
        reason: decision.reason.clone(),
    }
}

#[cfg(test)]
#[path = "behavior_tests.rs"]
mod tests;
