// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow template shape: ordered steps, tracks, and condition groups.

use cm_core::{AgentId, EngineId};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A follow-up prompt re-fed to the same agent conversation after its
/// initial run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainedPrompt {
    pub label: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<HashSet<String>>,
}

/// Behavior attached to a module step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModuleBehavior {
    #[serde(rename_all = "camelCase")]
    Loop { max_iterations: u32 },
    #[serde(rename_all = "camelCase")]
    Trigger { agent_id: AgentId },
    Checkpoint,
}

/// One step in the ordered template. `Separator` carries only a display
/// label; `Module` drives an agent invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "stepType", rename_all = "snake_case")]
pub enum Step {
    Module(ModuleStep),
    #[serde(rename_all = "camelCase")]
    Separator { label: String },
}

impl Step {
    pub fn as_module(&self) -> Option<&ModuleStep> {
        match self {
            Step::Module(m) => Some(m),
            Step::Separator { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleStep {
    pub agent_id: AgentId,
    pub agent_name: String,
    /// One or many prompt files, concatenated in order.
    pub prompt_path: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<EngineId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_reasoning_effort: Option<String>,
    #[serde(default)]
    pub execute_once: bool,
    /// Step included iff selected track is a member; empty means "always".
    #[serde(default, skip_serializing_if = "HashSet::is_empty")]
    pub tracks: HashSet<String>,
    /// All members must be present in the run's selected conditions.
    #[serde(default, skip_serializing_if = "HashSet::is_empty")]
    pub conditions: HashSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub behavior: Option<ModuleBehavior>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_agent_id: Option<AgentId>,
}

impl ModuleStep {
    /// `true` when the selected track excludes this step. An empty `tracks`
    /// set means the step runs on every track.
    pub fn excluded_by_track(&self, selected_track: Option<&str>) -> bool {
        if self.tracks.is_empty() {
            return false;
        }
        match selected_track {
            Some(track) => !self.tracks.contains(track),
            None => true,
        }
    }

    /// `true` when any required condition is missing from the selected set.
    pub fn excluded_by_conditions(&self, selected_conditions: &HashSet<String>) -> bool {
        self.conditions
            .iter()
            .any(|required| !selected_conditions.contains(required))
    }
}

/// A track question the user answers once during onboarding; enumerated
/// options gate steps whose `tracks` set names the chosen option.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackDef {
    pub question: String,
    pub options: IndexSet<String>,
}

/// One condition question. `multi_select` groups accumulate into a scratch
/// set and commit on confirm; single-select groups commit immediately.
/// `child_groups` maps a chosen option id to nested groups asked afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionGroup {
    pub question: String,
    #[serde(default)]
    pub multi_select: bool,
    pub options: IndexSet<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub child_groups: Vec<ConditionGroup>,
    #[serde(default, skip_serializing_if = "HashSet::is_empty")]
    pub tracks: HashSet<String>,
}

impl ConditionGroup {
    pub fn gated_out(&self, selected_track: Option<&str>) -> bool {
        if self.tracks.is_empty() {
            return false;
        }
        match selected_track {
            Some(track) => !self.tracks.contains(track),
            None => true,
        }
    }
}

/// A controller module run before normal steps; shares the `ModuleStep`
/// shape so it can be driven by the same Step Executor.
pub type ControllerStep = ModuleStep;

/// The full parsed template: read-only once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowTemplate {
    pub steps: Vec<Step>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracks: Option<TrackDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub condition_groups: Vec<ConditionGroup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller: Option<ControllerStep>,
    /// When true, pre-flight requires a non-empty, non-placeholder
    /// specification file before the run starts.
    #[serde(default)]
    pub specification: bool,
}

impl WorkflowTemplate {
    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    pub fn module_steps(&self) -> impl Iterator<Item = (usize, &ModuleStep)> {
        self.steps
            .iter()
            .enumerate()
            .filter_map(|(idx, step)| step.as_module().map(|m| (idx, m)))
    }

    /// Steps that will actually execute under the given track + conditions,
    /// in template order — used to compute the `workflow:started` module
    /// count and pre-population order index.
    pub fn matching_steps<'a>(
        &'a self,
        selected_track: Option<&'a str>,
        selected_conditions: &'a HashSet<String>,
    ) -> impl Iterator<Item = (usize, &'a ModuleStep)> + 'a {
        self.module_steps().filter(move |(_, step)| {
            !step.excluded_by_track(selected_track) && !step.excluded_by_conditions(selected_conditions)
        })
    }
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;
