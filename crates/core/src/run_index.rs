// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide run metadata, materialized for fast startup queries.

use crate::id::StepIndex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// Process-wide run state: at most one selected track, the set of selected
/// conditions, and derived completed/not-completed step lists kept in sync
/// with the on-disk step records so a fresh process doesn't have to rescan
/// every record to answer "which steps are left".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunIndex {
    pub project_name: Option<String>,
    pub template_path: Option<PathBuf>,
    pub selected_track: Option<String>,
    #[serde(default)]
    pub selected_conditions: HashSet<String>,
    #[serde(default)]
    pub completed_steps: Vec<StepIndex>,
    #[serde(default)]
    pub not_completed_steps: Vec<StepIndex>,
}

impl RunIndex {
    pub fn mark_completed(&mut self, idx: StepIndex) {
        self.not_completed_steps.retain(|&s| s != idx);
        if !self.completed_steps.contains(&idx) {
            self.completed_steps.push(idx);
        }
    }

    pub fn remove_from_not_completed(&mut self, idx: StepIndex) {
        self.not_completed_steps.retain(|&s| s != idx);
    }

    pub fn mark_not_completed(&mut self, idx: StepIndex) {
        if !self.not_completed_steps.contains(&idx) {
            self.not_completed_steps.push(idx);
        }
    }
}

#[cfg(test)]
#[path = "run_index_tests.rs"]
mod tests;
