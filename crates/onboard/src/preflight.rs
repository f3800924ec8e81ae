// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pre-flight Checks: run before the workflow runner starts, in two phases —
//! specification validation, then a read of what onboarding still needs.

use std::path::{Path, PathBuf};

use cm_core::RunIndex;
use cm_template::WorkflowTemplate;

use crate::error::OnboardError;

const SPEC_PATH_ENV: &str = "CODEMACHINE_SPEC_PATH";
const DEFAULT_SPEC_RELATIVE_PATH: &str = ".codemachine/inputs/specifications.md";
const DEFAULT_SPEC_PLACEHOLDER: &str = "# Specification\n\nDescribe what this workflow should build, then re-run.\n";

/// Resolves `CODEMACHINE_SPEC_PATH`, falling back to the default location
/// under the working directory.
pub fn resolve_spec_path(working_dir: &Path) -> PathBuf {
    match std::env::var(SPEC_PATH_ENV) {
        Ok(value) => PathBuf::from(value),
        Err(_) => working_dir.join(DEFAULT_SPEC_RELATIVE_PATH),
    }
}

/// Phase 1: validates (or seeds) the specification file. A no-op unless the
/// loaded template's `specification` flag is set.
pub fn check_specification(template: &WorkflowTemplate, spec_path: &Path) -> Result<(), OnboardError> {
    if !template.specification {
        return Ok(());
    }

    if spec_path.is_dir() {
        return Err(OnboardError::SpecificationIsDirectory {
            path: spec_path.to_path_buf(),
        });
    }

    if !spec_path.exists() {
        if let Some(parent) = spec_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(spec_path, DEFAULT_SPEC_PLACEHOLDER)?;
        return Err(OnboardError::SpecificationPlaceholder {
            path: spec_path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(spec_path)?;
    if content.trim().is_empty() || content.trim() == DEFAULT_SPEC_PLACEHOLDER.trim() {
        return Err(OnboardError::SpecificationPlaceholder {
            path: spec_path.to_path_buf(),
        });
    }

    Ok(())
}

/// What onboarding still needs to collect before a run can start.
/// `needs_controller_selection` is always `false` — controllers are
/// template-specified in this generation, never user-chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnboardingNeeds {
    pub needs_project_name: bool,
    pub needs_track_selection: bool,
    pub needs_conditions_selection: bool,
    pub needs_controller_selection: bool,
}

/// Phase 2: derives onboarding needs from the persisted run index and the
/// loaded template, without re-running any FSM.
pub fn check_onboarding_needs(template: &WorkflowTemplate, run_index: &RunIndex) -> OnboardingNeeds {
    OnboardingNeeds {
        needs_project_name: run_index.project_name.is_none(),
        needs_track_selection: template.tracks.is_some() && run_index.selected_track.is_none(),
        needs_conditions_selection: !template.condition_groups.is_empty()
            && run_index.selected_conditions.is_empty(),
        needs_controller_selection: false,
    }
}

#[cfg(test)]
#[path = "preflight_tests.rs"]
mod tests;
