// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Onboarding FSM state, independent of the service that drives it
//! (see `cm-onboard`).

use std::collections::HashSet;

/// Step the onboarding FSM is currently on. Progresses in this fixed order;
/// `ProjectName` is skipped entirely when an initial project name was
/// supplied to the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnboardingStep {
    ProjectName,
    Tracks,
    ConditionGroup,
    ConditionChild,
    ControllerConversation,
    Launching,
}

/// Which parent option a pending child condition group is gated behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildQuestionContext {
    pub parent_group_index: usize,
    pub parent_option_id: String,
}

/// Mutable scratch state the onboarding service accumulates while walking
/// the FSM. Not persisted across process restarts — onboarding is expected
/// to complete or be cancelled within one process lifetime.
#[derive(Debug, Clone)]
pub struct OnboardingState {
    pub current_step: OnboardingStep,
    pub project_name: Option<String>,
    pub selected_track_id: Option<String>,
    pub selected_conditions: HashSet<String>,
    pub current_group_index: usize,
    pub current_group_selections: HashSet<String>,
    pub pending_child_questions: Vec<ChildQuestionContext>,
    pub current_child_context: Option<ChildQuestionContext>,
}

impl OnboardingState {
    /// `initial_project_name`, when present, skips the `ProjectName` step
    /// entirely by starting the FSM at `Tracks`.
    pub fn new(initial_project_name: Option<String>) -> Self {
        let (current_step, project_name) = match initial_project_name {
            Some(name) => (OnboardingStep::Tracks, Some(name)),
            None => (OnboardingStep::ProjectName, None),
        };
        Self {
            current_step,
            project_name,
            selected_track_id: None,
            selected_conditions: HashSet::new(),
            current_group_index: 0,
            current_group_selections: HashSet::new(),
            pending_child_questions: Vec::new(),
            current_child_context: None,
        }
    }

    pub fn queue_child_question(&mut self, ctx: ChildQuestionContext) {
        self.pending_child_questions.push(ctx);
    }

    /// Pops the next queued child question, if any, and makes it current.
    pub fn advance_to_next_child_question(&mut self) -> bool {
        if self.pending_child_questions.is_empty() {
            self.current_child_context = None;
            return false;
        }
        self.current_child_context = Some(self.pending_child_questions.remove(0));
        true
    }

    /// Commits the scratch multi-select set into `selected_conditions` and
    /// clears it, ready for the next group.
    pub fn confirm_selections(&mut self) {
        self.selected_conditions
            .extend(self.current_group_selections.drain());
    }

    /// Single-select commit: one option, immediately folded into the
    /// confirmed set (no separate confirm step).
    pub fn select_condition(&mut self, option_id: impl Into<String>) {
        self.selected_conditions.insert(option_id.into());
    }
}

#[cfg(test)]
#[path = "onboarding_tests.rs"]
mod tests;
