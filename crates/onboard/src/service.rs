// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Onboarding Service: drives the onboarding FSM defined in
//! `cm_core::onboarding`, turning user submissions into state transitions
//! and bus events.

use std::sync::Arc;

use async_trait::async_trait;
use cm_core::{AgentId, ChildQuestionContext, Event, OnboardingState, OnboardingStep};
use cm_bus::EventBus;
use cm_template::{ConditionGroup, ModuleStep, WorkflowTemplate};

use crate::error::OnboardError;

/// External collaborator that brings the controller agent online once
/// onboarding reaches `launching`. Kept as a trait so the service itself
/// stays free of any particular engine's session-start mechanics.
#[async_trait]
pub trait ControllerInitializer: Send + Sync {
    async fn init(&self, controller: &ModuleStep, project_name: &str) -> Result<AgentId, OnboardError>;
}

/// Drives `{project_name, tracks, condition_group, condition_child,
/// controller_conversation, launching}` to completion or cancellation.
pub struct OnboardingService {
    template: Arc<WorkflowTemplate>,
    bus: EventBus,
    state: OnboardingState,
    controller_init: Arc<dyn ControllerInitializer>,
}

impl OnboardingService {
    pub fn new(
        template: Arc<WorkflowTemplate>,
        bus: EventBus,
        initial_project_name: Option<String>,
        controller_init: Arc<dyn ControllerInitializer>,
    ) -> Self {
        Self {
            state: OnboardingState::new(initial_project_name),
            template,
            bus,
            controller_init,
        }
    }

    pub fn current_step(&self) -> OnboardingStep {
        self.state.current_step
    }

    pub fn state(&self) -> &OnboardingState {
        &self.state
    }

    /// Emits the entry event for whichever step the FSM starts on —
    /// `project_name` normally, or straight into `tracks`/conditions/launch
    /// when an initial project name skipped it.
    pub fn start(&mut self) {
        match self.state.current_step {
            OnboardingStep::ProjectName => self.bus.emit(Event::OnboardStep {
                step: "project_name".into(),
            }),
            _ => self.enter_tracks_or_skip(),
        }
    }

    pub fn submit_project_name(&mut self, name: String) -> Result<(), OnboardError> {
        self.expect_step(OnboardingStep::ProjectName, "project_name")?;
        self.state.project_name = Some(name.clone());
        self.bus.emit(Event::OnboardProjectName { project_name: name });
        self.enter_tracks_or_skip();
        Ok(())
    }

    pub fn submit_track(&mut self, track_id: String) -> Result<(), OnboardError> {
        self.expect_step(OnboardingStep::Tracks, "track")?;
        let valid = self
            .template
            .tracks
            .as_ref()
            .is_some_and(|t| t.options.contains(&track_id));
        if !valid {
            return Err(OnboardError::UnknownOption { option_id: track_id });
        }
        self.state.selected_track_id = Some(track_id.clone());
        self.bus.emit(Event::OnboardTrack { track_id });
        self.enter_first_condition_group_or_finish();
        Ok(())
    }

    /// Toggles one option of a multi-select group's scratch selection.
    pub fn toggle_condition(&mut self, option_id: String) -> Result<(), OnboardError> {
        let group = self.require_active_group(true)?;
        if !group.options.contains(&option_id) {
            return Err(OnboardError::UnknownOption { option_id });
        }
        if !self.state.current_group_selections.remove(&option_id) {
            self.state.current_group_selections.insert(option_id.clone());
        }
        self.bus.emit(Event::OnboardCondition {
            group_index: self.state.current_group_index,
            option_id,
        });
        Ok(())
    }

    /// Commits a multi-select group's scratch selections and queues any
    /// child groups gated behind the chosen options.
    pub fn confirm_selections(&mut self) -> Result<(), OnboardError> {
        self.require_active_group(true)?;
        let group_index = self.state.current_group_index;
        let chosen: Vec<String> = self.state.current_group_selections.iter().cloned().collect();
        self.state.confirm_selections();
        self.bus.emit(Event::OnboardConditionsConfirmed {
            conditions: chosen.clone(),
        });
        self.queue_children(group_index, &chosen);
        self.advance_group_index();
        Ok(())
    }

    /// Single-select commit: picks and confirms in one call.
    pub fn select_condition(&mut self, option_id: String) -> Result<(), OnboardError> {
        let group = self.require_active_group(false)?;
        if !group.options.contains(&option_id) {
            return Err(OnboardError::UnknownOption { option_id });
        }
        let group_index = self.state.current_group_index;
        self.state.select_condition(option_id.clone());
        self.bus.emit(Event::OnboardCondition {
            group_index,
            option_id: option_id.clone(),
        });
        self.queue_children(group_index, std::slice::from_ref(&option_id));
        self.advance_group_index();
        Ok(())
    }

    /// Walks the same toggle/confirm/select operations for whichever child
    /// group is currently active. Children are one level deep: a child
    /// group's own `child_groups` are never queued.
    pub fn toggle_child_condition(&mut self, option_id: String) -> Result<(), OnboardError> {
        let group = self.require_active_child(true)?;
        if !group.options.contains(&option_id) {
            return Err(OnboardError::UnknownOption { option_id });
        }
        if !self.state.current_group_selections.remove(&option_id) {
            self.state.current_group_selections.insert(option_id.clone());
        }
        self.bus.emit(Event::OnboardCondition {
            group_index: self.state.current_group_index,
            option_id,
        });
        Ok(())
    }

    pub fn confirm_child_selections(&mut self) -> Result<(), OnboardError> {
        self.require_active_child(true)?;
        let chosen: Vec<String> = self.state.current_group_selections.iter().cloned().collect();
        self.state.confirm_selections();
        self.bus.emit(Event::OnboardConditionsConfirmed { conditions: chosen });
        self.process_next_child_or_finish();
        Ok(())
    }

    pub fn select_child_condition(&mut self, option_id: String) -> Result<(), OnboardError> {
        let group = self.require_active_child(false)?;
        if !group.options.contains(&option_id) {
            return Err(OnboardError::UnknownOption { option_id });
        }
        self.state.select_condition(option_id.clone());
        self.bus.emit(Event::OnboardCondition {
            group_index: self.state.current_group_index,
            option_id,
        });
        self.process_next_child_or_finish();
        Ok(())
    }

    /// Cancellation is always permitted, from any step.
    pub fn cancel(&mut self) {
        self.bus.emit(Event::OnboardCancelled);
    }

    /// Brings the controller agent online (if the template declares one)
    /// and emits the final `onboard:completed` event.
    pub async fn launch(&mut self) -> Result<(), OnboardError> {
        self.state.current_step = OnboardingStep::Launching;
        self.bus.emit(Event::OnboardStep { step: "launching".into() });
        self.bus.emit(Event::OnboardLaunchingLog {
            line: "preparing workflow".into(),
        });

        let controller_agent_id = match &self.template.controller {
            Some(controller) => {
                let project_name = self.state.project_name.clone().unwrap_or_default();
                let agent_id = self.controller_init.init(controller, &project_name).await?;
                self.bus.emit(Event::OnboardLaunchingLog {
                    line: format!("controller agent {agent_id} ready"),
                });
                Some(agent_id)
            }
            None => None,
        };

        self.bus.emit(Event::OnboardCompleted {
            project_name: self.state.project_name.clone().unwrap_or_default(),
            track_id: self.state.selected_track_id.clone(),
            conditions: self.state.selected_conditions.iter().cloned().collect(),
            controller_agent_id,
        });
        Ok(())
    }

    fn enter_tracks_or_skip(&mut self) {
        if self.template.tracks.is_some() {
            self.state.current_step = OnboardingStep::Tracks;
            self.bus.emit(Event::OnboardStep { step: "tracks".into() });
        } else {
            self.enter_first_condition_group_or_finish();
        }
    }

    fn enter_first_condition_group_or_finish(&mut self) {
        self.state.current_group_index = 0;
        self.advance_group_index_from_current();
    }

    fn advance_group_index(&mut self) {
        self.state.current_group_index += 1;
        self.advance_group_index_from_current();
    }

    fn advance_group_index_from_current(&mut self) {
        let track = self.state.selected_track_id.as_deref();
        while let Some(group) = self.template.condition_groups.get(self.state.current_group_index) {
            if !group.gated_out(track) {
                break;
            }
            self.state.current_group_index += 1;
        }

        if self.state.current_group_index < self.template.condition_groups.len() {
            self.state.current_step = OnboardingStep::ConditionGroup;
            self.bus.emit(Event::OnboardStep {
                step: "condition_group".into(),
            });
        } else {
            self.process_next_child_or_finish();
        }
    }

    fn process_next_child_or_finish(&mut self) {
        if self.state.advance_to_next_child_question() {
            self.state.current_step = OnboardingStep::ConditionChild;
            self.bus.emit(Event::OnboardStep {
                step: "condition_child".into(),
            });
        } else {
            self.advance_after_conditions();
        }
    }

    fn advance_after_conditions(&mut self) {
        if self.template.controller.is_some() {
            self.state.current_step = OnboardingStep::ControllerConversation;
            self.bus.emit(Event::OnboardStep {
                step: "controller_conversation".into(),
            });
        } else {
            self.state.current_step = OnboardingStep::Launching;
            self.bus.emit(Event::OnboardStep { step: "launching".into() });
        }
    }

    /// Queues a child group for every chosen option that has one, keyed by
    /// the option's position among its parent's `options` — the template
    /// schema has no explicit per-option child pointer, so position is the
    /// agreed mapping between `options[i]` and `child_groups[i]`.
    fn queue_children(&mut self, group_index: usize, chosen: &[String]) {
        let Some(group) = self.template.condition_groups.get(group_index) else {
            return;
        };
        for option_id in chosen {
            if let Some(idx) = group.options.get_index_of(option_id) {
                if idx < group.child_groups.len() {
                    self.state.queue_child_question(ChildQuestionContext {
                        parent_group_index: group_index,
                        parent_option_id: option_id.clone(),
                    });
                }
            }
        }
    }

    fn resolve_child_group(&self, ctx: &ChildQuestionContext) -> Option<&ConditionGroup> {
        let group = self.template.condition_groups.get(ctx.parent_group_index)?;
        let idx = group.options.get_index_of(&ctx.parent_option_id)?;
        group.child_groups.get(idx)
    }

    fn require_active_group(&self, multi_select: bool) -> Result<&ConditionGroup, OnboardError> {
        if self.state.current_step != OnboardingStep::ConditionGroup {
            return Err(OnboardError::WrongStep {
                current: self.state.current_step,
                attempted: "condition",
            });
        }
        let group = self
            .template
            .condition_groups
            .get(self.state.current_group_index)
            .ok_or(OnboardError::WrongStep {
                current: self.state.current_step,
                attempted: "condition",
            })?;
        if group.multi_select != multi_select {
            return Err(OnboardError::WrongStep {
                current: self.state.current_step,
                attempted: if multi_select { "toggle/confirm" } else { "select" },
            });
        }
        Ok(group)
    }

    fn require_active_child(&self, multi_select: bool) -> Result<&ConditionGroup, OnboardError> {
        if self.state.current_step != OnboardingStep::ConditionChild {
            return Err(OnboardError::WrongStep {
                current: self.state.current_step,
                attempted: "condition_child",
            });
        }
        let ctx = self
            .state
            .current_child_context
            .as_ref()
            .ok_or(OnboardError::WrongStep {
                current: self.state.current_step,
                attempted: "condition_child",
            })?;
        let group = self.resolve_child_group(ctx).ok_or(OnboardError::WrongStep {
            current: self.state.current_step,
            attempted: "condition_child",
        })?;
        if group.multi_select != multi_select {
            return Err(OnboardError::WrongStep {
                current: self.state.current_step,
                attempted: if multi_select { "toggle/confirm" } else { "select" },
            });
        }
        Ok(group)
    }

    fn expect_step(&self, expected: OnboardingStep, attempted: &'static str) -> Result<(), OnboardError> {
        if self.state.current_step == expected {
            Ok(())
        } else {
            Err(OnboardError::WrongStep {
                current: self.state.current_step,
                attempted,
            })
        }
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
