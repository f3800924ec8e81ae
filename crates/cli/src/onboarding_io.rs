// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Drives the onboarding service from a plain terminal: one blocking
//! `stdin` read per question, matching the teacher's own CLI style
//! (`output.rs` reads lines off `stdin` directly rather than reaching for
//! an interactive-prompt crate).

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use async_trait::async_trait;
use cm_adapters::EngineRegistry;
use cm_core::{AgentId, ChildQuestionContext, OnboardingStep};
use cm_onboard::{ControllerInitializer, OnboardError, OnboardingService};
use cm_template::{ConditionGroup, ModuleStep, WorkflowTemplate};

/// Brings the controller agent online ahead of the main run by resolving
/// (and thereby authenticating) its engine. The controller's actual
/// conversation happens later, during the workflow loop, via
/// `cm_engine::ControllerInputProvider` — initialization here only confirms
/// the controller's engine is usable so `launch()` can fail fast otherwise.
pub struct ProcessControllerInitializer {
    registry: Arc<EngineRegistry>,
}

impl ProcessControllerInitializer {
    pub fn new(registry: Arc<EngineRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl ControllerInitializer for ProcessControllerInitializer {
    async fn init(&self, controller: &ModuleStep, _project_name: &str) -> Result<AgentId, OnboardError> {
        self.registry
            .resolve(controller.engine.as_ref())
            .await
            .map_err(|err| OnboardError::ControllerInitFailed(err.to_string()))?;
        Ok(controller.agent_id.clone())
    }
}

fn prompt_line(prompt: &str) -> io::Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn render_options(options: impl Iterator<Item = impl AsRef<str>>) -> String {
    options.map(|o| o.as_ref().to_string()).collect::<Vec<_>>().join(", ")
}

fn child_group<'a>(template: &'a WorkflowTemplate, ctx: &ChildQuestionContext) -> Option<&'a ConditionGroup> {
    let group = template.condition_groups.get(ctx.parent_group_index)?;
    let idx = group.options.get_index_of(&ctx.parent_option_id)?;
    group.child_groups.get(idx)
}

fn run_group(service: &mut OnboardingService, group: &ConditionGroup, is_child: bool) -> Result<(), OnboardError> {
    println!("{}", group.question);
    println!("options: {}", render_options(group.options.iter()));

    if group.multi_select {
        let answer = prompt_line("select (comma-separated, blank for none): ").unwrap_or_default();
        for option_id in answer.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if is_child {
                service.toggle_child_condition(option_id.to_string())?;
            } else {
                service.toggle_condition(option_id.to_string())?;
            }
        }
        if is_child {
            service.confirm_child_selections()
        } else {
            service.confirm_selections()
        }
    } else {
        let answer = prompt_line("select one: ").unwrap_or_default();
        if is_child {
            service.select_child_condition(answer)
        } else {
            service.select_condition(answer)
        }
    }
}

/// Walks `service` to completion (`onboard:completed`/`onboard:cancelled`),
/// reading each answer from `stdin`. Returns once `launch()` has run.
pub async fn run_interactive(
    service: &mut OnboardingService,
    template: &WorkflowTemplate,
) -> Result<(), OnboardError> {
    service.start();
    let mut launched = false;

    loop {
        match service.current_step() {
            OnboardingStep::ProjectName => {
                let name = prompt_line("project name: ").unwrap_or_default();
                service.submit_project_name(name)?;
            }
            OnboardingStep::Tracks => {
                let Some(tracks) = template.tracks.as_ref() else {
                    continue;
                };
                println!("{}", tracks.question);
                println!("options: {}", render_options(tracks.options.iter()));
                let track_id = prompt_line("select one: ").unwrap_or_default();
                service.submit_track(track_id)?;
            }
            OnboardingStep::ConditionGroup => {
                let Some(group) = template.condition_groups.get(service.state().current_group_index) else {
                    continue;
                };
                let group = group.clone();
                run_group(service, &group, false)?;
            }
            OnboardingStep::ConditionChild => {
                let Some(ctx) = service.state().current_child_context.clone() else {
                    continue;
                };
                let Some(group) = child_group(template, &ctx) else {
                    continue;
                };
                let group = group.clone();
                run_group(service, &group, true)?;
            }
            OnboardingStep::ControllerConversation | OnboardingStep::Launching => {
                if !launched {
                    println!("bringing the workflow online...");
                    service.launch().await?;
                    launched = true;
                }
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
#[path = "onboarding_io_tests.rs"]
mod tests;
