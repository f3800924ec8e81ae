// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow Runner: the top-level loop that walks a template's steps,
//! drives each through the Step Executor, and applies the Behavior Engine's
//! decisions to the next index.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use cm_adapters::EngineRegistry;
use cm_bus::{CheckpointSignal, ControlBus, EventBus};
use cm_core::{
    ActiveLoop, AgentId, AgentUiStatus, Clock, Event, RunIndex, StateEvent, StepIndex, StepState,
};
use cm_storage::{BehaviorFileWriter, RunIndexStore, StepIndexStore};
use cm_template::{AgentsConfig, ModuleBehavior, ModuleStep, Step, WorkflowTemplate};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::behavior;
use crate::error::EngineError;
use crate::input_providers::{
    AutoMode, ControllerInputProvider, InputContext, InputOutcome, InputProvider, UserInputProvider,
};
use crate::loop_counter::LoopCounter;
use crate::step_executor::{StepExecutionRequest, StepExecutor};

/// Everything the runner needs, gathered up front so [`WorkflowRunner::new`]
/// doesn't take a dozen positional arguments.
pub struct RunnerDeps<C: Clock> {
    pub template: Arc<WorkflowTemplate>,
    pub step_store: Arc<StepIndexStore>,
    pub run_index_store: Arc<RunIndexStore>,
    pub behavior_file: BehaviorFileWriter,
    pub bus: EventBus,
    pub control_bus: Arc<ControlBus>,
    pub registry: Arc<EngineRegistry>,
    pub monitoring: Arc<crate::monitoring::Monitoring>,
    pub agents_config: Arc<AgentsConfig>,
    pub clock: C,
    pub working_dir: PathBuf,
    pub selected_track: Option<String>,
    pub selected_conditions: HashSet<String>,
    pub project_name: Option<String>,
    pub auto_mode: bool,
}

/// Drives one workflow run to completion or to an explicit stop.
pub struct WorkflowRunner<C: Clock> {
    template: Arc<WorkflowTemplate>,
    step_store: Arc<StepIndexStore>,
    run_index_store: Arc<RunIndexStore>,
    behavior_file: BehaviorFileWriter,
    bus: EventBus,
    control_bus: Arc<ControlBus>,
    executor: StepExecutor,
    agents_config: Arc<AgentsConfig>,
    clock: C,
    working_dir: PathBuf,
    selected_track: Option<String>,
    selected_conditions: HashSet<String>,
    project_name: Option<String>,
    auto_mode: Arc<AutoMode>,
    user_provider: UserInputProvider,
    loop_counter: LoopCounter,
    active_loop: Option<ActiveLoop>,
    engine_overrides: HashMap<usize, cm_core::EngineId>,
    step_state: StepState,
    run_index: RunIndex,
    stop_rx: broadcast::Receiver<()>,
    pause_rx: broadcast::Receiver<()>,
}

impl<C: Clock> WorkflowRunner<C> {
    pub fn new(deps: RunnerDeps<C>) -> Self {
        let auto_mode = Arc::new(AutoMode::new(deps.auto_mode));
        let user_provider = UserInputProvider::new(deps.control_bus.clone(), auto_mode.clone());
        let executor = StepExecutor::new(deps.registry, deps.monitoring, deps.agents_config.clone());
        let stop_rx = deps.control_bus.subscribe_stop();
        let pause_rx = deps.control_bus.subscribe_pause();

        Self {
            template: deps.template,
            step_store: deps.step_store,
            run_index_store: deps.run_index_store,
            behavior_file: deps.behavior_file,
            bus: deps.bus,
            control_bus: deps.control_bus,
            executor,
            agents_config: deps.agents_config,
            clock: deps.clock,
            working_dir: deps.working_dir,
            selected_track: deps.selected_track,
            selected_conditions: deps.selected_conditions,
            project_name: deps.project_name,
            auto_mode,
            user_provider,
            loop_counter: LoopCounter::new(),
            active_loop: None,
            engine_overrides: HashMap::new(),
            step_state: StepState::Idle,
            run_index: RunIndex::default(),
            stop_rx,
            pause_rx,
        }
    }

    fn vars(&self) -> HashMap<String, String> {
        let mut vars = HashMap::new();
        if let Some(name) = &self.project_name {
            vars.insert("project_name".to_string(), name.clone());
        }
        if let Some(track) = &self.selected_track {
            vars.insert("track".to_string(), track.clone());
        }
        vars
    }

    fn controller_provider(&self) -> Option<ControllerInputProvider> {
        self.template.controller.as_ref().map(|step| {
            ControllerInputProvider::new(
                Arc::new(StepExecutor::new(
                    self.executor.registry(),
                    self.executor.monitoring(),
                    self.agents_config.clone(),
                )),
                step.clone(),
                self.working_dir.clone(),
            )
        })
    }

    /// Resolve the target index of a `trigger{agentId}` behavior.
    fn find_step_index_for_agent(&self, agent_id: &AgentId) -> Option<usize> {
        self.template.steps.iter().position(|step| match step {
            Step::Module(module) => &module.agent_id == agent_id,
            Step::Separator { .. } => false,
        })
    }

    /// Runs the workflow to completion, to an explicit `workflow:stop`, or
    /// until a `CheckpointQuit` is requested. Does not block waiting for a
    /// second interrupt after the last step — callers that need the
    /// "stay alive until told twice" behavior own that wait themselves (see
    /// `cm-cli`), since it has no bearing on this loop's own termination
    /// logic and would make it untestable.
    pub async fn run(&mut self) -> Result<(), EngineError> {
        let total_steps = self.template.total_steps();
        let matching: Vec<usize> = self
            .template
            .matching_steps(self.selected_track.as_deref(), &self.selected_conditions)
            .map(|(idx, _)| idx)
            .collect();

        self.bus.emit(Event::WorkflowStarted {
            module_count: matching.len(),
        });

        for (order_index, step) in self.template.steps.iter().enumerate() {
            match step {
                Step::Module(module) if matching.contains(&order_index) => {
                    self.bus.emit(Event::AgentAdded {
                        agent_id: module.agent_id.clone(),
                        name: module.agent_name.clone(),
                        order_index,
                        step_index: StepIndex::new(order_index),
                        total_steps,
                    });
                }
                Step::Separator { label } => {
                    self.bus.emit(Event::SeparatorAdd {
                        label: label.clone(),
                        order_index,
                    });
                }
                Step::Module(_) => {}
            }
        }

        self.run_index = self
            .run_index_store
            .rebuild_from_step_records(&self.step_store, total_steps)?;

        let mut index = self.step_store.get_resume_start_index(total_steps)?;

        while index < total_steps {
            if self.stop_rx.try_recv().is_ok() {
                self.bus.emit(Event::WorkflowStopped);
                return Ok(());
            }

            let Some(module) = self.template.steps[index].as_module().cloned() else {
                index += 1;
                continue;
            };

            match self.run_step(index, &module).await? {
                StepOutcome::Advance => index += 1,
                StepOutcome::JumpTo(next) => index = next,
                StepOutcome::Skip => index += 1,
                StepOutcome::Stop => {
                    self.bus.emit(Event::WorkflowStopped);
                    return Ok(());
                }
            }
        }

        self.bus.emit(Event::WorkflowCompleted);
        Ok(())
    }

    async fn run_step(&mut self, index: usize, module: &ModuleStep) -> Result<StepOutcome, EngineError> {
        self.step_state = StepState::Idle;
        let existing_record = self.step_store.get_step_data(StepIndex::new(index))?;
        let already_complete = existing_record
            .as_ref()
            .is_some_and(|r| r.completed_at.is_some());

        let decision = behavior::should_skip_step(
            module,
            already_complete,
            self.active_loop.as_ref(),
            index,
            self.selected_track.as_deref(),
            &self.selected_conditions,
        );
        if decision.skip {
            tracing::info!(agent_id = %module.agent_id, reason = ?decision.reason, "skipping step");
            self.bus.emit(Event::AgentStatus {
                agent_id: module.agent_id.clone(),
                status: AgentUiStatus::Skipped,
            });
            return Ok(StepOutcome::Skip);
        }

        self.step_state = self.step_state.apply(&StateEvent::Start);
        self.bus.emit(Event::AgentStatus {
            agent_id: module.agent_id.clone(),
            status: AgentUiStatus::Running,
        });
        tracing::info!(agent_id = %module.agent_id, step_index = index, "running step");
        self.step_store
            .mark_step_started(StepIndex::new(index), self.clock.epoch_ms())?;
        self.behavior_file.reset()?;

        let pinned = self
            .engine_overrides
            .get(&index)
            .cloned()
            .or_else(|| module.engine.clone());
        let engine = self.executor.registry().resolve(pinned.as_ref()).await?;
        self.bus.emit(Event::AgentEngine {
            agent_id: module.agent_id.clone(),
            engine: engine.id().clone(),
        });
        if let Some(model) = module.model.clone().or_else(|| engine.metadata().default_model.clone()) {
            self.bus.emit(Event::AgentModel {
                agent_id: module.agent_id.clone(),
                model,
            });
        }

        let mut steering_prompt = None;
        if self.pause_rx.try_recv().is_ok() {
            self.step_state = self.step_state.apply(&StateEvent::Pause);
            match self.await_user_decision(index, module).await? {
                PauseOutcome::Stop => return Ok(StepOutcome::Stop),
                PauseOutcome::Skip => {
                    self.bus.emit(Event::AgentStatus {
                        agent_id: module.agent_id.clone(),
                        status: AgentUiStatus::Skipped,
                    });
                    return Ok(StepOutcome::Skip);
                }
                PauseOutcome::Continue(prompt) => steering_prompt = prompt,
            }
        }

        let vars = self.vars();
        let (last_output, monitoring_id, session_id) = self
            .execute_or_resume(index, module, existing_record.as_ref(), &vars, steering_prompt)
            .await?;
        self.step_state = self.step_state.apply(&StateEvent::StepComplete);

        if let Some(sid) = session_id.clone() {
            if existing_record.as_ref().and_then(|r| r.session_id.clone()).is_some() {
                self.step_store
                    .update_step_session(StepIndex::new(index), sid.clone(), monitoring_id)?;
            } else {
                self.step_store
                    .init_step_session(StepIndex::new(index), sid.clone(), monitoring_id)?;
            }
            self.bus.emit(Event::SessionBound {
                step_index: StepIndex::new(index),
                session_id: sid,
            });
        }

        let mut last_output = last_output;
        let chained_prompts = self
            .agents_config
            .chained_prompts_for(&module.agent_id, &self.selected_conditions);
        let already_done_chains = existing_record
            .as_ref()
            .map(|r| r.completed_chains.clone())
            .unwrap_or_default();

        for (chain_index, prompt) in chained_prompts.iter().enumerate() {
            if already_done_chains.contains(&chain_index) {
                continue;
            }
            self.bus.emit(Event::ChainedState {
                agent_id: module.agent_id.clone(),
                prompt_queue_index: chain_index,
                prompt_queue_len: chained_prompts.len(),
            });
            let request = StepExecutionRequest {
                step: module,
                working_dir: self.working_dir.clone(),
                cancellation: CancellationToken::new(),
                resume_monitoring_id: Some(monitoring_id),
                resume_session_id: session_id.clone(),
                resume_prompt: Some(prompt.content.clone()),
                selected_conditions: &self.selected_conditions,
                vars: &vars,
            };
            let outcome = self.executor.execute(request).await?;
            last_output = outcome.output;
            self.step_store
                .mark_chain_completed(StepIndex::new(index), chain_index)?;
        }

        if self.auto_mode.get() {
            if let Some(controller) = self.controller_provider() {
                let queue = Vec::new();
                let ctx = InputContext {
                    step_output: &last_output,
                    step_index: index,
                    total_steps: self.template.total_steps(),
                    prompt_queue: &queue,
                    prompt_queue_index: 0,
                    cwd: &self.working_dir,
                };
                if let InputOutcome::Input(input) = controller.get_input(&ctx).await? {
                    let request = StepExecutionRequest {
                        step: module,
                        working_dir: self.working_dir.clone(),
                        cancellation: CancellationToken::new(),
                        resume_monitoring_id: Some(monitoring_id),
                        resume_session_id: session_id,
                        resume_prompt: Some(input.value),
                        selected_conditions: &self.selected_conditions,
                        vars: &vars,
                    };
                    let outcome = self.executor.execute(request).await?;
                    last_output = outcome.output;
                }
            }
        }

        if let Some(ModuleBehavior::Trigger { agent_id }) = &module.behavior {
            if behavior::evaluate_trigger(&last_output) {
                match self.find_step_index_for_agent(agent_id) {
                    Some(target_index) => {
                        self.engine_overrides.insert(target_index, engine.id().clone());
                        if let Some(mut target) = self.template.steps[target_index].as_module().cloned() {
                            if target.engine.is_none() {
                                target.engine = Some(engine.id().clone());
                            }
                            self.run_triggered_agent(module, &target, &vars).await;
                        }
                    }
                    None => {
                        tracing::warn!(agent_id = %agent_id, "trigger target not present in template, skipping");
                    }
                }
            }
        }

        self.run_index.remove_from_not_completed(StepIndex::new(index));
        if module.execute_once {
            self.step_store
                .mark_step_completed(StepIndex::new(index), self.clock.epoch_ms())?;
            self.run_index.mark_completed(StepIndex::new(index));
            self.step_state = StepState::Completed;
            self.bus.emit(Event::AgentStatus {
                agent_id: module.agent_id.clone(),
                status: AgentUiStatus::Completed,
            });
            tracing::info!(agent_id = %module.agent_id, "has completed their work");
        }
        self.run_index_store.save(&self.run_index)?;

        if matches!(module.behavior, Some(ModuleBehavior::Checkpoint)) {
            match self.resolve_checkpoint(module, &last_output).await? {
                CheckpointOutcome::Quit => return Err(EngineError::CheckpointQuit),
                CheckpointOutcome::Continue => {}
            }
        }

        if let Some(ModuleBehavior::Loop { max_iterations }) = module.behavior {
            let key = LoopCounter::key(module.agent_id.as_str(), index);
            let iteration = self.loop_counter.increment(&key);
            let decision = behavior::evaluate_loop(&last_output, iteration, max_iterations);
            if decision.should_repeat {
                let active_loop = behavior::new_active_loop(
                    module.agent_id.clone(),
                    &decision,
                    iteration,
                    max_iterations,
                );
                self.bus.emit(Event::LoopState {
                    source_agent: module.agent_id.clone(),
                    iteration,
                    max_iterations,
                    reason: decision.reason.clone(),
                });
                let rewind_to = index.saturating_sub(decision.steps_back);
                self.active_loop = Some(active_loop);
                return Ok(StepOutcome::JumpTo(rewind_to));
            }
            self.active_loop = None;
        }

        Ok(StepOutcome::Advance)
    }

    async fn execute_or_resume(
        &self,
        index: usize,
        module: &ModuleStep,
        existing_record: Option<&cm_core::StepIndexRecord>,
        vars: &HashMap<String, String>,
        steering_prompt: Option<String>,
    ) -> Result<(String, cm_core::MonitoringId, Option<cm_core::SessionId>), EngineError> {
        if let Some(prompt) = steering_prompt {
            let request = StepExecutionRequest {
                step: module,
                working_dir: self.working_dir.clone(),
                cancellation: CancellationToken::new(),
                resume_monitoring_id: existing_record.and_then(|r| r.monitoring_id),
                resume_session_id: existing_record.and_then(|r| r.session_id.clone()),
                resume_prompt: Some(prompt),
                selected_conditions: &self.selected_conditions,
                vars,
            };
            let outcome = self.executor.execute(request).await?;
            return Ok((outcome.output, outcome.monitoring_id, outcome.session_id));
        }

        if let Some(record) = existing_record.filter(|r| r.is_resumable()) {
            let monitoring_id = record
                .monitoring_id
                .ok_or_else(|| EngineError::InvalidStepRecord(module.agent_id.as_str().to_string()))?;
            self.executor.monitoring().observe_existing_id(monitoring_id);
            self.bus.emit(Event::MonitoringRegister {
                agent_id: module.agent_id.clone(),
                monitoring_id,
            });

            let request = StepExecutionRequest {
                step: module,
                working_dir: self.working_dir.clone(),
                cancellation: CancellationToken::new(),
                resume_monitoring_id: Some(monitoring_id),
                resume_session_id: record.session_id.clone(),
                resume_prompt: Some("Continue.".to_string()),
                selected_conditions: &self.selected_conditions,
                vars,
            };
            let outcome = self.executor.execute(request).await?;
            Ok((outcome.output, outcome.monitoring_id, outcome.session_id))
        } else {
            let request = StepExecutionRequest {
                step: module,
                working_dir: self.working_dir.clone(),
                cancellation: CancellationToken::new(),
                resume_monitoring_id: None,
                resume_session_id: None,
                resume_prompt: None,
                selected_conditions: &self.selected_conditions,
                vars,
            };
            let outcome = self.executor.execute(request).await?;
            Ok((outcome.output, outcome.monitoring_id, outcome.session_id))
        }
    }

    /// Runs a `trigger{agentId}` target inline, against the same working
    /// directory, and emits it as a UI child of `source`. Failure is logged
    /// and swallowed — a triggered agent never fails the workflow.
    async fn run_triggered_agent(&self, source: &ModuleStep, target: &ModuleStep, vars: &HashMap<String, String>) {
        self.bus.emit(Event::SubAgentAdded {
            parent_agent_id: source.agent_id.clone(),
            agent_id: target.agent_id.clone(),
            name: target.agent_name.clone(),
        });
        self.bus.emit(Event::TriggeredAgentStatus {
            source_agent: source.agent_id.clone(),
            agent_id: target.agent_id.clone(),
            status: AgentUiStatus::Running,
        });

        let request = StepExecutionRequest {
            step: target,
            working_dir: self.working_dir.clone(),
            cancellation: CancellationToken::new(),
            resume_monitoring_id: None,
            resume_session_id: None,
            resume_prompt: None,
            selected_conditions: &self.selected_conditions,
            vars,
        };
        let status = match self.executor.execute(request).await {
            Ok(_) => AgentUiStatus::Completed,
            Err(err) => {
                tracing::warn!(agent_id = %target.agent_id, error = %err, "triggered agent failed, workflow continuing");
                AgentUiStatus::Skipped
            }
        };
        self.bus.emit(Event::TriggeredAgentStatus {
            source_agent: source.agent_id.clone(),
            agent_id: target.agent_id.clone(),
            status,
        });
    }

    async fn resolve_checkpoint(
        &self,
        module: &ModuleStep,
        output: &str,
    ) -> Result<CheckpointOutcome, EngineError> {
        if let Some(marker) = behavior::parse_checkpoint_marker(output) {
            return Ok(match marker {
                behavior::CheckpointOutcome::Continue => CheckpointOutcome::Continue,
                behavior::CheckpointOutcome::Quit => CheckpointOutcome::Quit,
            });
        }

        self.bus.emit(Event::CheckpointState {
            agent_id: module.agent_id.clone(),
            active: true,
        });
        let mut checkpoint_rx = self.control_bus.subscribe_checkpoint();
        let mut stop_rx = self.control_bus.subscribe_stop();
        let signal = tokio::select! {
            biased;
            _ = stop_rx.recv() => CheckpointSignal::Quit,
            signal = checkpoint_rx.recv() => signal.unwrap_or(CheckpointSignal::Quit),
        };
        self.bus.emit(Event::CheckpointState {
            agent_id: module.agent_id.clone(),
            active: false,
        });
        Ok(match signal {
            CheckpointSignal::Continue => CheckpointOutcome::Continue,
            CheckpointSignal::Quit => CheckpointOutcome::Quit,
        })
    }

    async fn await_user_decision(&mut self, index: usize, module: &ModuleStep) -> Result<PauseOutcome, EngineError> {
        self.step_state = self.step_state.apply(&StateEvent::StepComplete);
        self.bus.emit(Event::AgentStatus {
            agent_id: module.agent_id.clone(),
            status: AgentUiStatus::Awaiting,
        });
        self.bus.emit(Event::InputState { active: true });
        let queue = Vec::new();
        let ctx = InputContext {
            step_output: "",
            step_index: index,
            total_steps: self.template.total_steps(),
            prompt_queue: &queue,
            prompt_queue_index: 0,
            cwd: &self.working_dir,
        };
        let outcome = self.user_provider.get_input(&ctx).await?;
        self.bus.emit(Event::InputState { active: false });
        Ok(match outcome {
            InputOutcome::Stop => {
                self.step_state = self.step_state.apply(&StateEvent::Stop);
                PauseOutcome::Stop
            }
            InputOutcome::Skip => {
                self.step_state = self.step_state.apply(&StateEvent::Skip);
                PauseOutcome::Skip
            }
            InputOutcome::Input(input) => {
                let prompt = if input.value.is_empty() { None } else { Some(input.value) };
                self.step_state = self.step_state.apply(&StateEvent::InputReceived { prompt: prompt.clone() });
                PauseOutcome::Continue(prompt)
            }
        })
    }
}

enum StepOutcome {
    Advance,
    JumpTo(usize),
    Skip,
    Stop,
}

enum PauseOutcome {
    /// Resume normally, or — when carrying a value — feed it straight to the
    /// step executor as a steering `resume_prompt`, bypassing the chained
    /// prompt queue.
    Continue(Option<String>),
    Skip,
    Stop,
}

enum CheckpointOutcome {
    Continue,
    Quit,
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
