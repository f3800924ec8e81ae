// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Input Providers: the two interchangeable sources of post-step input.
//!
//! A user provider blocks on the control bus's input stream; a controller
//! provider runs a dedicated agent to produce the next prompt automatically.
//! The runner picks between them per call based on pause state and the
//! active mode.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use cm_bus::{ControlBus, InputSignal};
use cm_core::MonitoringId;
use cm_template::ModuleStep;

use crate::error::EngineError;
use crate::step_executor::{StepExecutionRequest, StepExecutor};

const SWITCH_TO_MANUAL: &str = "__SWITCH_TO_MANUAL__";
const SWITCH_TO_AUTO: &str = "__SWITCH_TO_AUTO__";

/// Shared flag toggled by the user provider's sentinel values and consulted
/// by the runner to pick a provider for the next call.
#[derive(Debug, Default)]
pub struct AutoMode(AtomicBool);

impl AutoMode {
    pub fn new(auto: bool) -> Self {
        Self(AtomicBool::new(auto))
    }

    pub fn get(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn set(&self, auto: bool) {
        self.0.store(auto, Ordering::SeqCst);
    }
}

/// What a provider call was asked to react to.
pub struct InputContext<'a> {
    pub step_output: &'a str,
    pub step_index: usize,
    pub total_steps: usize,
    pub prompt_queue: &'a [String],
    pub prompt_queue_index: usize,
    pub cwd: &'a Path,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    User,
    Controller,
}

#[derive(Debug, Clone)]
pub struct ProviderInput {
    pub value: String,
    pub resume_monitoring_id: Option<MonitoringId>,
    pub source: InputSource,
}

#[derive(Debug, Clone)]
pub enum InputOutcome {
    Input(ProviderInput),
    Skip,
    Stop,
}

#[async_trait]
pub trait InputProvider: Send + Sync {
    async fn get_input(&self, context: &InputContext<'_>) -> Result<InputOutcome, EngineError>;
}

/// Blocks on the control bus's input/skip/stop channels. Sentinel values in
/// the input text toggle `auto_mode` in place rather than being surfaced as
/// an actual prompt — the caller keeps waiting for the next real signal.
pub struct UserInputProvider {
    control_bus: Arc<ControlBus>,
    auto_mode: Arc<AutoMode>,
}

impl UserInputProvider {
    pub fn new(control_bus: Arc<ControlBus>, auto_mode: Arc<AutoMode>) -> Self {
        Self {
            control_bus,
            auto_mode,
        }
    }
}

#[async_trait]
impl InputProvider for UserInputProvider {
    async fn get_input(&self, _context: &InputContext<'_>) -> Result<InputOutcome, EngineError> {
        let mut input_rx = self.control_bus.subscribe_input();
        let mut skip_rx = self.control_bus.subscribe_skip();
        let mut stop_rx = self.control_bus.subscribe_stop();

        loop {
            tokio::select! {
                biased;
                _ = stop_rx.recv() => return Ok(InputOutcome::Stop),
                _ = skip_rx.recv() => return Ok(InputOutcome::Skip),
                signal = input_rx.recv() => {
                    let signal: InputSignal = match signal {
                        Ok(signal) => signal,
                        Err(_) => return Ok(InputOutcome::Stop),
                    };
                    if signal.skip {
                        return Ok(InputOutcome::Skip);
                    }
                    match signal.prompt.as_deref() {
                        Some(SWITCH_TO_MANUAL) => {
                            self.auto_mode.set(false);
                            continue;
                        }
                        Some(SWITCH_TO_AUTO) => {
                            self.auto_mode.set(true);
                            continue;
                        }
                        _ => {}
                    }
                    return Ok(InputOutcome::Input(ProviderInput {
                        value: signal.prompt.unwrap_or_default(),
                        resume_monitoring_id: None,
                        source: InputSource::User,
                    }));
                }
            }
        }
    }
}

/// Runs the template's controller step to produce the next prompt, streaming
/// its output into the same monitoring log as a normal step.
pub struct ControllerInputProvider {
    executor: Arc<StepExecutor>,
    controller_step: ModuleStep,
    working_dir: PathBuf,
}

impl ControllerInputProvider {
    pub fn new(executor: Arc<StepExecutor>, controller_step: ModuleStep, working_dir: PathBuf) -> Self {
        Self {
            executor,
            controller_step,
            working_dir,
        }
    }
}

#[async_trait]
impl InputProvider for ControllerInputProvider {
    async fn get_input(&self, context: &InputContext<'_>) -> Result<InputOutcome, EngineError> {
        let mut vars = std::collections::HashMap::new();
        vars.insert("step_output".to_string(), context.step_output.to_string());
        let conditions = std::collections::HashSet::new();

        let request = StepExecutionRequest {
            step: &self.controller_step,
            working_dir: self.working_dir.clone(),
            cancellation: tokio_util::sync::CancellationToken::new(),
            resume_monitoring_id: None,
            resume_session_id: None,
            resume_prompt: None,
            selected_conditions: &conditions,
            vars: &vars,
        };

        let outcome = self.executor.execute(request).await?;
        Ok(InputOutcome::Input(ProviderInput {
            value: outcome.output,
            resume_monitoring_id: Some(outcome.monitoring_id),
            source: InputSource::Controller,
        }))
    }
}

#[cfg(test)]
#[path = "input_providers_tests.rs"]
mod tests;
