// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Step Executor: resolves an engine, renders a step's prompt files, spawns
//! the engine, and streams its output to the monitoring log writer.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use cm_adapters::{EngineRegistry, RunRequest};
use cm_core::{AgentTelemetry, MonitoringId, SessionId};
use cm_template::{interpolate, AgentsConfig, ChainedPrompt, ModuleStep};
use tokio_util::sync::CancellationToken;

use crate::error::EngineError;
use crate::monitoring::Monitoring;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// A single step invocation, covering both the initial run and a
/// pause/crash resume of an in-flight one.
pub struct StepExecutionRequest<'a> {
    pub step: &'a ModuleStep,
    pub working_dir: PathBuf,
    pub cancellation: CancellationToken,
    pub resume_monitoring_id: Option<MonitoringId>,
    pub resume_session_id: Option<SessionId>,
    pub resume_prompt: Option<String>,
    pub selected_conditions: &'a std::collections::HashSet<String>,
    pub vars: &'a HashMap<String, String>,
}

pub struct StepExecutionOutcome {
    pub output: String,
    pub monitoring_id: MonitoringId,
    pub session_id: Option<SessionId>,
    pub chained_prompts: Vec<ChainedPrompt>,
}

pub struct StepExecutor {
    registry: Arc<EngineRegistry>,
    monitoring: Arc<Monitoring>,
    agents_config: Arc<AgentsConfig>,
    timeout: Duration,
}

impl StepExecutor {
    pub fn new(
        registry: Arc<EngineRegistry>,
        monitoring: Arc<Monitoring>,
        agents_config: Arc<AgentsConfig>,
    ) -> Self {
        Self {
            registry,
            monitoring,
            agents_config,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn registry(&self) -> Arc<EngineRegistry> {
        self.registry.clone()
    }

    pub fn monitoring(&self) -> Arc<Monitoring> {
        self.monitoring.clone()
    }

    pub async fn execute(
        &self,
        request: StepExecutionRequest<'_>,
    ) -> Result<StepExecutionOutcome, EngineError> {
        let engine = self.registry.resolve(request.step.engine.as_ref()).await?;

        let prompt = match request.resume_prompt {
            Some(prompt) => prompt,
            None => render_prompt(&request.working_dir, &request.step.prompt_path, request.vars)?,
        };

        let monitoring_id = match request.resume_monitoring_id {
            Some(id) => id,
            None => self.monitoring.allocate_id(),
        };

        let agent_id = request.step.agent_id.clone();
        let monitoring = self.monitoring.clone();
        let log_agent_id = agent_id.clone();
        let on_data_monitoring = monitoring.clone();
        let on_data_agent_id = log_agent_id.clone();

        let mut run_request = RunRequest::new(prompt, request.working_dir.clone());
        run_request.model = request.step.model.clone();
        run_request.model_reasoning_effort = request.step.model_reasoning_effort.clone();
        run_request.session_id = request.resume_session_id;
        run_request.abort_signal = request.cancellation.clone();
        run_request.on_data = Some(Arc::new(move |chunk: &str| {
            if let Err(err) = on_data_monitoring.append_log(Some(&on_data_agent_id), monitoring_id, chunk) {
                tracing::warn!(error = %err, "failed to append monitoring log line");
            }
        }));
        let on_telemetry_monitoring = monitoring.clone();
        let on_telemetry_agent_id = agent_id.clone();
        run_request.on_telemetry = Some(Arc::new(move |telemetry: AgentTelemetry| {
            on_telemetry_monitoring.report_telemetry(on_telemetry_agent_id.clone(), telemetry);
        }));

        let run_result = tokio::time::timeout(self.timeout, engine.run(run_request)).await;
        let response = match run_result {
            Err(_) => {
                request.cancellation.cancel();
                return Err(EngineError::Timeout(self.timeout));
            }
            Ok(result) => result?,
        };

        ensure_builder_scaffold(&request.working_dir, request.step)?;

        let chained_prompts = self
            .agents_config
            .chained_prompts_for(&agent_id, request.selected_conditions);

        Ok(StepExecutionOutcome {
            output: response.stdout,
            monitoring_id,
            session_id: response.session_id,
            chained_prompts,
        })
    }
}

fn render_prompt(
    working_dir: &Path,
    prompt_path: &[String],
    vars: &HashMap<String, String>,
) -> Result<String, EngineError> {
    let mut rendered = String::new();
    for part in prompt_path {
        let contents = std::fs::read_to_string(working_dir.join(part))?;
        rendered.push_str(&interpolate(&contents, vars));
        rendered.push('\n');
    }
    Ok(rendered)
}

/// When a step is the agents builder (by id or by name containing
/// "builder"), ensure `.codemachine/agents` and `.codemachine/plan` exist so
/// its output has somewhere to land.
fn ensure_builder_scaffold(working_dir: &Path, step: &ModuleStep) -> Result<(), EngineError> {
    let is_builder = step.agent_id.as_str() == "agents-builder" || step.agent_name.to_lowercase().contains("builder");
    if !is_builder {
        return Ok(());
    }
    let control_dir = working_dir.join(".codemachine");
    std::fs::create_dir_all(control_dir.join("agents"))?;
    std::fs::create_dir_all(control_dir.join("plan"))?;
    Ok(())
}

#[cfg(test)]
#[path = "step_executor_tests.rs"]
mod tests;
