// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cm_adapters::{Engine, FakeEngine};
use cm_bus::EventBus;
use cm_core::EngineId;
use std::collections::HashSet;
use tempfile::tempdir;

fn module(agent_id: &str, prompt_path: Vec<String>) -> ModuleStep {
    ModuleStep {
        agent_id: cm_core::AgentId::new(agent_id),
        agent_name: agent_id.to_string(),
        prompt_path,
        engine: None,
        model: None,
        model_reasoning_effort: None,
        execute_once: false,
        tracks: HashSet::new(),
        conditions: HashSet::new(),
        behavior: None,
        fallback_agent_id: None,
    }
}

fn executor(engine: FakeEngine) -> (StepExecutor, tempfile::TempDir) {
    let dir = tempdir().unwrap();
    let registry = Arc::new(EngineRegistry::new(
        vec![Arc::new(engine) as Arc<dyn Engine>],
        EngineId::new("fake"),
    ));
    let monitoring = Arc::new(Monitoring::new(dir.path().join("logs"), EventBus::new()));
    let agents_config = Arc::new(AgentsConfig::default());
    (StepExecutor::new(registry, monitoring, agents_config), dir)
}

#[tokio::test]
async fn execute_renders_prompt_file_and_runs_engine() {
    let engine = FakeEngine::new("fake");
    engine.set_next_stdout("done");
    let (executor, dir) = executor(engine.clone());

    std::fs::write(dir.path().join("prompt.md"), "Hello ${name}").unwrap();
    let mut vars = HashMap::new();
    vars.insert("name".to_string(), "world".to_string());
    let conditions = HashSet::new();

    let step = module("agent-a", vec!["prompt.md".into()]);
    let request = StepExecutionRequest {
        step: &step,
        working_dir: dir.path().to_path_buf(),
        cancellation: CancellationToken::new(),
        resume_monitoring_id: None,
        resume_session_id: None,
        resume_prompt: None,
        selected_conditions: &conditions,
        vars: &vars,
    };

    let outcome = executor.execute(request).await.unwrap();
    assert_eq!(outcome.output, "done");

    let calls = engine.calls();
    assert!(matches!(
        &calls[0],
        cm_adapters::EngineCall::Run { prompt } if prompt == "Hello world\n"
    ));
}

#[tokio::test]
async fn execute_uses_resume_prompt_instead_of_prompt_files() {
    let engine = FakeEngine::new("fake");
    engine.set_next_stdout("resumed");
    let (executor, dir) = executor(engine.clone());

    let conditions = HashSet::new();
    let vars = HashMap::new();
    let step = module("agent-a", vec!["missing.md".into()]);
    let request = StepExecutionRequest {
        step: &step,
        working_dir: dir.path().to_path_buf(),
        cancellation: CancellationToken::new(),
        resume_monitoring_id: Some(MonitoringId::new(7)),
        resume_session_id: None,
        resume_prompt: Some("continue please".into()),
        selected_conditions: &conditions,
        vars: &vars,
    };

    let outcome = executor.execute(request).await.unwrap();
    assert_eq!(outcome.monitoring_id, MonitoringId::new(7));

    let calls = engine.calls();
    assert!(matches!(
        &calls[0],
        cm_adapters::EngineCall::Run { prompt } if prompt == "continue please"
    ));
}

#[tokio::test]
async fn execute_propagates_engine_errors() {
    let engine = FakeEngine::new("fake");
    engine.set_run_error("boom");
    let (executor, dir) = executor(engine);

    std::fs::write(dir.path().join("prompt.md"), "hi").unwrap();
    let conditions = HashSet::new();
    let vars = HashMap::new();
    let step = module("agent-a", vec!["prompt.md".into()]);
    let request = StepExecutionRequest {
        step: &step,
        working_dir: dir.path().to_path_buf(),
        cancellation: CancellationToken::new(),
        resume_monitoring_id: None,
        resume_session_id: None,
        resume_prompt: None,
        selected_conditions: &conditions,
        vars: &vars,
    };

    let result = executor.execute(request).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn execute_creates_builder_scaffold_for_builder_agents() {
    let engine = FakeEngine::new("fake");
    engine.set_next_stdout("ok");
    let (executor, dir) = executor(engine);

    std::fs::write(dir.path().join("prompt.md"), "hi").unwrap();
    let conditions = HashSet::new();
    let vars = HashMap::new();
    let step = module("agents-builder", vec!["prompt.md".into()]);
    let request = StepExecutionRequest {
        step: &step,
        working_dir: dir.path().to_path_buf(),
        cancellation: CancellationToken::new(),
        resume_monitoring_id: None,
        resume_session_id: None,
        resume_prompt: None,
        selected_conditions: &conditions,
        vars: &vars,
    };

    executor.execute(request).await.unwrap();
    assert!(dir.path().join(".codemachine/agents").is_dir());
    assert!(dir.path().join(".codemachine/plan").is_dir());
}
