// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cm_adapters::{Engine, FakeEngine};
use cm_core::{FakeClock, MonitoringId, SessionId, StepIndex};
use cm_template::ModuleStep;
use tempfile::tempdir;

fn module_step(agent_id: &str, behavior: Option<ModuleBehavior>) -> ModuleStep {
    module_step_with(agent_id, behavior, true)
}

fn module_step_with(agent_id: &str, behavior: Option<ModuleBehavior>, execute_once: bool) -> ModuleStep {
    ModuleStep {
        agent_id: AgentId::new(agent_id),
        agent_name: agent_id.to_string(),
        prompt_path: vec!["prompt.md".into()],
        engine: None,
        model: None,
        model_reasoning_effort: None,
        execute_once,
        tracks: HashSet::new(),
        conditions: HashSet::new(),
        behavior,
        fallback_agent_id: None,
    }
}

fn template_with(steps: Vec<Step>) -> WorkflowTemplate {
    WorkflowTemplate {
        steps,
        tracks: None,
        condition_groups: Vec::new(),
        controller: None,
        specification: false,
    }
}

struct Harness {
    deps: Option<RunnerDeps<FakeClock>>,
    step_store: Arc<StepIndexStore>,
    bus: EventBus,
    control_bus: Arc<ControlBus>,
}

fn harness(dir: &std::path::Path, template: WorkflowTemplate, engine: FakeEngine, auto_mode: bool) -> Harness {
    std::fs::write(dir.join("prompt.md"), "do the work").unwrap();

    let step_store = Arc::new(StepIndexStore::new(dir.join("state")));
    let run_index_store = Arc::new(RunIndexStore::new(dir.join("run-index.json")));
    let behavior_file = BehaviorFileWriter::new(dir.join("memory/behavior.json"));
    let bus = EventBus::new();
    bus.enable_history(200);
    let control_bus = Arc::new(ControlBus::new());
    let registry = Arc::new(EngineRegistry::new(
        vec![Arc::new(engine) as Arc<dyn Engine>],
        EngineId::new("fake"),
    ));
    let monitoring = Arc::new(crate::monitoring::Monitoring::new(dir.join("logs"), bus.clone()));
    let agents_config = Arc::new(AgentsConfig::default());

    let deps = RunnerDeps {
        template: Arc::new(template),
        step_store: step_store.clone(),
        run_index_store,
        behavior_file,
        bus: bus.clone(),
        control_bus: control_bus.clone(),
        registry,
        monitoring,
        agents_config,
        clock: FakeClock::new(1_000),
        working_dir: dir.to_path_buf(),
        selected_track: None,
        selected_conditions: HashSet::new(),
        project_name: Some("demo".into()),
        auto_mode,
    };

    Harness {
        deps: Some(deps),
        step_store,
        bus,
        control_bus,
    }
}

#[tokio::test]
async fn run_completes_all_steps_and_emits_lifecycle_events() {
    let dir = tempdir().unwrap();
    let engine = FakeEngine::new("fake");
    engine.set_next_stdout("all done");
    let template = template_with(vec![
        Step::Module(module_step("agent-a", None)),
        Step::Module(module_step("agent-b", None)),
    ]);
    let harness = harness(dir.path(), template, engine, true);
    let mut runner = WorkflowRunner::new(harness.deps.unwrap());

    runner.run().await.unwrap();

    let history = harness.bus.get_history_by_type("workflow:completed");
    assert_eq!(history.len(), 1);
    assert_eq!(harness.bus.get_history_by_type("agent:added").len(), 2);
    assert_eq!(harness.bus.get_history_by_type("agent:status").len(), 4); // running + completed, twice
}

#[tokio::test]
async fn run_stops_immediately_when_stop_was_already_signalled() {
    let dir = tempdir().unwrap();
    let engine = FakeEngine::new("fake");
    engine.set_next_stdout("should not run");
    let template = template_with(vec![Step::Module(module_step("agent-a", None))]);
    let harness = harness(dir.path(), template, engine.clone(), true);
    harness.control_bus.signal_stop();

    let mut runner = WorkflowRunner::new(harness.deps.unwrap());
    runner.run().await.unwrap();

    assert_eq!(harness.bus.get_history_by_type("workflow:stopped").len(), 1);
    assert!(engine.calls().is_empty());
}

#[tokio::test]
async fn run_resumes_a_crashed_step_with_a_continuation_prompt() {
    let dir = tempdir().unwrap();
    let engine = FakeEngine::new("fake");
    engine.set_next_stdout("resumed output");
    let template = template_with(vec![Step::Module(module_step("agent-a", None))]);
    let harness = harness(dir.path(), template, engine.clone(), true);

    harness
        .step_store
        .mark_step_started(StepIndex::new(0), 500)
        .unwrap();
    harness
        .step_store
        .init_step_session(StepIndex::new(0), SessionId::new("sess-1"), MonitoringId::new(9))
        .unwrap();

    let mut runner = WorkflowRunner::new(harness.deps.unwrap());
    runner.run().await.unwrap();

    let calls = engine.calls();
    assert!(matches!(
        &calls[0],
        cm_adapters::EngineCall::Run { prompt } if prompt == "Continue."
    ));
    assert_eq!(harness.bus.get_history_by_type("monitoring:register").len(), 1);
}

#[tokio::test]
async fn trigger_runs_target_inline_and_emits_subagent_events() {
    let dir = tempdir().unwrap();
    let engine = FakeEngine::new("fake");
    engine.set_next_stdout("[[codemachine:behavior {\"action\":\"trigger\",\"requested\":true}]]");
    let source = module_step_with(
        "agent-a",
        Some(ModuleBehavior::Trigger {
            agent_id: AgentId::new("agent-aux"),
        }),
        true,
    );
    let target = module_step("agent-aux", None);
    let template = template_with(vec![Step::Module(source), Step::Module(target)]);
    let harness = harness(dir.path(), template, engine.clone(), true);

    let mut runner = WorkflowRunner::new(harness.deps.unwrap());
    runner.run().await.unwrap();

    assert_eq!(harness.bus.get_history_by_type("subagent:added").len(), 1);
    assert_eq!(harness.bus.get_history_by_type("triggered_agent:status").len(), 2); // running + completed
    let run_calls = engine
        .calls()
        .into_iter()
        .filter(|call| matches!(call, cm_adapters::EngineCall::Run { .. }))
        .count();
    // agent-a, the inline trigger run of agent-aux, then agent-aux's own normal visit.
    assert_eq!(run_calls, 3);
}

#[tokio::test]
async fn loop_behavior_rewinds_until_max_iterations_exceeded() {
    let dir = tempdir().unwrap();
    let engine = FakeEngine::new("fake");
    engine.set_next_stdout(
        "[[codemachine:behavior {\"action\":\"repeat\",\"steps_back\":1,\"reason\":\"retry\"}]]",
    );
    let step = module_step_with("agent-a", Some(ModuleBehavior::Loop { max_iterations: 1 }), false);
    let template = template_with(vec![Step::Module(step)]);
    let harness = harness(dir.path(), template, engine.clone(), true);

    let mut runner = WorkflowRunner::new(harness.deps.unwrap());
    runner.run().await.unwrap();

    assert_eq!(harness.bus.get_history_by_type("loop:state").len(), 1);
    assert_eq!(engine.calls().len(), 2);
    assert_eq!(harness.bus.get_history_by_type("workflow:completed").len(), 1);
}
