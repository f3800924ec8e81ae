// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use async_trait::async_trait;
use cm_bus::EventBus;
use cm_core::AgentId;
use cm_template::{ConditionGroup, ModuleStep, TrackDef, WorkflowTemplate};
use indexmap::IndexSet;
use std::collections::HashSet;

struct FakeControllerInitializer {
    result: Result<String, String>,
}

#[async_trait]
impl ControllerInitializer for FakeControllerInitializer {
    async fn init(&self, _controller: &ModuleStep, _project_name: &str) -> Result<AgentId, OnboardError> {
        match &self.result {
            Ok(id) => Ok(AgentId::new(id.clone())),
            Err(message) => Err(OnboardError::ControllerInitFailed(message.clone())),
        }
    }
}

fn controller_module() -> ModuleStep {
    ModuleStep {
        agent_id: AgentId::new("controller"),
        agent_name: "Controller".to_string(),
        prompt_path: vec!["controller.md".into()],
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

fn template_with_controller(include_controller: bool) -> WorkflowTemplate {
    let auth_child = ConditionGroup {
        question: "Which auth provider?".into(),
        multi_select: false,
        options: IndexSet::from(["oauth".to_string(), "password".to_string()]),
        child_groups: Vec::new(),
        tracks: HashSet::new(),
    };
    let features_group = ConditionGroup {
        question: "Which features?".into(),
        multi_select: true,
        options: IndexSet::from(["auth".to_string(), "billing".to_string()]),
        child_groups: vec![auth_child],
        tracks: HashSet::new(),
    };
    let deploy_group = ConditionGroup {
        question: "Deploy target?".into(),
        multi_select: false,
        options: IndexSet::from(["aws".to_string(), "gcp".to_string()]),
        child_groups: Vec::new(),
        tracks: HashSet::new(),
    };

    WorkflowTemplate {
        steps: Vec::new(),
        tracks: Some(TrackDef {
            question: "Which track?".into(),
            options: IndexSet::from(["web".to_string(), "cli".to_string()]),
        }),
        condition_groups: vec![features_group, deploy_group],
        controller: include_controller.then(controller_module),
        specification: false,
    }
}

#[tokio::test]
async fn full_flow_queues_child_group_and_launches_controller() {
    let template = Arc::new(template_with_controller(true));
    let bus = EventBus::new();
    bus.enable_history(200);
    let init = Arc::new(FakeControllerInitializer {
        result: Ok("controller-1".to_string()),
    });
    let mut service = OnboardingService::new(template, bus.clone(), None, init);

    service.start();
    service.submit_project_name("demo".into()).unwrap();
    service.submit_track("web".into()).unwrap();

    assert_eq!(service.current_step(), OnboardingStep::ConditionGroup);
    service.toggle_condition("auth".into()).unwrap();
    service.confirm_selections().unwrap();

    assert_eq!(service.current_step(), OnboardingStep::ConditionGroup);
    service.select_condition("aws".into()).unwrap();

    assert_eq!(service.current_step(), OnboardingStep::ConditionChild);
    service.select_child_condition("oauth".into()).unwrap();

    assert_eq!(service.current_step(), OnboardingStep::ControllerConversation);
    service.launch().await.unwrap();

    let selected = &service.state().selected_conditions;
    assert!(selected.contains("auth"));
    assert!(selected.contains("aws"));
    assert!(selected.contains("oauth"));

    let completed = bus.get_history_by_type("onboard:completed");
    assert_eq!(completed.len(), 1);
}

#[tokio::test]
async fn skipping_project_name_starts_on_tracks() {
    let template = Arc::new(template_with_controller(false));
    let bus = EventBus::new();
    bus.enable_history(50);
    let init = Arc::new(FakeControllerInitializer { result: Ok("x".into()) });
    let mut service = OnboardingService::new(template, bus.clone(), Some("preset".into()), init);

    service.start();
    assert_eq!(service.current_step(), OnboardingStep::Tracks);
    assert!(bus.get_history_by_type("onboard:project_name").is_empty());
}

#[tokio::test]
async fn submitting_an_unknown_track_is_rejected() {
    let template = Arc::new(template_with_controller(false));
    let bus = EventBus::new();
    let init = Arc::new(FakeControllerInitializer { result: Ok("x".into()) });
    let mut service = OnboardingService::new(template, bus, Some("preset".into()), init);
    service.start();

    let err = service.submit_track("mobile".into()).unwrap_err();
    assert!(matches!(err, OnboardError::UnknownOption { .. }));
}

#[tokio::test]
async fn acting_out_of_step_order_is_rejected() {
    let template = Arc::new(template_with_controller(false));
    let bus = EventBus::new();
    let init = Arc::new(FakeControllerInitializer { result: Ok("x".into()) });
    let mut service = OnboardingService::new(template, bus, Some("preset".into()), init);
    service.start();

    let err = service.toggle_condition("auth".into()).unwrap_err();
    assert!(matches!(err, OnboardError::WrongStep { .. }));
}

#[tokio::test]
async fn cancel_emits_cancelled_from_any_step() {
    let template = Arc::new(template_with_controller(false));
    let bus = EventBus::new();
    bus.enable_history(10);
    let init = Arc::new(FakeControllerInitializer { result: Ok("x".into()) });
    let mut service = OnboardingService::new(template, bus.clone(), None, init);

    service.start();
    service.cancel();

    assert_eq!(bus.get_history_by_type("onboard:cancelled").len(), 1);
}
