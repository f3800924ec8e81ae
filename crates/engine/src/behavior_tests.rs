// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::HashSet;
use yare::parameterized;

fn module(agent_id: &str) -> ModuleStep {
    ModuleStep {
        agent_id: AgentId::new(agent_id),
        agent_name: agent_id.to_string(),
        prompt_path: vec!["prompt.md".into()],
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

#[test]
fn should_skip_step_when_execute_once_already_complete() {
    let mut step = module("a");
    step.execute_once = true;
    let decision = should_skip_step(&step, true, None, 0, None, &HashSet::new());
    assert!(decision.skip);
}

#[test]
fn should_skip_step_when_in_active_loop_skip_list() {
    let step = module("a");
    let active_loop = ActiveLoop {
        source_agent: AgentId::new("looper"),
        back_steps: 1,
        iteration: 1,
        max_iterations: 3,
        skip_list: vec![2],
        reason: String::new(),
    };
    let decision = should_skip_step(&step, false, Some(&active_loop), 2, None, &HashSet::new());
    assert!(decision.skip);
}

#[test]
fn should_skip_step_when_track_excludes_it() {
    let mut step = module("a");
    step.tracks.insert("frontend".into());
    let decision = should_skip_step(&step, false, None, 0, Some("backend"), &HashSet::new());
    assert!(decision.skip);
}

#[test]
fn should_skip_step_when_condition_is_unmet() {
    let mut step = module("a");
    step.conditions.insert("needs-docker".into());
    let decision = should_skip_step(&step, false, None, 0, None, &HashSet::new());
    assert!(decision.skip);
}

#[test]
fn should_not_skip_step_with_no_exclusions() {
    let step = module("a");
    let decision = should_skip_step(&step, false, None, 0, None, &HashSet::new());
    assert!(!decision.skip);
}

#[parameterized(
    repeat_marker = { "[[codemachine:behavior {\"action\":\"repeat\",\"steps_back\":2,\"reason\":\"retry\"}]]", true },
    no_marker = { "just some ordinary agent output", false },
    irrelevant_marker = { "[[codemachine:behavior {\"action\":\"checkpoint_continue\"}]]", false },
)]
fn evaluate_loop_detects_repeat_marker(output: &str, expect_repeat: bool) {
    let decision = evaluate_loop(output, 1, 5);
    assert_eq!(decision.should_repeat, expect_repeat);
}

#[test]
fn evaluate_loop_stops_honoring_repeats_past_max_iterations() {
    let output = "[[codemachine:behavior {\"action\":\"repeat\",\"steps_back\":1,\"reason\":\"loop\"}]]";
    let decision = evaluate_loop(output, 6, 5);
    assert!(!decision.should_repeat);
}

#[test]
fn evaluate_loop_extracts_skip_list_and_reason() {
    let output = "[[codemachine:behavior {\"action\":\"repeat\",\"steps_back\":3,\"skip_list\":[1,2],\"reason\":\"needs another pass\"}]]";
    let decision = evaluate_loop(output, 1, 5);
    assert_eq!(decision.steps_back, 3);
    assert_eq!(decision.skip_list, vec![1, 2]);
    assert_eq!(decision.reason, "needs another pass");
}

#[test]
fn evaluate_trigger_requires_requested_true() {
    assert!(evaluate_trigger(
        "[[codemachine:behavior {\"action\":\"trigger\",\"requested\":true}]]"
    ));
    assert!(!evaluate_trigger(
        "[[codemachine:behavior {\"action\":\"trigger\",\"requested\":false}]]"
    ));
    assert!(!evaluate_trigger("no marker here"));
}

#[test]
fn parse_checkpoint_marker_distinguishes_continue_and_quit() {
    assert_eq!(
        parse_checkpoint_marker("[[codemachine:behavior {\"action\":\"checkpoint_continue\"}]]"),
        Some(CheckpointOutcome::Continue)
    );
    assert_eq!(
        parse_checkpoint_marker("[[codemachine:behavior {\"action\":\"checkpoint_quit\"}]]"),
        Some(CheckpointOutcome::Quit)
    );
    assert_eq!(parse_checkpoint_marker("no marker"), None);
}

#[test]
fn unrecognized_marker_payload_is_silently_ignored() {
    let output = "[[codemachine:behavior {\"action\":\"unknown_future_action\"}]]";
    assert!(!evaluate_trigger(output));
    assert_eq!(parse_checkpoint_marker(output), None);
}
