// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    added = { Event::AgentAdded { agent_id: AgentId::new("a"), name: "A".into(), order_index: 0, step_index: StepIndex::new(0), total_steps: 3 }, "agent:added" },
    status = { Event::AgentStatus { agent_id: AgentId::new("a"), status: AgentUiStatus::Running }, "agent:status" },
    started = { Event::WorkflowStarted { module_count: 3 }, "workflow:started" },
    stopped = { Event::WorkflowStopped, "workflow:stopped" },
    onboard_cancelled = { Event::OnboardCancelled, "onboard:cancelled" },
    subagent_added = { Event::SubAgentAdded { parent_agent_id: AgentId::new("a"), agent_id: AgentId::new("b"), name: "B".into() }, "subagent:added" },
    triggered_agent_status = { Event::TriggeredAgentStatus { source_agent: AgentId::new("a"), agent_id: AgentId::new("b"), status: AgentUiStatus::Completed }, "triggered_agent:status" },
)]
fn kind_matches_wire_discriminator(event: Event, expected: &str) {
    assert_eq!(event.kind(), expected);
}

#[test]
fn serializes_with_tagged_type_field() {
    let event = Event::AgentReset {
        agent_id: AgentId::new("builder"),
    };
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["type"], "agent:reset");
    assert_eq!(json["agent_id"], "builder");
}

#[test]
fn workflow_started_round_trips() {
    let event = Event::WorkflowStarted { module_count: 5 };
    let json = serde_json::to_string(&event).unwrap();
    let back: Event = serde_json::from_str(&json).unwrap();
    assert_eq!(back.kind(), "workflow:started");
}
