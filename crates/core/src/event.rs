// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The typed event vocabulary flowing through the event bus.
//!
//! Every variant corresponds to one wire discriminator (e.g. `agent:status`)
//! consumed by `cm-bus`. Payloads are plain data — listeners must not mutate
//! them, and nothing here owns a reference back into runner state.

use crate::agent_ui::{AgentTelemetry, AgentUiStatus};
use crate::id::{AgentId, EngineId, MonitoringId, SessionId, StepIndex};
use serde::{Deserialize, Serialize};

/// One emission on the event bus.
///
/// `#[serde(tag = "type")]` gives each variant the wire discriminator named
/// in the module doc comment (`agent:added`, `workflow:started`, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    #[serde(rename = "agent:added")]
    AgentAdded {
        agent_id: AgentId,
        name: String,
        order_index: usize,
        step_index: StepIndex,
        total_steps: usize,
    },
    #[serde(rename = "agent:status")]
    AgentStatus {
        agent_id: AgentId,
        status: AgentUiStatus,
    },
    #[serde(rename = "agent:engine")]
    AgentEngine {
        agent_id: AgentId,
        engine: EngineId,
    },
    #[serde(rename = "agent:model")]
    AgentModel {
        agent_id: AgentId,
        model: String,
    },
    #[serde(rename = "agent:telemetry")]
    AgentTelemetry {
        agent_id: AgentId,
        telemetry: AgentTelemetry,
    },
    #[serde(rename = "agent:reset")]
    AgentReset { agent_id: AgentId },

    #[serde(rename = "separator:add")]
    SeparatorAdd { label: String, order_index: usize },

    #[serde(rename = "monitoring:register")]
    MonitoringRegister {
        agent_id: AgentId,
        monitoring_id: MonitoringId,
    },

    #[serde(rename = "workflow:started")]
    WorkflowStarted { module_count: usize },
    #[serde(rename = "workflow:stopped")]
    WorkflowStopped,
    #[serde(rename = "workflow:completed")]
    WorkflowCompleted,

    #[serde(rename = "loop:state")]
    LoopState {
        source_agent: AgentId,
        iteration: u32,
        max_iterations: u32,
        reason: String,
    },
    #[serde(rename = "checkpoint:state")]
    CheckpointState { agent_id: AgentId, active: bool },
    #[serde(rename = "input:state")]
    InputState { active: bool },
    #[serde(rename = "chained:state")]
    ChainedState {
        agent_id: AgentId,
        prompt_queue_index: usize,
        prompt_queue_len: usize,
    },

    #[serde(rename = "message:log")]
    MessageLog {
        agent_id: Option<AgentId>,
        monitoring_id: Option<MonitoringId>,
        line: String,
    },

    #[serde(rename = "onboard:step")]
    OnboardStep { step: String },
    #[serde(rename = "onboard:project_name")]
    OnboardProjectName { project_name: String },
    #[serde(rename = "onboard:track")]
    OnboardTrack { track_id: String },
    #[serde(rename = "onboard:condition")]
    OnboardCondition { group_index: usize, option_id: String },
    #[serde(rename = "onboard:conditions_confirmed")]
    OnboardConditionsConfirmed { conditions: Vec<String> },
    #[serde(rename = "onboard:completed")]
    OnboardCompleted {
        project_name: String,
        track_id: Option<String>,
        conditions: Vec<String>,
        controller_agent_id: Option<AgentId>,
    },
    #[serde(rename = "onboard:cancelled")]
    OnboardCancelled,
    #[serde(rename = "onboard:launching_log")]
    OnboardLaunchingLog { line: String },

    #[serde(rename = "session:bound")]
    SessionBound {
        step_index: StepIndex,
        session_id: SessionId,
    },

    #[serde(rename = "subagent:added")]
    SubAgentAdded {
        parent_agent_id: AgentId,
        agent_id: AgentId,
        name: String,
    },
    #[serde(rename = "triggered_agent:status")]
    TriggeredAgentStatus {
        source_agent: AgentId,
        agent_id: AgentId,
        status: AgentUiStatus,
    },
}

impl Event {
    /// The wire discriminator, for logging and history queries by type.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::AgentAdded { .. } => "agent:added",
            Event::AgentStatus { .. } => "agent:status",
            Event::AgentEngine { .. } => "agent:engine",
            Event::AgentModel { .. } => "agent:model",
            Event::AgentTelemetry { .. } => "agent:telemetry",
            Event::AgentReset { .. } => "agent:reset",
            Event::SeparatorAdd { .. } => "separator:add",
            Event::MonitoringRegister { .. } => "monitoring:register",
            Event::WorkflowStarted { .. } => "workflow:started",
            Event::WorkflowStopped => "workflow:stopped",
            Event::WorkflowCompleted => "workflow:completed",
            Event::LoopState { .. } => "loop:state",
            Event::CheckpointState { .. } => "checkpoint:state",
            Event::InputState { .. } => "input:state",
            Event::ChainedState { .. } => "chained:state",
            Event::MessageLog { .. } => "message:log",
            Event::OnboardStep { .. } => "onboard:step",
            Event::OnboardProjectName { .. } => "onboard:project_name",
            Event::OnboardTrack { .. } => "onboard:track",
            Event::OnboardCondition { .. } => "onboard:condition",
            Event::OnboardConditionsConfirmed { .. } => "onboard:conditions_confirmed",
            Event::OnboardCompleted { .. } => "onboard:completed",
            Event::OnboardCancelled => "onboard:cancelled",
            Event::OnboardLaunchingLog { .. } => "onboard:launching_log",
            Event::SessionBound { .. } => "session:bound",
            Event::SubAgentAdded { .. } => "subagent:added",
            Event::TriggeredAgentStatus { .. } => "triggered_agent:status",
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
