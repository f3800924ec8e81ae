// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cm-core: shared domain types for the Code Machine workflow orchestrator.
//!
//! This crate owns the identifiers, persisted record shapes, and event
//! vocabulary that every other crate speaks. It does not know how templates
//! are parsed, how steps are executed, or how records are stored on disk —
//! those are the template, engine, and storage crates respectively.

pub mod agent_ui;
pub mod clock;
pub mod error;
pub mod event;
pub mod id;
pub mod onboarding;
pub mod run_index;
pub mod state_machine;
pub mod step_index_record;

pub use agent_ui::{AgentTelemetry, AgentUiRecord, AgentUiStatus};
pub use clock::{Clock, FakeClock, SystemClock};
pub use error::ValidationError;
pub use event::Event;
pub use id::{AgentId, EngineId, MonitoringId, SessionId, StepIndex};
pub use onboarding::{ChildQuestionContext, OnboardingState, OnboardingStep};
pub use run_index::RunIndex;
pub use state_machine::{ActiveLoop, InputState, StateEvent, StateMachineContext, StepState};
pub use step_index_record::StepIndexRecord;
