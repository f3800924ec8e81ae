// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cm-engine: the Behavior Engine, Step Executor, Input Providers, and the
//! Workflow Runner that ties them together into a resumable, step-at-a-time
//! walk over a loaded template.

mod behavior;
mod error;
mod input_providers;
mod loop_counter;
mod monitoring;
mod runner;
mod step_executor;

pub use behavior::{
    evaluate_loop, evaluate_trigger, new_active_loop, parse_checkpoint_marker, should_skip_step,
    CheckpointOutcome, LoopDecision, SkipDecision,
};
pub use error::EngineError;
pub use input_providers::{
    AutoMode, ControllerInputProvider, InputContext, InputOutcome, InputProvider, InputSource,
    ProviderInput, UserInputProvider,
};
pub use loop_counter::LoopCounter;
pub use monitoring::Monitoring;
pub use runner::{RunnerDeps, WorkflowRunner};
pub use step_executor::{StepExecutionOutcome, StepExecutionRequest, StepExecutor};
