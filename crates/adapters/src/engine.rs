// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Engine` abstraction: a pluggable backend that can run a prompt and
//! stream its output back to the caller.
//!
//! Mirrors the shape of an adapter in an agent-management layer, but
//! narrowed to the one operation the orchestrator actually needs: run a
//! prompt to completion (or cancellation) and report what happened.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use cm_core::{AgentId, SessionId};
use tokio_util::sync::CancellationToken;

use crate::error::AdapterError;

/// Static facts about a registered engine, independent of any particular run.
#[derive(Debug, Clone)]
pub struct EngineMetadata {
    pub id: cm_core::EngineId,
    pub name: String,
    pub default_model: Option<String>,
    pub default_model_reasoning_effort: Option<String>,
}

/// Callback invoked with a chunk of an engine's stdout as it streams in.
pub type DataCallback = Arc<dyn Fn(&str) + Send + Sync>;
/// Callback invoked with a chunk of an engine's stderr as it streams in.
pub type ErrorDataCallback = Arc<dyn Fn(&str) + Send + Sync>;
/// Callback invoked when the engine reports incremental token usage.
pub type TelemetryCallback = Arc<dyn Fn(cm_core::AgentTelemetry) + Send + Sync>;

pub struct RunRequest {
    pub prompt: String,
    pub working_dir: PathBuf,
    pub model: Option<String>,
    pub model_reasoning_effort: Option<String>,
    pub on_data: Option<DataCallback>,
    pub on_error_data: Option<ErrorDataCallback>,
    pub on_telemetry: Option<TelemetryCallback>,
    pub abort_signal: CancellationToken,
    /// Resume token from a previous run against the same agent, if any.
    pub session_id: Option<SessionId>,
}

impl RunRequest {
    pub fn new(prompt: impl Into<String>, working_dir: PathBuf) -> Self {
        Self {
            prompt: prompt.into(),
            working_dir,
            model: None,
            model_reasoning_effort: None,
            on_data: None,
            on_error_data: None,
            on_telemetry: None,
            abort_signal: CancellationToken::new(),
            session_id: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunResponse {
    pub stdout: String,
    /// Resume token the engine assigned this run, if it supports resumption.
    pub session_id: Option<SessionId>,
}

/// A pluggable backend capable of running a prompt for a given agent.
///
/// Implementations are responsible for locating their own binary, managing
/// authentication, and translating their native event stream into the
/// `on_data`/`on_error_data`/`on_telemetry` callbacks on [`RunRequest`].
#[async_trait]
pub trait Engine: Send + Sync {
    fn metadata(&self) -> &EngineMetadata;

    fn id(&self) -> &cm_core::EngineId {
        &self.metadata().id
    }

    /// Whether this engine currently has valid credentials to run at all.
    /// Cheap enough to call on every resolution decision; callers that need
    /// to avoid repeated probes should front it with an `AuthCache`.
    async fn is_authenticated(&self) -> bool;

    /// Run a prompt to completion, or until `request.abort_signal` fires.
    async fn run(&self, request: RunRequest) -> Result<RunResponse, AdapterError>;

    /// Push any additional agent configuration this engine needs to know
    /// about (e.g. participant names for a multi-agent session) ahead of a
    /// run. Most engines have nothing to sync and can ignore this.
    async fn sync_config(&self, _additional_agents: &[AgentId]) -> Result<(), AdapterError> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
