// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic, scriptable [`Engine`] for tests.

use std::sync::Arc;

use async_trait::async_trait;
use cm_core::AgentId;
use parking_lot::Mutex;

use crate::engine::{Engine, EngineMetadata, RunRequest, RunResponse};
use crate::error::AdapterError;

/// A call recorded by [`FakeEngine`], for assertions in tests.
#[derive(Debug, Clone)]
pub enum EngineCall {
    Run { prompt: String },
    SyncConfig { additional_agents: Vec<AgentId> },
    IsAuthenticated,
}

struct FakeEngineState {
    authenticated: bool,
    run_error: Option<String>,
    next_stdout: String,
    calls: Vec<EngineCall>,
}

/// Fake engine for testing: records every call and lets the test script the
/// next response (or error) before invoking the engine under test.
#[derive(Clone)]
pub struct FakeEngine {
    metadata: EngineMetadata,
    inner: Arc<Mutex<FakeEngineState>>,
}

impl FakeEngine {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            metadata: EngineMetadata {
                id: cm_core::EngineId::new(id.clone()),
                name: id,
                default_model: None,
                default_model_reasoning_effort: None,
            },
            inner: Arc::new(Mutex::new(FakeEngineState {
                authenticated: true,
                run_error: None,
                next_stdout: String::new(),
                calls: Vec::new(),
            })),
        }
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.inner.lock().calls.clone()
    }

    pub fn set_authenticated(&self, authenticated: bool) {
        self.inner.lock().authenticated = authenticated;
    }

    pub fn set_run_error(&self, message: impl Into<String>) {
        self.inner.lock().run_error = Some(message.into());
    }

    pub fn set_next_stdout(&self, stdout: impl Into<String>) {
        self.inner.lock().next_stdout = stdout.into();
    }
}

#[async_trait]
impl Engine for FakeEngine {
    fn metadata(&self) -> &EngineMetadata {
        &self.metadata
    }

    async fn is_authenticated(&self) -> bool {
        let mut inner = self.inner.lock();
        inner.calls.push(EngineCall::IsAuthenticated);
        inner.authenticated
    }

    async fn run(&self, request: RunRequest) -> Result<RunResponse, AdapterError> {
        let (error, stdout) = {
            let mut inner = self.inner.lock();
            inner.calls.push(EngineCall::Run {
                prompt: request.prompt.clone(),
            });
            (inner.run_error.take(), inner.next_stdout.clone())
        };

        if let Some(message) = error {
            return Err(AdapterError::NonZeroExit(message));
        }

        if request.abort_signal.is_cancelled() {
            return Err(AdapterError::NonZeroExit("cancelled".into()));
        }

        if let Some(cb) = &request.on_data {
            cb(&stdout);
        }

        Ok(RunResponse {
            stdout,
            session_id: request.session_id,
        })
    }

    async fn sync_config(&self, additional_agents: &[AgentId]) -> Result<(), AdapterError> {
        self.inner.lock().calls.push(EngineCall::SyncConfig {
            additional_agents: additional_agents.to_vec(),
        });
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_engine_tests.rs"]
mod tests;
