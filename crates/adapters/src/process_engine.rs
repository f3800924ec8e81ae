// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`Engine`] backed by a spawned subprocess: the default engine kind for
//! real (non-test) runs.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use cm_core::AgentId;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

use crate::engine::{Engine, EngineMetadata, RunRequest, RunResponse};
use crate::error::AdapterError;

/// Spawns `binary <args...>` with the prompt on stdin, streaming stdout and
/// stderr line-by-line to the request's callbacks as they arrive.
///
/// Authentication is checked by running `binary <auth_check_args...>` and
/// inspecting its exit status; engines that have no separate auth-check
/// concept (always authenticated) can pass an empty slice.
pub struct ProcessEngine {
    metadata: EngineMetadata,
    binary: String,
    args: Vec<String>,
    auth_check_args: Vec<String>,
}

impl ProcessEngine {
    pub fn new(
        metadata: EngineMetadata,
        binary: impl Into<String>,
        args: Vec<String>,
        auth_check_args: Vec<String>,
    ) -> Self {
        Self {
            metadata,
            binary: binary.into(),
            args,
            auth_check_args,
        }
    }
}

#[async_trait]
impl Engine for ProcessEngine {
    fn metadata(&self) -> &EngineMetadata {
        &self.metadata
    }

    async fn is_authenticated(&self) -> bool {
        if self.auth_check_args.is_empty() {
            return true;
        }
        Command::new(&self.binary)
            .args(&self.auth_check_args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false)
    }

    async fn run(&self, request: RunRequest) -> Result<RunResponse, AdapterError> {
        let mut command = Command::new(&self.binary);
        command
            .args(&self.args)
            .current_dir(&request.working_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(model) = &request.model {
            command.env("CODEMACHINE_ENGINE_MODEL", model);
        }
        if let Some(effort) = &request.model_reasoning_effort {
            command.env("CODEMACHINE_ENGINE_MODEL_REASONING_EFFORT", effort);
        }
        if let Some(session_id) = &request.session_id {
            command.env("CODEMACHINE_ENGINE_SESSION_ID", session_id.as_str());
        }

        let mut child = command
            .spawn()
            .map_err(|err| AdapterError::SpawnFailed(err.to_string()))?;

        {
            use tokio::io::AsyncWriteExt;
            if let Some(mut stdin) = child.stdin.take() {
                stdin
                    .write_all(request.prompt.as_bytes())
                    .await
                    .map_err(AdapterError::Io)?;
            }
        }

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| AdapterError::SpawnFailed("no stdout handle".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| AdapterError::SpawnFailed("no stderr handle".into()))?;

        let mut stdout_lines = BufReader::new(stdout).lines();
        let mut stderr_lines = BufReader::new(stderr).lines();
        let mut collected = String::new();

        loop {
            tokio::select! {
                biased;
                _ = request.abort_signal.cancelled() => {
                    child.start_kill().ok();
                    let _ = child.wait().await;
                    return Err(AdapterError::NonZeroExit("cancelled".into()));
                }
                line = stdout_lines.next_line() => {
                    match line.map_err(AdapterError::Io)? {
                        Some(line) => {
                            if let Some(cb) = &request.on_data {
                                cb(&line);
                            }
                            collected.push_str(&line);
                            collected.push('\n');
                        }
                        None => break,
                    }
                }
                line = stderr_lines.next_line() => {
                    if let Some(line) = line.map_err(AdapterError::Io)? {
                        if let Some(cb) = &request.on_error_data {
                            cb(&line);
                        }
                    }
                }
            }
        }

        let status = child.wait().await.map_err(AdapterError::Io)?;
        if !status.success() {
            return Err(AdapterError::NonZeroExit(status.to_string()));
        }

        Ok(RunResponse {
            stdout: collected,
            session_id: request.session_id,
        })
    }

    async fn sync_config(&self, _additional_agents: &[AgentId]) -> Result<(), AdapterError> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "process_engine_tests.rs"]
mod tests;
