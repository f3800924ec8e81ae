// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors surfaced by the engine crate's components.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Storage(#[from] cm_storage::StorageError),

    #[error(transparent)]
    Template(#[from] cm_template::TemplateError),

    #[error(transparent)]
    Adapter(#[from] cm_adapters::AdapterError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("step timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("no agent configuration found for {0}")]
    UnknownAgent(String),

    #[error("step index record for {0} is marked resumable but carries no monitoring id")]
    InvalidStepRecord(String),

    #[error("fallback agent for step {0} failed: {1}")]
    FallbackFailed(usize, String),

    #[error("workflow stopped by checkpoint quit")]
    CheckpointQuit,
}
