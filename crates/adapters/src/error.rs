// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors from engine operations.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("failed to spawn engine process: {0}")]
    SpawnFailed(String),

    #[error("engine process exited with a non-zero status: {0}")]
    NonZeroExit(String),

    #[error("I/O error communicating with engine process: {0}")]
    Io(#[from] std::io::Error),

    #[error("unknown engine id: {0}")]
    UnknownEngine(String),

    #[error("no authenticated engine is available")]
    NoAuthenticatedEngine,
}
