// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error shapes shared across crate boundaries.

use std::path::PathBuf;
use thiserror::Error;

/// A pre-flight validation failure: the specification file is missing,
/// empty, or otherwise not ready. Carries the resolved path so the CLI can
/// tell the user exactly where to look without re-deriving it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
    pub spec_path: PathBuf,
}

impl ValidationError {
    pub fn new(message: impl Into<String>, spec_path: impl Into<PathBuf>) -> Self {
        Self {
            message: message.into(),
            spec_path: spec_path.into(),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
