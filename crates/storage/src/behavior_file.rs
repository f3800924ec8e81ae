// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Writer for `.codemachine/memory/behavior.json`, reset before each step so
//! the agent process can overwrite it to signal a behavior decision.

use crate::atomic::{read_json, write_json};
use crate::error::StorageError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorAction {
    Continue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviorFile {
    pub action: BehaviorAction,
}

pub struct BehaviorFileWriter {
    path: PathBuf,
}

impl BehaviorFileWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Written before each step with `{"action":"continue"}`; the agent may
    /// overwrite it during execution to communicate a behavior decision.
    pub fn reset(&self) -> Result<(), StorageError> {
        write_json(
            &self.path,
            &BehaviorFile {
                action: BehaviorAction::Continue,
            },
        )
    }

    pub fn read(&self) -> Result<Option<BehaviorFile>, StorageError> {
        read_json(&self.path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
#[path = "behavior_file_tests.rs"]
mod tests;
