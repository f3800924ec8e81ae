// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persists and rebuilds the process-wide [`RunIndex`].

use crate::atomic::{read_json, write_json};
use crate::error::StorageError;
use crate::step_index_store::StepIndexStore;
use cm_core::{RunIndex, StepIndex};
use std::path::{Path, PathBuf};

pub struct RunIndexStore {
    path: PathBuf,
}

impl RunIndexStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<RunIndex, StorageError> {
        Ok(read_json(&self.path)?.unwrap_or_default())
    }

    pub fn save(&self, index: &RunIndex) -> Result<(), StorageError> {
        write_json(&self.path, index)
    }

    /// Rebuilds completed/not-completed lists from the on-disk step records
    /// rather than trusting the persisted run index blindly — a crash
    /// between a step write and a run-index write cannot desynchronize the
    /// two for long.
    pub fn rebuild_from_step_records(
        &self,
        step_store: &StepIndexStore,
        total_steps: usize,
    ) -> Result<RunIndex, StorageError> {
        let mut index = self.load()?;
        index.completed_steps.clear();
        index.not_completed_steps.clear();

        for i in 0..total_steps {
            let idx = StepIndex::new(i);
            match step_store.get_step_data(idx)? {
                Some(record) if record.completed_at.is_some() => index.mark_completed(idx),
                Some(_) => index.mark_not_completed(idx),
                None => {}
            }
        }

        self.save(&index)?;
        Ok(index)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
#[path = "run_index_store_tests.rs"]
mod tests;
