// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable per-step record store, one JSON file per step under
//! `.codemachine/state/`.

use crate::atomic::{read_json, write_json};
use crate::error::StorageError;
use cm_core::{MonitoringId, SessionId, StepIndex, StepIndexRecord};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};

/// Result of [`StepIndexStore::get_chain_resume_info`]: the earliest
/// started-but-not-completed step with a live session, and the chain index
/// execution should resume from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainResumeInfo {
    pub step_index: StepIndex,
    pub monitoring_id: MonitoringId,
    pub next_chain_index: usize,
}

/// Persistent per-step record store. Mutations are serialized through a
/// single mutex — a single workflow run never has two steps in flight, so
/// this is uncontended in the steady state and only serializes against rare
/// out-of-band status queries.
pub struct StepIndexStore {
    root: PathBuf,
    guard: Mutex<()>,
}

impl StepIndexStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            guard: Mutex::new(()),
        }
    }

    fn record_path(&self, idx: StepIndex) -> PathBuf {
        self.root.join(format!("step-{}.json", idx.get()))
    }

    pub fn get_step_data(&self, idx: StepIndex) -> Result<Option<StepIndexRecord>, StorageError> {
        let _lock = self.guard.lock();
        read_json(&self.record_path(idx))
    }

    fn load_or_new(&self, idx: StepIndex) -> Result<StepIndexRecord, StorageError> {
        Ok(read_json(&self.record_path(idx))?.unwrap_or_else(|| StepIndexRecord::new(idx)))
    }

    fn save(&self, record: &StepIndexRecord) -> Result<(), StorageError> {
        write_json(&self.record_path(record.step_index), record)
    }

    pub fn mark_step_started(&self, idx: StepIndex, now_ms: u64) -> Result<(), StorageError> {
        let _lock = self.guard.lock();
        let mut record = self.load_or_new(idx)?;
        record.mark_started(now_ms);
        self.save(&record)
    }

    pub fn init_step_session(
        &self,
        idx: StepIndex,
        session_id: SessionId,
        monitoring_id: MonitoringId,
    ) -> Result<(), StorageError> {
        let _lock = self.guard.lock();
        let mut record = self.load_or_new(idx)?;
        record.init_session(session_id, monitoring_id);
        self.save(&record)
    }

    pub fn update_step_session(
        &self,
        idx: StepIndex,
        session_id: SessionId,
        monitoring_id: MonitoringId,
    ) -> Result<(), StorageError> {
        let _lock = self.guard.lock();
        let mut record = self.load_or_new(idx)?;
        record.update_session(session_id, monitoring_id);
        self.save(&record)
    }

    pub fn mark_chain_completed(&self, idx: StepIndex, chain_index: usize) -> Result<(), StorageError> {
        let _lock = self.guard.lock();
        let mut record = self.load_or_new(idx)?;
        record.mark_chain_completed(chain_index);
        self.save(&record)
    }

    pub fn mark_step_completed(&self, idx: StepIndex, now_ms: u64) -> Result<(), StorageError> {
        let _lock = self.guard.lock();
        let mut record = self.load_or_new(idx)?;
        record.mark_completed(now_ms);
        self.save(&record)
    }

    /// The lowest step index whose record lacks `completedAt`, else
    /// `total_steps`.
    pub fn get_resume_start_index(&self, total_steps: usize) -> Result<usize, StorageError> {
        let _lock = self.guard.lock();
        for i in 0..total_steps {
            let record = read_json::<StepIndexRecord>(&self.record_path(StepIndex::new(i)))?;
            match record {
                Some(r) if r.completed_at.is_some() => continue,
                _ => return Ok(i),
            }
        }
        Ok(total_steps)
    }

    /// Across all records up to `total_steps`, the earliest started-but-not-
    /// completed step with a live session.
    pub fn get_chain_resume_info(
        &self,
        total_steps: usize,
    ) -> Result<Option<ChainResumeInfo>, StorageError> {
        let _lock = self.guard.lock();
        for i in 0..total_steps {
            let idx = StepIndex::new(i);
            if let Some(record) = read_json::<StepIndexRecord>(&self.record_path(idx))? {
                if let (true, Some(monitoring_id)) = (record.is_resumable(), record.monitoring_id) {
                    return Ok(Some(ChainResumeInfo {
                        step_index: idx,
                        monitoring_id,
                        next_chain_index: record.next_chain_index(),
                    }));
                }
            }
        }
        Ok(None)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
#[path = "step_index_store_tests.rs"]
mod tests;
