// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Monitoring: allocates monitoring ids, owns the append-only per-agent log
//! writer, and forwards telemetry updates to the event bus as they stream
//! in rather than re-parsing a step's final output.

use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use cm_bus::EventBus;
use cm_core::{AgentId, AgentTelemetry, Event, MonitoringId};

use crate::error::EngineError;

/// Assigns monotonically increasing monitoring ids and writes each agent's
/// transcript to `logs/agent-<id>.log` under the control directory.
pub struct Monitoring {
    logs_root: PathBuf,
    next_id: AtomicU64,
    bus: EventBus,
}

impl Monitoring {
    pub fn new(logs_root: impl Into<PathBuf>, bus: EventBus) -> Self {
        Self {
            logs_root: logs_root.into(),
            next_id: AtomicU64::new(1),
            bus,
        }
    }

    pub fn allocate_id(&self) -> MonitoringId {
        MonitoringId::new(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    /// Ensure the allocator never reissues an id already seen on disk, used
    /// when resuming a run whose step records already carry monitoring ids.
    pub fn observe_existing_id(&self, id: MonitoringId) {
        let candidate = id.0 + 1;
        self.next_id.fetch_max(candidate, Ordering::SeqCst);
    }

    pub fn log_path(&self, monitoring_id: MonitoringId) -> PathBuf {
        self.logs_root.join(format!("agent-{}.log", monitoring_id))
    }

    /// Appends one line to the agent's transcript and emits a
    /// `message:log` event. Creates the log file (and its parent directory)
    /// on first use.
    pub fn append_log(
        &self,
        agent_id: Option<&AgentId>,
        monitoring_id: MonitoringId,
        line: &str,
    ) -> Result<(), EngineError> {
        let path = self.log_path(monitoring_id);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        writeln!(file, "{line}")?;

        self.bus.emit(Event::MessageLog {
            agent_id: agent_id.cloned(),
            monitoring_id: Some(monitoring_id),
            line: line.to_string(),
        });
        Ok(())
    }

    /// Forward a telemetry update as it streams in. The last update wins —
    /// callers must not re-derive telemetry from the final collected output.
    pub fn report_telemetry(&self, agent_id: AgentId, telemetry: AgentTelemetry) {
        self.bus.emit(Event::AgentTelemetry { agent_id, telemetry });
    }

    pub fn root(&self) -> &Path {
        &self.logs_root
    }
}

#[cfg(test)]
#[path = "monitoring_tests.rs"]
mod tests;
