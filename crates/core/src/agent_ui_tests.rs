// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    pending = { AgentUiStatus::Pending, false },
    running = { AgentUiStatus::Running, false },
    awaiting = { AgentUiStatus::Awaiting, false },
    completed = { AgentUiStatus::Completed, true },
    skipped = { AgentUiStatus::Skipped, true },
)]
fn terminal_statuses_are_completed_or_skipped(status: AgentUiStatus, expected: bool) {
    assert_eq!(status.is_terminal(), expected);
}

#[test]
fn new_record_starts_pending_with_zeroed_telemetry() {
    let record = AgentUiRecord::new(AgentId::new("a"), "Agent A", StepIndex::new(0), 3, 0);
    assert_eq!(record.status, AgentUiStatus::Pending);
    assert_eq!(record.telemetry, AgentTelemetry::default());
    assert!(record.engine.is_none());
}

#[test]
fn status_serializes_lowercase() {
    let json = serde_json::to_string(&AgentUiStatus::Awaiting).unwrap();
    assert_eq!(json, "\"awaiting\"");
}
