// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn store() -> (tempfile::TempDir, StepIndexStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = StepIndexStore::new(dir.path().join("state"));
    (dir, store)
}

#[test]
fn missing_record_reads_as_none() {
    let (_dir, store) = store();
    assert_eq!(store.get_step_data(StepIndex::new(0)).unwrap(), None);
}

#[test]
fn mark_started_persists_and_is_idempotent() {
    let (_dir, store) = store();
    let idx = StepIndex::new(0);
    store.mark_step_started(idx, 100).unwrap();
    store.mark_step_started(idx, 200).unwrap();

    let record = store.get_step_data(idx).unwrap().unwrap();
    assert_eq!(record.started_at, Some(100));
}

#[test]
fn resume_start_index_is_lowest_incomplete_step() {
    let (_dir, store) = store();
    store.mark_step_started(StepIndex::new(0), 10).unwrap();
    store.mark_step_completed(StepIndex::new(0), 20).unwrap();
    store.mark_step_started(StepIndex::new(1), 30).unwrap();

    assert_eq!(store.get_resume_start_index(3).unwrap(), 1);
}

#[test]
fn resume_start_index_is_total_when_all_complete() {
    let (_dir, store) = store();
    for i in 0..2 {
        let idx = StepIndex::new(i);
        store.mark_step_started(idx, 10).unwrap();
        store.mark_step_completed(idx, 20).unwrap();
    }
    assert_eq!(store.get_resume_start_index(2).unwrap(), 2);
}

#[test]
fn chain_resume_info_finds_earliest_resumable_step() {
    let (_dir, store) = store();
    let idx = StepIndex::new(1);
    store.mark_step_started(idx, 10).unwrap();
    store
        .init_step_session(idx, SessionId::new("sess-1"), cm_core::MonitoringId::new(7))
        .unwrap();
    store.mark_chain_completed(idx, 0).unwrap();

    let info = store.get_chain_resume_info(3).unwrap().unwrap();
    assert_eq!(info.step_index, idx);
    assert_eq!(info.monitoring_id, cm_core::MonitoringId::new(7));
    assert_eq!(info.next_chain_index, 1);
}

#[test]
fn chain_resume_info_is_none_once_step_completed() {
    let (_dir, store) = store();
    let idx = StepIndex::new(0);
    store.mark_step_started(idx, 10).unwrap();
    store
        .init_step_session(idx, SessionId::new("sess-1"), cm_core::MonitoringId::new(1))
        .unwrap();
    store.mark_step_completed(idx, 20).unwrap();

    assert_eq!(store.get_chain_resume_info(1).unwrap(), None);
}

#[test]
fn update_session_overwrites_across_retries() {
    let (_dir, store) = store();
    let idx = StepIndex::new(0);
    store
        .init_step_session(idx, SessionId::new("sess-1"), cm_core::MonitoringId::new(1))
        .unwrap();
    store
        .update_step_session(idx, SessionId::new("sess-2"), cm_core::MonitoringId::new(1))
        .unwrap();

    let record = store.get_step_data(idx).unwrap().unwrap();
    assert_eq!(record.session_id, Some(SessionId::new("sess-2")));
}
