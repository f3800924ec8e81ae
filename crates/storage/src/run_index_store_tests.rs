// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn load_missing_file_returns_default() {
    let dir = tempfile::tempdir().unwrap();
    let store = RunIndexStore::new(dir.path().join("run-index.json"));
    assert_eq!(store.load().unwrap().selected_track, None);
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let store = RunIndexStore::new(dir.path().join("run-index.json"));
    let mut index = RunIndex::default();
    index.selected_track = Some("small".into());
    store.save(&index).unwrap();

    let loaded = store.load().unwrap();
    assert_eq!(loaded.selected_track.as_deref(), Some("small"));
}

#[test]
fn rebuild_reflects_step_records_not_stale_persisted_state() {
    let dir = tempfile::tempdir().unwrap();
    let step_store = StepIndexStore::new(dir.path().join("state"));
    let run_store = RunIndexStore::new(dir.path().join("run-index.json"));

    // Stale persisted index claims step 0 is not completed.
    let mut stale = RunIndex::default();
    stale.mark_not_completed(StepIndex::new(0));
    run_store.save(&stale).unwrap();

    // But the step record says otherwise.
    step_store.mark_step_started(StepIndex::new(0), 10).unwrap();
    step_store.mark_step_completed(StepIndex::new(0), 20).unwrap();
    step_store.mark_step_started(StepIndex::new(1), 30).unwrap();

    let rebuilt = run_store.rebuild_from_step_records(&step_store, 3).unwrap();
    assert_eq!(rebuilt.completed_steps, vec![StepIndex::new(0)]);
    assert_eq!(rebuilt.not_completed_steps, vec![StepIndex::new(1)]);
}
