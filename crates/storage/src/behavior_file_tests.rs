// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn reset_writes_continue_action() {
    let dir = tempfile::tempdir().unwrap();
    let writer = BehaviorFileWriter::new(dir.path().join("memory/behavior.json"));
    writer.reset().unwrap();

    let read = writer.read().unwrap().unwrap();
    assert_eq!(read.action, BehaviorAction::Continue);
}

#[test]
fn read_before_reset_is_none() {
    let dir = tempfile::tempdir().unwrap();
    let writer = BehaviorFileWriter::new(dir.path().join("memory/behavior.json"));
    assert_eq!(writer.read().unwrap(), None);
}
