// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn validation_error_displays_message_only() {
    let err = ValidationError::new("specification is empty", "/tmp/specifications.md");
    assert_eq!(err.to_string(), "specification is empty");
    assert_eq!(err.spec_path, PathBuf::from("/tmp/specifications.md"));
}
