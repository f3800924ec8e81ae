// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn args_parse_with_defaults() {
    let args = Args::parse_from(["codemachine"]);
    assert!(args.directory.is_none());
    assert!(!args.auto);
    assert!(!args.debug);
}

#[test]
fn args_parse_with_overrides() {
    let args = Args::parse_from([
        "codemachine",
        "-C",
        "/tmp/project",
        "--project-name",
        "demo",
        "--auto",
        "--debug",
    ]);
    assert_eq!(args.directory, Some(std::path::PathBuf::from("/tmp/project")));
    assert_eq!(args.project_name, Some("demo".to_string()));
    assert!(args.auto);
    assert!(args.debug);
}
