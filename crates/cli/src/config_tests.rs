// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;
use yare::parameterized;

#[test]
fn paths_are_resolved_under_the_control_directory() {
    let dir = tempdir().unwrap();
    let config = RunnerConfig::load(dir.path(), false);

    assert_eq!(config.control_dir, dir.path().join(".codemachine"));
    assert_eq!(
        config.template_pointer_path,
        dir.path().join(".codemachine").join("template.json")
    );
    assert_eq!(config.logs_dir, dir.path().join(".codemachine").join("logs"));
}

#[test]
fn default_step_timeout_is_thirty_minutes() {
    let dir = tempdir().unwrap();
    let config = RunnerConfig::load(dir.path(), false);
    assert_eq!(config.step_timeout, Duration::from_secs(30 * 60));
}

#[parameterized(
    flag_only = { true, false },
    env_only = { false, true },
)]
fn debug_mode_is_on_if_flag_or_env_is_set(cli_debug: bool, set_env: bool) {
    let dir = tempdir().unwrap();
    if set_env {
        std::env::set_var("CODEMACHINE_DEBUG_BOOTSTRAP", "1");
    }
    let config = RunnerConfig::load(dir.path(), cli_debug);
    if set_env {
        std::env::remove_var("CODEMACHINE_DEBUG_BOOTSTRAP");
    }
    assert!(config.debug);
}
