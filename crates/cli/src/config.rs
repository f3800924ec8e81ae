// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Layered runtime configuration: compiled-in defaults, overridden by
//! `.codemachine/template.json`'s pointer resolution, then by
//! `CODEMACHINE_*`/`LOG_LEVEL`/`DEBUG` env vars, then by CLI flags. Resolved
//! once at startup into an immutable [`RunnerConfig`], the way
//! `oj-daemon::lifecycle::Config::load()` resolves daemon configuration
//! before anything else runs.

use std::path::{Path, PathBuf};
use std::time::Duration;

const CONTROL_DIR: &str = ".codemachine";
const TEMPLATE_POINTER_FILE: &str = "template.json";
const AGENTS_CONFIG_FILE: &str = "agents-config.json";
const DEFAULT_STEP_TIMEOUT_SECS: u64 = 30 * 60;

const AGENT_TIMEOUT_ENV: &str = "CODEMACHINE_AGENT_TIMEOUT";
const DEBUG_BOOTSTRAP_ENV: &str = "CODEMACHINE_DEBUG_BOOTSTRAP";

/// Every path and setting the CLI needs, resolved once off `working_dir`.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub working_dir: PathBuf,
    pub control_dir: PathBuf,
    pub template_pointer_path: PathBuf,
    pub agents_config_path: PathBuf,
    pub logs_dir: PathBuf,
    pub behavior_path: PathBuf,
    pub step_index_dir: PathBuf,
    pub run_index_path: PathBuf,
    pub debug: bool,
    pub step_timeout: Duration,
}

impl RunnerConfig {
    /// `cli_debug` is the `--debug` flag; env vars and the flag both turn
    /// debug mode on (the flag never turns it off against an env override).
    pub fn load(working_dir: impl Into<PathBuf>, cli_debug: bool) -> Self {
        let working_dir = working_dir.into();
        let control_dir = working_dir.join(CONTROL_DIR);

        let debug = cli_debug
            || std::env::var(DEBUG_BOOTSTRAP_ENV).is_ok()
            || std::env::var("DEBUG").is_ok();

        let step_timeout = std::env::var(AGENT_TIMEOUT_ENV)
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_STEP_TIMEOUT_SECS));

        Self {
            template_pointer_path: control_dir.join(TEMPLATE_POINTER_FILE),
            agents_config_path: control_dir.join("agents").join(AGENTS_CONFIG_FILE),
            logs_dir: control_dir.join("logs"),
            behavior_path: control_dir.join("memory").join("behavior.json"),
            step_index_dir: control_dir.join("steps"),
            run_index_path: control_dir.join("run-index.json"),
            control_dir,
            working_dir,
            debug,
            step_timeout,
        }
    }

    pub fn spec_path(&self) -> PathBuf {
        cm_onboard::resolve_spec_path(&self.working_dir)
    }
}

pub fn canonicalize_or(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
