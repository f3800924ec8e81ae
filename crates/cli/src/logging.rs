// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Installs the process-wide `tracing` subscriber: an env-filter honoring
//! `RUST_LOG`/`LOG_LEVEL`/`DEBUG`, plus a non-blocking file appender to
//! `.codemachine/logs/workflow-debug.log` when debug mode is on.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEBUG_LOG_FILE: &str = "workflow-debug.log";

fn env_filter(debug: bool) -> EnvFilter {
    if let Ok(directive) = std::env::var("RUST_LOG") {
        return EnvFilter::new(directive);
    }
    if let Ok(level) = std::env::var("LOG_LEVEL") {
        return EnvFilter::new(level);
    }
    if std::env::var("DEBUG").is_ok() || debug {
        return EnvFilter::new("debug");
    }
    EnvFilter::new("info")
}

/// Returned guard must stay alive for the process lifetime — dropping it
/// stops the non-blocking writer's background flush thread.
#[must_use]
pub struct LoggingGuard(Option<WorkerGuard>);

/// `logs_dir` is the workflow's `.codemachine/logs` directory; only touched
/// when `debug` is true.
pub fn init(debug: bool, logs_dir: &Path) -> anyhow::Result<LoggingGuard> {
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    if !debug {
        tracing_subscriber::registry()
            .with(env_filter(debug))
            .with(stderr_layer)
            .init();
        return Ok(LoggingGuard(None));
    }

    std::fs::create_dir_all(logs_dir)?;
    let file_appender = tracing_appender::rolling::never(logs_dir, DEBUG_LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter(debug))
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(LoggingGuard(Some(guard)))
}
