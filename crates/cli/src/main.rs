// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! `codemachine`: runs a workflow template start to finish — pre-flight
//! checks, onboarding (if the run index is missing anything), then the
//! workflow runner loop.

mod config;
mod engines;
mod error;
mod logging;
mod onboarding_io;

use std::sync::Arc;

use clap::Parser;
use cm_adapters::EngineRegistry;
use cm_bus::{ControlBus, EventBus};
use cm_core::SystemClock;
use cm_engine::{Monitoring, RunnerDeps, WorkflowRunner};
use cm_storage::{BehaviorFileWriter, RunIndexStore, StepIndexStore};
use cm_template::AgentsConfig;

use crate::config::{canonicalize_or, RunnerConfig};
use crate::error::{validation_from_onboard, CliError};
use crate::onboarding_io::ProcessControllerInitializer;

/// Runs a workflow template in the current directory.
#[derive(Debug, Parser)]
#[command(name = "codemachine", version, about)]
struct Args {
    /// Working directory to run in (defaults to the current directory).
    #[arg(short = 'C', long)]
    directory: Option<std::path::PathBuf>,

    /// Project name to use, skipping the onboarding question for it.
    #[arg(long)]
    project_name: Option<String>,

    /// Run without waiting for user input at each suspension point.
    #[arg(long)]
    auto: bool,

    /// Force debug logging and a `.codemachine/logs/workflow-debug.log` file.
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let run_id = uuid::Uuid::new_v4();

    let working_dir = canonicalize_or(args.directory.unwrap_or_else(|| ".".into()));
    let config = RunnerConfig::load(&working_dir, args.debug);

    let _logging_guard = logging::init(config.debug, &config.logs_dir)?;
    tracing::info!(%run_id, working_dir = %working_dir.display(), "starting codemachine run");

    match run(config, args.project_name, args.auto, run_id).await {
        Ok(()) => Ok(()),
        Err(CliError::Validation(err)) => {
            eprintln!("{}\n  at: {}", err.message, err.spec_path.display());
            std::process::exit(1);
        }
        Err(err) => Err(err.into()),
    }
}

async fn run(
    config: RunnerConfig,
    initial_project_name: Option<String>,
    auto_mode: bool,
    run_id: uuid::Uuid,
) -> Result<(), CliError> {
    let template = Arc::new(
        cm_template::load_template(&config.template_pointer_path).map_err(CliError::Template)?,
    );

    let spec_path = config.spec_path();
    cm_onboard::check_specification(&template, &spec_path).map_err(validation_from_onboard)?;

    std::fs::create_dir_all(&config.step_index_dir)?;
    std::fs::create_dir_all(&config.logs_dir)?;
    if let Some(parent) = config.run_index_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if let Some(parent) = config.behavior_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let run_index_store = Arc::new(RunIndexStore::new(config.run_index_path.clone()));
    let step_store = Arc::new(StepIndexStore::new(config.step_index_dir.clone()));
    let mut run_index = run_index_store.load()?;

    let needs = cm_onboard::check_onboarding_needs(&template, &run_index);
    let registry = Arc::new(engines::default_registry());

    if needs.needs_project_name || needs.needs_track_selection || needs.needs_conditions_selection {
        let onboarding_bus = EventBus::new();
        let controller_init = Arc::new(ProcessControllerInitializer::new(registry.clone()));
        let mut service = cm_onboard::OnboardingService::new(
            template.clone(),
            onboarding_bus,
            initial_project_name.or_else(|| run_index.project_name.clone()),
            controller_init,
        );

        onboarding_io::run_interactive(&mut service, &template)
            .await
            .map_err(validation_from_onboard)?;

        let state = service.state();
        run_index.project_name = state.project_name.clone();
        run_index.selected_track = state.selected_track_id.clone();
        run_index.selected_conditions = state.selected_conditions.clone();
        run_index_store.save(&run_index)?;
    }

    let agents_config = Arc::new(
        if config.agents_config_path.exists() {
            AgentsConfig::load(&config.agents_config_path).map_err(CliError::Template)?
        } else {
            AgentsConfig::default()
        },
    );

    let bus = EventBus::new();
    bus.subscribe_all(|event| tracing::info!(?event, "workflow event"));
    let control_bus = Arc::new(ControlBus::new());
    let monitoring = Arc::new(Monitoring::new(config.logs_dir.clone(), bus.clone()));
    let behavior_file = BehaviorFileWriter::new(config.behavior_path.clone());

    install_signal_handlers(control_bus.clone());

    let deps = RunnerDeps {
        template,
        step_store,
        run_index_store,
        behavior_file,
        bus,
        control_bus,
        registry,
        monitoring,
        agents_config,
        clock: SystemClock,
        working_dir: config.working_dir.clone(),
        selected_track: run_index.selected_track.clone(),
        selected_conditions: run_index.selected_conditions.clone(),
        project_name: run_index.project_name.clone(),
        auto_mode,
    };

    let mut runner = WorkflowRunner::new(deps);
    runner.run().await.map_err(CliError::Engine)?;

    tracing::info!(%run_id, "workflow finished, waiting for a second interrupt to exit");
    wait_for_second_interrupt().await;
    Ok(())
}

/// `cm-engine::WorkflowRunner::run()` deliberately returns once the
/// template is exhausted rather than blocking forever — this binary owns
/// the "stay alive until told twice" wait so a UI attached to the same
/// event bus has a chance to render the final state before the process
/// exits.
async fn wait_for_second_interrupt() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("received interrupt, press Ctrl-C again to exit or wait to exit now");
    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), tokio::signal::ctrl_c()).await;
}

fn install_signal_handlers(control_bus: Arc<ControlBus>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            control_bus.signal_stop();
        }
    });
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
