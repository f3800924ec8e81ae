// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builds the [`EngineRegistry`] this binary runs against.
//!
//! Engine binaries and their authentication are named collaborators, not
//! this crate's concern (see `cm-adapters::ProcessEngine`): this module only
//! decides which binaries are registered and in what order, which is a
//! startup-time wiring decision, not domain logic.

use std::sync::Arc;

use cm_adapters::{Engine, EngineMetadata, EngineRegistry, ProcessEngine};
use cm_core::EngineId;

/// One registered engine's launch shape, overridable via
/// `CODEMACHINE_ENGINE_<NAME>_BIN` for local development against a engine
/// binary not on `PATH` under its default name.
struct EngineSpec {
    id: &'static str,
    default_binary: &'static str,
    auth_check_args: &'static [&'static str],
}

const KNOWN_ENGINES: &[EngineSpec] = &[
    EngineSpec {
        id: "claude-code",
        default_binary: "claude",
        auth_check_args: &["--version"],
    },
    EngineSpec {
        id: "codex",
        default_binary: "codex",
        auth_check_args: &["--version"],
    },
];

fn binary_for(spec: &EngineSpec) -> String {
    let env_key = format!(
        "CODEMACHINE_ENGINE_{}_BIN",
        spec.id.to_uppercase().replace('-', "_")
    );
    std::env::var(env_key).unwrap_or_else(|_| spec.default_binary.to_string())
}

/// Builds the default registry from [`KNOWN_ENGINES`], in declaration order
/// (registry order governs fallback resolution — see `EngineRegistry::resolve`).
pub fn default_registry() -> EngineRegistry {
    let engines: Vec<Arc<dyn Engine>> = KNOWN_ENGINES
        .iter()
        .map(|spec| {
            Arc::new(ProcessEngine::new(
                EngineMetadata {
                    id: EngineId::new(spec.id),
                    name: spec.id.to_string(),
                    default_model: None,
                    default_model_reasoning_effort: None,
                },
                binary_for(spec),
                Vec::new(),
                spec.auth_check_args.iter().map(|s| s.to_string()).collect(),
            )) as Arc<dyn Engine>
        })
        .collect();

    EngineRegistry::new(engines, EngineId::new(KNOWN_ENGINES[0].id))
}

#[cfg(test)]
#[path = "engines_tests.rs"]
mod tests;
