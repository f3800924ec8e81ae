// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The CLI's top-level error type: the end of the `#[from]` chain that
//! starts at `cm-storage` and runs up through `cm-template`, `cm-adapters`,
//! `cm-engine`, and `cm-onboard`.

use cm_core::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    /// A pre-flight validation failure. Kept as its own variant (rather than
    /// folded into `Onboard`) so `main` can print `message`/`spec_path`
    /// without re-deriving them from a formatted string.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Onboard(#[from] cm_onboard::OnboardError),

    #[error(transparent)]
    Engine(#[from] cm_engine::EngineError),

    #[error(transparent)]
    Template(#[from] cm_template::TemplateError),

    #[error(transparent)]
    Storage(#[from] cm_storage::StorageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// `OnboardError` itself has no `ValidationError` variant — the
/// specification pre-flight check predates the onboarding crate's own error
/// enum and still reports through `SpecificationPlaceholder`/
/// `SpecificationIsDirectory`. Translate those two into the shared
/// `ValidationError` shape at the boundary so the CLI always prints the
/// same `message`/`spec_path` pair regardless of which phase raised it.
pub fn validation_from_onboard(err: cm_onboard::OnboardError) -> CliError {
    use cm_onboard::OnboardError;
    match err {
        OnboardError::SpecificationPlaceholder { path } => CliError::Validation(ValidationError::new(
            format!(
                "specification file at {} is missing content — edit it and re-run",
                path.display()
            ),
            path,
        )),
        OnboardError::SpecificationIsDirectory { path } => CliError::Validation(ValidationError::new(
            format!("specification path {} is a directory, not a file", path.display()),
            path,
        )),
        other => CliError::Onboard(other),
    }
}
