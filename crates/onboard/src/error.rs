// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors raised by the onboarding service and pre-flight checks.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OnboardError {
    #[error(transparent)]
    Storage(#[from] cm_storage::StorageError),

    #[error("onboarding step {current:?} cannot accept a {attempted} submission")]
    WrongStep {
        current: cm_core::OnboardingStep,
        attempted: &'static str,
    },

    #[error("'{option_id}' is not a valid option for the current question")]
    UnknownOption { option_id: String },

    #[error("controller initialization failed: {0}")]
    ControllerInitFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(
        "specification file at {path} is missing content — edit it and re-run; a placeholder was just written"
    )]
    SpecificationPlaceholder { path: PathBuf },

    #[error("specification path {path} is a directory, not a file")]
    SpecificationIsDirectory { path: PathBuf },
}
