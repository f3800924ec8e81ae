// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors raised while loading and parsing templates.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("failed to read template file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse template JSON at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("template at {path} references condition group option '{option_id}' which is not defined")]
    UnknownConditionOption { path: PathBuf, option_id: String },

    #[error("template at {path} declares a controller step with no agentId")]
    MissingControllerAgent { path: PathBuf },
}
