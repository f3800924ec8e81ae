// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resolves `.codemachine/template.json` and loads the workflow template it
//! points at.

use crate::error::TemplateError;
use crate::workflow::WorkflowTemplate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The small pointer file at `.codemachine/template.json`: just a path to
/// the real template, kept separate so the active template can be swapped
/// without touching the template itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplatePointer {
    pub template_path: PathBuf,
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, TemplateError> {
    let content = std::fs::read_to_string(path).map_err(|source| TemplateError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| TemplateError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads the pointer file at `pointer_path`, then the template it names
/// (resolved relative to the pointer's parent directory if not absolute).
pub fn load_template(pointer_path: &Path) -> Result<WorkflowTemplate, TemplateError> {
    let pointer: TemplatePointer = read_json(pointer_path)?;
    let template_path = if pointer.template_path.is_absolute() {
        pointer.template_path
    } else {
        pointer_path
            .parent()
            .map(|dir| dir.join(&pointer.template_path))
            .unwrap_or(pointer.template_path)
    };
    read_json(&template_path)
}

/// Loads a workflow template directly, bypassing the pointer file — used by
/// tests and by tooling that already knows the concrete path.
pub fn load_template_direct(template_path: &Path) -> Result<WorkflowTemplate, TemplateError> {
    read_json(template_path)
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
