// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Prompt variable interpolation.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Regex pattern for `${variable_name}` or `${namespace.variable_name}`.
#[allow(clippy::expect_used)]
pub static VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([a-zA-Z_][a-zA-Z0-9_]*(?:\.[a-zA-Z_][a-zA-Z0-9_-]*)*)\}")
        .expect("constant regex pattern is valid")
});

/// Regex pattern for `${VAR:-default}` environment variable expansion.
#[allow(clippy::expect_used)]
static ENV_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{(\w+):-([^}]*)\}").expect("constant regex pattern is valid"));

/// Interpolate `${name}` placeholders with values from `vars`.
///
/// `${VAR:-default}` environment fallbacks are expanded first, then
/// `${var}`/`${namespace.var}` placeholders from `vars`. Unknown template
/// variables are left untouched rather than erroring — shared verbatim by
/// prompt rendering and any working-directory override a step carries.
pub fn interpolate(template: &str, vars: &HashMap<String, String>) -> String {
    let env_expanded = ENV_PATTERN
        .replace_all(template, |caps: &regex::Captures| {
            let var_name = &caps[1];
            let default_value = &caps[2];
            std::env::var(var_name).unwrap_or_else(|_| default_value.to_string())
        })
        .to_string();

    VAR_PATTERN
        .replace_all(&env_expanded, |caps: &regex::Captures| {
            let name = &caps[1];
            match vars.get(name) {
                Some(val) => val.clone(),
                None => caps[0].to_string(),
            }
        })
        .to_string()
}

#[cfg(test)]
#[path = "substitution_tests.rs"]
mod tests;
