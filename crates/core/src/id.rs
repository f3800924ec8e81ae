// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Identifier newtypes used across the orchestrator.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Define a newtype ID wrapper around `String`.
///
/// Generates `new()`, `as_str()`, `Display`, `From<String>`, `From<&str>`,
/// `PartialEq<str>`, `PartialEq<&str>`, and `Borrow<str>` implementations.
#[macro_export]
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id! {
    /// Stable symbolic identifier for a configured agent, optionally
    /// namespaced as `"package:name"`. Opaque to the core — the namespace
    /// convention is produced and consumed by the template config loader.
    pub struct AgentId;
}

define_id! {
    /// Identifier of a registered engine (e.g. `"claude-code"`, `"codex"`).
    pub struct EngineId;
}

define_id! {
    /// Opaque, engine-owned token allowing conversation resume.
    pub struct SessionId;
}

/// Position of a step within a materialized workflow template.
///
/// Newtype over `usize` rather than a bare integer so step indices can't be
/// confused with monitoring ids, loop counts, or other small integers at
/// call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepIndex(pub usize);

impl StepIndex {
    pub fn new(idx: usize) -> Self {
        Self(idx)
    }

    pub fn get(self) -> usize {
        self.0
    }

    pub fn checked_sub(self, steps_back: usize) -> Option<Self> {
        self.0.checked_sub(steps_back).map(Self)
    }
}

impl fmt::Display for StepIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for StepIndex {
    fn from(v: usize) -> Self {
        Self(v)
    }
}

/// Integer assigned by the monitoring component the first time an agent
/// begins emitting data. Used as a join key between the runner and log
/// readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonitoringId(pub u64);

impl MonitoringId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for MonitoringId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
