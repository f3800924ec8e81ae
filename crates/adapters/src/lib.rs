// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cm-adapters: the pluggable engine abstraction, its process-backed
//! implementation, and the registry that resolves a step's engine
//! preference to an authenticated, concrete [`Engine`].

mod auth_cache;
mod engine;
mod error;
mod process_engine;
mod registry;

pub use auth_cache::AuthCache;
pub use engine::{
    DataCallback, Engine, EngineMetadata, ErrorDataCallback, RunRequest, RunResponse,
    TelemetryCallback,
};
pub use error::AdapterError;
pub use process_engine::ProcessEngine;
pub use registry::EngineRegistry;

#[cfg(any(test, feature = "test-support"))]
mod fake_engine;
#[cfg(any(test, feature = "test-support"))]
pub use fake_engine::{EngineCall, FakeEngine};
