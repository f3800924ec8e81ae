// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cm-bus: the outbound event bus and inbound control bus that decouple
//! workflow execution from presentation.

mod control_bus;
mod event_bus;

pub use control_bus::{CheckpointSignal, ControlBus, InputSignal};
pub use event_bus::{EventBus, Listener};

use std::sync::OnceLock;

static GLOBAL_BUS: OnceLock<EventBus> = OnceLock::new();

/// Convenience for a standalone CLI invocation with no explicit bus
/// injected: the first caller wins and every later call returns the same
/// instance. Library callers should prefer constructing and injecting their
/// own [`EventBus`] per run.
pub fn global_event_bus() -> &'static EventBus {
    GLOBAL_BUS.get_or_init(EventBus::new)
}
