// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inbound control channels the Runner subscribes to.
//!
//! Kept separate from [`crate::EventBus`] (outbound, to any attached UI):
//! each signal type here is its own broadcast channel rather than a shared
//! typed enum, since control signals fan out to at most the Runner's own
//! suspension points, not to arbitrary listeners.

use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 32;

#[derive(Debug, Clone)]
pub struct InputSignal {
    pub prompt: Option<String>,
    pub skip: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointSignal {
    Continue,
    Quit,
}

/// One channel per signal family named in the external interface: stop,
/// pause, input, skip, mode-change, and the two checkpoint outcomes.
pub struct ControlBus {
    stop_tx: broadcast::Sender<()>,
    pause_tx: broadcast::Sender<()>,
    input_tx: broadcast::Sender<InputSignal>,
    skip_tx: broadcast::Sender<()>,
    mode_change_tx: broadcast::Sender<bool>,
    checkpoint_tx: broadcast::Sender<CheckpointSignal>,
}

impl Default for ControlBus {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlBus {
    pub fn new() -> Self {
        Self {
            stop_tx: broadcast::channel(CHANNEL_CAPACITY).0,
            pause_tx: broadcast::channel(CHANNEL_CAPACITY).0,
            input_tx: broadcast::channel(CHANNEL_CAPACITY).0,
            skip_tx: broadcast::channel(CHANNEL_CAPACITY).0,
            mode_change_tx: broadcast::channel(CHANNEL_CAPACITY).0,
            checkpoint_tx: broadcast::channel(CHANNEL_CAPACITY).0,
        }
    }

    pub fn signal_stop(&self) {
        let _ = self.stop_tx.send(());
    }

    pub fn subscribe_stop(&self) -> broadcast::Receiver<()> {
        self.stop_tx.subscribe()
    }

    pub fn signal_pause(&self) {
        let _ = self.pause_tx.send(());
    }

    pub fn subscribe_pause(&self) -> broadcast::Receiver<()> {
        self.pause_tx.subscribe()
    }

    pub fn signal_input(&self, signal: InputSignal) {
        let _ = self.input_tx.send(signal);
    }

    pub fn subscribe_input(&self) -> broadcast::Receiver<InputSignal> {
        self.input_tx.subscribe()
    }

    pub fn signal_skip(&self) {
        let _ = self.skip_tx.send(());
    }

    pub fn subscribe_skip(&self) -> broadcast::Receiver<()> {
        self.skip_tx.subscribe()
    }

    pub fn signal_mode_change(&self, autonomous_mode: bool) {
        let _ = self.mode_change_tx.send(autonomous_mode);
    }

    pub fn subscribe_mode_change(&self) -> broadcast::Receiver<bool> {
        self.mode_change_tx.subscribe()
    }

    pub fn signal_checkpoint(&self, signal: CheckpointSignal) {
        let _ = self.checkpoint_tx.send(signal);
    }

    pub fn subscribe_checkpoint(&self) -> broadcast::Receiver<CheckpointSignal> {
        self.checkpoint_tx.subscribe()
    }
}

#[cfg(test)]
#[path = "control_bus_tests.rs"]
mod tests;
