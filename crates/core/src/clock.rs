// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction so step timing and timeouts are deterministic in tests.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Source of wall-clock time for the parts of the system that record
/// `startedAt`/`completedAt` timestamps or enforce timeouts.
pub trait Clock: Clone + Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn epoch_ms(&self) -> u64;

    /// Advance by `d`. No-op for [`SystemClock`]; lets [`FakeClock`]-driven
    /// tests simulate elapsed time without sleeping.
    fn advance(&self, _d: Duration) {}
}

/// Production clock backed by [`SystemTime::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn epoch_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Deterministic clock for tests: starts at a fixed epoch and only moves
/// when told to.
#[derive(Debug, Clone)]
pub struct FakeClock {
    epoch_ms: Arc<Mutex<u64>>,
}

impl FakeClock {
    pub fn new(start_epoch_ms: u64) -> Self {
        Self {
            epoch_ms: Arc::new(Mutex::new(start_epoch_ms)),
        }
    }

    pub fn set(&self, epoch_ms: u64) {
        *self.epoch_ms.lock() = epoch_ms;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Clock for FakeClock {
    fn epoch_ms(&self) -> u64 {
        *self.epoch_ms.lock()
    }

    fn advance(&self, d: Duration) {
        *self.epoch_ms.lock() += d.as_millis() as u64;
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
