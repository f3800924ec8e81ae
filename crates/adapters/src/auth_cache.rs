// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Time-to-live cache for engine authentication probes, with coalescing so
//! concurrent callers for the same engine share one in-flight probe rather
//! than each issuing their own.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use cm_core::EngineId;
use parking_lot::Mutex;
use tokio::sync::OnceCell;

const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

struct CacheSlot {
    result: Arc<OnceCell<bool>>,
    installed_at: Instant,
}

pub struct AuthCache {
    ttl: Duration,
    slots: Mutex<HashMap<EngineId, CacheSlot>>,
}

impl Default for AuthCache {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthCache {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached authentication status for `engine_id`, running
    /// `probe` if the slot is missing or expired. A second caller that
    /// arrives while a probe is already in flight awaits the same shared
    /// future instead of starting another.
    pub async fn get_or_probe<F, Fut>(&self, engine_id: EngineId, probe: F) -> bool
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = bool>,
    {
        let slot = {
            let mut slots = self.slots.lock();
            let needs_fresh_slot = match slots.get(&engine_id) {
                Some(slot) => slot.installed_at.elapsed() >= self.ttl,
                None => true,
            };
            if needs_fresh_slot {
                slots.insert(
                    engine_id.clone(),
                    CacheSlot {
                        result: Arc::new(OnceCell::new()),
                        installed_at: Instant::now(),
                    },
                );
            }
            match slots.get(&engine_id) {
                Some(slot) => slot.result.clone(),
                None => Arc::new(OnceCell::new()),
            }
        };

        *slot.get_or_init(probe).await
    }

    pub fn invalidate(&self, engine_id: &EngineId) {
        self.slots.lock().remove(engine_id);
    }

    pub fn invalidate_all(&self) {
        self.slots.lock().clear();
    }
}

#[cfg(test)]
#[path = "auth_cache_tests.rs"]
mod tests;
