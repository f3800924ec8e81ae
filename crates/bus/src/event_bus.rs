// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed pub-sub hub decoupling execution from presentation.
//!
//! General subscribers observe every event; per-type subscribers observe
//! only events whose [`Event::kind`] matches. Dispatch snapshots the
//! relevant listener list under a read lock, then releases the lock before
//! invoking — an unsubscribe triggered from inside a listener can't
//! deadlock or invalidate the vector being iterated.

use cm_core::Event;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

pub type Listener = Arc<dyn Fn(&Event) + Send + Sync>;

struct HistoryRing {
    max_size: usize,
    entries: Vec<Event>,
}

impl HistoryRing {
    fn push(&mut self, event: Event) {
        if self.entries.len() >= self.max_size {
            self.entries.remove(0);
        }
        self.entries.push(event);
    }
}

#[derive(Default)]
struct Inner {
    general: Vec<Listener>,
    by_type: HashMap<&'static str, Vec<Listener>>,
    history: Option<HistoryRing>,
}

/// In-process event bus created per workflow run and injected into the
/// runner. A process-wide singleton factory is offered only as a
/// convenience for a standalone CLI invocation.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<RwLock<Inner>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe_all<F>(&self, listener: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.inner.write().general.push(Arc::new(listener));
    }

    pub fn on<F>(&self, kind: &'static str, listener: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.inner
            .write()
            .by_type
            .entry(kind)
            .or_default()
            .push(Arc::new(listener));
    }

    /// Subscribes for exactly one matching emission, then detaches.
    pub fn once<F>(&self, kind: &'static str, listener: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let fired = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let bus = self.clone();
        self.on(kind, move |event| {
            use std::sync::atomic::Ordering;
            if fired.swap(true, Ordering::SeqCst) {
                return;
            }
            listener(event);
            bus.remove_all_listeners(kind);
        });
    }

    pub fn remove_all_listeners(&self, kind: &str) {
        self.inner.write().by_type.remove(kind);
    }

    pub fn has_subscribers(&self) -> bool {
        let inner = self.inner.read();
        !inner.general.is_empty() || inner.by_type.values().any(|v| !v.is_empty())
    }

    pub fn enable_history(&self, max_size: usize) {
        self.inner.write().history = Some(HistoryRing {
            max_size,
            entries: Vec::new(),
        });
    }

    pub fn get_history(&self) -> Vec<Event> {
        self.inner
            .read()
            .history
            .as_ref()
            .map(|h| h.entries.clone())
            .unwrap_or_default()
    }

    pub fn get_history_by_type(&self, kind: &str) -> Vec<Event> {
        self.get_history()
            .into_iter()
            .filter(|e| e.kind() == kind)
            .collect()
    }

    pub fn clear_history(&self) {
        if let Some(history) = self.inner.write().history.as_mut() {
            history.entries.clear();
        }
    }

    /// Synchronous, ordered emission: general subscribers first, then
    /// per-type subscribers, in subscription order. A panicking listener is
    /// caught and logged; later listeners still run.
    pub fn emit(&self, event: Event) {
        let (general, by_type) = {
            let mut inner = self.inner.write();
            if let Some(history) = inner.history.as_mut() {
                history.push(event.clone());
            }
            let general = inner.general.clone();
            let by_type = inner.by_type.get(event.kind()).cloned().unwrap_or_default();
            (general, by_type)
        };

        for listener in general.iter().chain(by_type.iter()) {
            Self::dispatch_one(listener, &event);
        }
    }

    fn dispatch_one(listener: &Listener, event: &Event) {
        let result = catch_unwind(AssertUnwindSafe(|| listener(event)));
        if let Err(payload) = result {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_string());
            tracing::error!(event = event.kind(), panic = %message, "event listener panicked");
        }
    }
}

#[cfg(test)]
#[path = "event_bus_tests.rs"]
mod tests;
