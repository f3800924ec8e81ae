// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Enumerates registered engines and resolves a step's pinned (or absent)
//! engine id to a concrete, authenticated [`Engine`] to run against.

use std::sync::Arc;

use cm_core::EngineId;

use crate::auth_cache::AuthCache;
use crate::engine::Engine;
use crate::error::AdapterError;

pub struct EngineRegistry {
    engines: Vec<Arc<dyn Engine>>,
    default_engine: EngineId,
    auth_cache: AuthCache,
}

impl EngineRegistry {
    /// `engines` order is preserved as "registry order" for fallback
    /// resolution. `default_engine` must name one of the registered engines.
    pub fn new(engines: Vec<Arc<dyn Engine>>, default_engine: EngineId) -> Self {
        Self {
            engines,
            default_engine,
            auth_cache: AuthCache::new(),
        }
    }

    pub fn engines(&self) -> &[Arc<dyn Engine>] {
        &self.engines
    }

    fn find(&self, id: &EngineId) -> Option<&Arc<dyn Engine>> {
        self.engines.iter().find(|engine| engine.id() == id)
    }

    async fn is_authenticated(&self, engine: &Arc<dyn Engine>) -> bool {
        self.auth_cache
            .get_or_probe(engine.id().clone(), || {
                let engine = engine.clone();
                async move { engine.is_authenticated().await }
            })
            .await
    }

    async fn first_authenticated(&self) -> Option<&Arc<dyn Engine>> {
        for engine in &self.engines {
            if self.is_authenticated(engine).await {
                return Some(engine);
            }
        }
        None
    }

    /// Resolve a step's pinned engine id (if any) to a concrete engine,
    /// following the pinned/unpinned fallback rules.
    pub async fn resolve(&self, pinned: Option<&EngineId>) -> Result<Arc<dyn Engine>, AdapterError> {
        if let Some(pinned_id) = pinned {
            let pinned_engine = self
                .find(pinned_id)
                .ok_or_else(|| AdapterError::UnknownEngine(pinned_id.to_string()))?;

            if self.is_authenticated(pinned_engine).await {
                return Ok(pinned_engine.clone());
            }

            tracing::warn!(
                engine = %pinned_id,
                "pinned engine is not authenticated, falling back"
            );
        }

        if let Some(engine) = self.first_authenticated().await {
            return Ok(engine.clone());
        }

        self.find(&self.default_engine)
            .cloned()
            .ok_or(AdapterError::NoAuthenticatedEngine)
    }

    pub fn invalidate_auth(&self, engine_id: &EngineId) {
        self.auth_cache.invalidate(engine_id);
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
