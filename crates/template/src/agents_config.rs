// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Loader for the agent-config mirror consumed by engines
//! (`.codemachine/agents/agents-config.json`).

use crate::error::TemplateError;
use crate::workflow::ChainedPrompt;
use cm_core::AgentId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Per-agent metadata mirrored for engines that consume namespaced ids
/// (`"package:name"`). Opaque here — the namespace convention is produced
/// and consumed entirely by this loader and the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentConfig {
    pub id: AgentId,
    pub name: String,
    #[serde(default)]
    pub chained_prompts: Vec<ChainedPrompt>,
}

/// Mirrored config file: a flat map keyed by the same id used in the
/// template's `agentId` fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentsConfig {
    #[serde(flatten)]
    pub agents: HashMap<String, AgentConfig>,
}

impl AgentsConfig {
    pub fn load(path: &Path) -> Result<Self, TemplateError> {
        let content = std::fs::read_to_string(path).map_err(|source| TemplateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| TemplateError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn get(&self, agent_id: &AgentId) -> Option<&AgentConfig> {
        self.agents.get(agent_id.as_str())
    }

    /// Chained prompts for `agent_id`, filtered to those whose `conditions`
    /// (if any) are fully satisfied by `selected_conditions`.
    pub fn chained_prompts_for(
        &self,
        agent_id: &AgentId,
        selected_conditions: &std::collections::HashSet<String>,
    ) -> Vec<ChainedPrompt> {
        self.get(agent_id)
            .map(|cfg| {
                cfg.chained_prompts
                    .iter()
                    .filter(|prompt| match &prompt.conditions {
                        Some(required) => required.iter().all(|c| selected_conditions.contains(c)),
                        None => true,
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "agents_config_tests.rs"]
mod tests;
