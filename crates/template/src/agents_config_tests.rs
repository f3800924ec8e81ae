// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::HashSet;
use std::io::Write;

fn write_fixture(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn loads_flat_map_of_agent_configs() {
    let file = write_fixture(
        r#"{
            "pkg:builder": { "id": "pkg:builder", "name": "Builder", "chainedPrompts": [] }
        }"#,
    );
    let config = AgentsConfig::load(file.path()).unwrap();
    let agent = config.get(&AgentId::new("pkg:builder")).unwrap();
    assert_eq!(agent.name, "Builder");
}

#[test]
fn missing_file_is_an_io_error() {
    let err = AgentsConfig::load(std::path::Path::new("/nonexistent/agents-config.json"));
    assert!(matches!(err, Err(TemplateError::Io { .. })));
}

#[test]
fn chained_prompts_are_filtered_by_selected_conditions() {
    let file = write_fixture(
        r#"{
            "a": {
                "id": "a",
                "name": "A",
                "chainedPrompts": [
                    { "label": "p1", "content": "do x" },
                    { "label": "p2", "content": "do y", "conditions": ["needs-docker"] }
                ]
            }
        }"#,
    );
    let config = AgentsConfig::load(file.path()).unwrap();

    let none_selected: HashSet<String> = HashSet::new();
    let prompts = config.chained_prompts_for(&AgentId::new("a"), &none_selected);
    assert_eq!(prompts.len(), 1);
    assert_eq!(prompts[0].label, "p1");

    let with_docker: HashSet<String> = ["needs-docker".to_string()].into_iter().collect();
    let prompts = config.chained_prompts_for(&AgentId::new("a"), &with_docker);
    assert_eq!(prompts.len(), 2);
}
