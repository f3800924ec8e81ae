// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

const TEMPLATE_JSON: &str = r#"{
    "steps": [
        {
            "stepType": "module",
            "agentId": "pkg:builder",
            "agentName": "Builder",
            "promptPath": ["builder.md"],
            "executeOnce": true
        }
    ],
    "specification": true
}"#;

#[test]
fn resolves_relative_template_path_against_pointer_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("workflow.json"), TEMPLATE_JSON).unwrap();
    std::fs::write(
        dir.path().join("template.json"),
        r#"{ "templatePath": "workflow.json" }"#,
    )
    .unwrap();

    let template = load_template(&dir.path().join("template.json")).unwrap();
    assert_eq!(template.total_steps(), 1);
    assert!(template.specification);
}

#[test]
fn load_template_direct_skips_the_pointer() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("workflow.json");
    std::fs::write(&path, TEMPLATE_JSON).unwrap();

    let template = load_template_direct(&path).unwrap();
    assert_eq!(template.total_steps(), 1);
}

#[test]
fn missing_pointer_file_is_an_io_error() {
    let err = load_template(Path::new("/nonexistent/template.json"));
    assert!(matches!(err, Err(TemplateError::Io { .. })));
}
