// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn run_request_new_has_no_callbacks_or_session() {
    let request = RunRequest::new("do the thing", PathBuf::from("/tmp/work"));
    assert_eq!(request.prompt, "do the thing");
    assert!(request.on_data.is_none());
    assert!(request.on_error_data.is_none());
    assert!(request.on_telemetry.is_none());
    assert!(request.session_id.is_none());
    assert!(!request.abort_signal.is_cancelled());
}

#[test]
fn engine_id_delegates_to_metadata() {
    struct Stub(EngineMetadata);

    #[async_trait::async_trait]
    impl Engine for Stub {
        fn metadata(&self) -> &EngineMetadata {
            &self.0
        }

        async fn is_authenticated(&self) -> bool {
            true
        }

        async fn run(&self, _request: RunRequest) -> Result<RunResponse, AdapterError> {
            Ok(RunResponse::default())
        }
    }

    let stub = Stub(EngineMetadata {
        id: cm_core::EngineId::new("stub-engine"),
        name: "Stub".into(),
        default_model: None,
        default_model_reasoning_effort: None,
    });

    assert_eq!(stub.id().as_str(), "stub-engine");
}
