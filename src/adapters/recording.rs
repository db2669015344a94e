//! Passthrough-and-record adapter for the `ApiClient` seam.

use std::sync::{Arc, Mutex};

use crate::client::{ApiClient, ApiRequest, ApiResponse, ClientError};
use crate::fixture::recorder::FixtureRecorder;

/// Records every successful call while delegating to an inner client.
///
/// Failed invocations propagate without being recorded: a fixture archive
/// only ever contains the calls a green run actually made.
pub struct RecordingApiClient {
    inner: Arc<dyn ApiClient>,
    recorder: Arc<Mutex<FixtureRecorder>>,
}

impl RecordingApiClient {
    /// Wraps `inner`, appending each call to the shared recorder.
    #[must_use]
    pub fn new(inner: Arc<dyn ApiClient>, recorder: Arc<Mutex<FixtureRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl ApiClient for RecordingApiClient {
    fn invoke(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError> {
        let response = self.inner.invoke(request)?;

        let mut recorder = self.recorder.lock().map_err(|e| -> ClientError {
            format!("Recorder lock poisoned: {e}").into()
        })?;
        recorder
            .record(
                &request.operation,
                request.params.clone(),
                response.body.clone(),
                response.metadata.clone(),
            )
            .map_err(ClientError::from)?;

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::format::OperationLog;
    use serde_json::json;

    struct CountingClient;

    impl ApiClient for CountingClient {
        fn invoke(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError> {
            if request.operation == "iam:DeleteRole" {
                return Err("DeleteConflict: role has attached policies".into());
            }
            Ok(ApiResponse {
                body: json!({"Echo": request.params}),
                metadata: json!({"RequestId": "req-0"}),
            })
        }
    }

    #[test]
    fn records_successful_calls_and_passes_responses_through() {
        let dir = std::env::temp_dir().join("cloudtape_recording_adapter_test");
        let _ = std::fs::remove_dir_all(&dir);

        let recorder =
            Arc::new(Mutex::new(FixtureRecorder::begin(&dir, "adapter-test").unwrap()));
        let client = RecordingApiClient::new(Arc::new(CountingClient), Arc::clone(&recorder));

        let request = ApiRequest::new("ec2:DescribeInstances", json!({"MaxResults": 5}));
        let response = client.invoke(&request).unwrap();
        assert_eq!(response.body, json!({"Echo": {"MaxResults": 5}}));

        let content =
            std::fs::read_to_string(dir.join("ec2_DescribeInstances.calls.yaml")).unwrap();
        let log: OperationLog = serde_yaml::from_str(&content).unwrap();
        assert_eq!(log.calls.len(), 1);
        assert_eq!(log.calls[0].request, json!({"MaxResults": 5}));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn failed_calls_propagate_without_being_recorded() {
        let dir = std::env::temp_dir().join("cloudtape_recording_adapter_err_test");
        let _ = std::fs::remove_dir_all(&dir);

        let recorder =
            Arc::new(Mutex::new(FixtureRecorder::begin(&dir, "adapter-err").unwrap()));
        let client = RecordingApiClient::new(Arc::new(CountingClient), Arc::clone(&recorder));

        let err = client.invoke(&ApiRequest::new("iam:DeleteRole", json!({}))).unwrap_err();
        assert!(err.to_string().contains("DeleteConflict"));
        assert!(!dir.join("iam_DeleteRole.calls.yaml").exists());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
