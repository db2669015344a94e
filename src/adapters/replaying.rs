//! Archive-backed replay adapter for the `ApiClient` seam.

use std::path::Path;
use std::sync::Mutex;

use crate::client::{ApiClient, ApiRequest, ApiResponse, ClientError};
use crate::fixture::format::FixtureArchive;
use crate::fixture::player::FixturePlayer;

/// Serves recorded responses from a fixture archive; never touches the
/// network. An operation with no remaining recorded calls is a hard error.
pub struct ReplayingApiClient {
    player: Mutex<FixturePlayer>,
}

impl ReplayingApiClient {
    /// Builds a replaying client over an in-memory archive.
    #[must_use]
    pub fn new(archive: &FixtureArchive) -> Self {
        Self { player: Mutex::new(FixturePlayer::new(archive)) }
    }

    /// Loads a compressed archive file and builds a replaying client.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        Ok(Self { player: Mutex::new(FixturePlayer::load(path)?) })
    }
}

impl ApiClient for ReplayingApiClient {
    fn invoke(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError> {
        let mut player = self
            .player
            .lock()
            .map_err(|e| -> ClientError { format!("Player lock poisoned: {e}").into() })?;
        let call = player.next_call(&request.operation).map_err(ClientError::from)?;
        Ok(ApiResponse { body: call.response, metadata: call.metadata })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::format::{OperationLog, RecordedCall};
    use chrono::Utc;
    use serde_json::json;

    fn archive() -> FixtureArchive {
        FixtureArchive {
            name: "replay-test".into(),
            recorded_at: Utc::now(),
            operations: vec![OperationLog {
                operation: "ec2:DescribeInstances".into(),
                calls: vec![RecordedCall {
                    call_index: 0,
                    operation: "ec2:DescribeInstances".into(),
                    request: json!({}),
                    response: json!({"Reservations": [{"Id": "r-1"}]}),
                    metadata: json!({"RequestId": "req-9"}),
                }],
            }],
        }
    }

    #[test]
    fn serves_recorded_response_verbatim() {
        let client = ReplayingApiClient::new(&archive());
        let response =
            client.invoke(&ApiRequest::new("ec2:DescribeInstances", json!({}))).unwrap();
        assert_eq!(response.body, json!({"Reservations": [{"Id": "r-1"}]}));
        assert_eq!(response.metadata, json!({"RequestId": "req-9"}));
    }

    #[test]
    fn unexpected_operation_is_a_hard_error() {
        let client = ReplayingApiClient::new(&archive());
        let err = client.invoke(&ApiRequest::new("s3:ListBuckets", json!({}))).unwrap_err();
        assert!(err.to_string().contains("Unexpected call"));
    }
}
