//! Fixture data structures persisted by the recorder and read by the player.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single recorded API call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordedCall {
    /// Ordinal of this call within the whole session (strictly increasing).
    pub call_index: u64,
    /// Operation name in `service:Action` form.
    pub operation: String,
    /// Request parameters sent with the call.
    pub request: serde_json::Value,
    /// Response body returned by the call.
    pub response: serde_json::Value,
    /// Response metadata (request id, status, identity hints).
    pub metadata: serde_json::Value,
}

/// All recorded calls for one distinct operation name, in call order.
///
/// Serialized as one `<Action>.calls.yaml` sequence file during recording.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OperationLog {
    /// The operation every call in this log belongs to.
    pub operation: String,
    /// Calls in the order they were issued.
    pub calls: Vec<RecordedCall>,
}

/// A complete recorded session: the content of one compressed archive.
///
/// Immutable once written; a stale archive is replaced by a full re-record,
/// never edited in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FixtureArchive {
    /// Session name, also used for the archive file name.
    pub name: String,
    /// When the session was recorded.
    pub recorded_at: DateTime<Utc>,
    /// Per-operation logs, sorted by operation name.
    pub operations: Vec<OperationLog>,
}

impl FixtureArchive {
    /// Total number of recorded calls across all operations.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.operations.iter().map(|log| log.calls.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_archive() -> FixtureArchive {
        FixtureArchive {
            name: "ec2-smoke".into(),
            recorded_at: Utc::now(),
            operations: vec![
                OperationLog {
                    operation: "ec2:DescribeInstances".into(),
                    calls: vec![RecordedCall {
                        call_index: 1,
                        operation: "ec2:DescribeInstances".into(),
                        request: json!({"Filters": []}),
                        response: json!({"Reservations": []}),
                        metadata: json!({"RequestId": "req-1"}),
                    }],
                },
                OperationLog {
                    operation: "sts:GetCallerIdentity".into(),
                    calls: vec![RecordedCall {
                        call_index: 0,
                        operation: "sts:GetCallerIdentity".into(),
                        request: json!({}),
                        response: json!({"Account": "123456789012"}),
                        metadata: json!({}),
                    }],
                },
            ],
        }
    }

    #[test]
    fn yaml_round_trip() {
        let archive = sample_archive();
        let yaml = serde_yaml::to_string(&archive).expect("serialize");
        let deserialized: FixtureArchive = serde_yaml::from_str(&yaml).expect("deserialize");
        assert_eq!(archive, deserialized);
    }

    #[test]
    fn call_count_sums_all_operations() {
        assert_eq!(sample_archive().call_count(), 2);
    }
}
