//! Serves recorded calls back in their original order, operation by operation.

use std::collections::HashMap;
use std::path::Path;

use super::archive;
use super::format::{FixtureArchive, RecordedCall};

/// Replays a fixture archive.
///
/// Each operation name has its own queue of recorded calls with an
/// independent cursor: the Nth playback request for an operation gets the
/// Nth recorded call for that operation, regardless of how requests for
/// other operations interleave.
pub struct FixturePlayer {
    queues: HashMap<String, Vec<RecordedCall>>,
    cursors: HashMap<String, usize>,
}

impl FixturePlayer {
    /// Builds a player over an in-memory archive.
    #[must_use]
    pub fn new(archive: &FixtureArchive) -> Self {
        let mut queues: HashMap<String, Vec<RecordedCall>> = HashMap::new();
        for log in &archive.operations {
            queues.entry(log.operation.clone()).or_default().extend(log.calls.iter().cloned());
        }
        let cursors = queues.keys().map(|k| (k.clone(), 0)).collect();
        Self { queues, cursors }
    }

    /// Decompresses an archive file and builds a player over it.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        Ok(Self::new(&archive::unpack(path)?))
    }

    /// Consumes and returns the next unused recorded call for `operation`.
    ///
    /// # Errors
    ///
    /// Fails with an "unexpected call" diagnostic when the operation was
    /// never recorded or all its recorded calls are already consumed. This
    /// signals fixture drift and must surface as a hard test failure.
    pub fn next_call(&mut self, operation: &str) -> Result<RecordedCall, String> {
        let Some(queue) = self.queues.get(operation) else {
            let mut available: Vec<&str> = self.queues.keys().map(String::as_str).collect();
            available.sort_unstable();
            return Err(format!(
                "Unexpected call: no calls recorded for operation {operation:?}. \
                 Recorded operations: [{}]",
                available.join(", ")
            ));
        };

        let cursor = self.cursors.get_mut(operation).expect("cursor must exist");
        if *cursor >= queue.len() {
            return Err(format!(
                "Unexpected call: all {count} recorded calls for operation {operation:?} \
                 are consumed; the fixture is stale relative to the task sequence",
                count = queue.len(),
            ));
        }

        let call = queue[*cursor].clone();
        *cursor += 1;
        Ok(call)
    }

    /// Number of recorded calls for `operation` not yet consumed.
    ///
    /// Calls left unconsumed at the end of a replay session carry no
    /// defined meaning and are deliberately ignored by the harness.
    #[must_use]
    pub fn remaining(&self, operation: &str) -> usize {
        let recorded = self.queues.get(operation).map_or(0, Vec::len);
        let used = self.cursors.get(operation).copied().unwrap_or(0);
        recorded - used
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::format::OperationLog;
    use chrono::Utc;
    use serde_json::json;

    fn call(index: u64, operation: &str, response: serde_json::Value) -> RecordedCall {
        RecordedCall {
            call_index: index,
            operation: operation.into(),
            request: json!({}),
            response,
            metadata: json!({}),
        }
    }

    fn archive_of(operations: Vec<OperationLog>) -> FixtureArchive {
        FixtureArchive { name: "test".into(), recorded_at: Utc::now(), operations }
    }

    #[test]
    fn serves_per_operation_order_across_interleaving() {
        let archive = archive_of(vec![
            OperationLog {
                operation: "ec2:DescribeInstances".into(),
                calls: vec![
                    call(0, "ec2:DescribeInstances", json!("A")),
                    call(2, "ec2:DescribeInstances", json!("B")),
                    call(4, "ec2:DescribeInstances", json!("C")),
                ],
            },
            OperationLog {
                operation: "sts:GetCallerIdentity".into(),
                calls: vec![
                    call(1, "sts:GetCallerIdentity", json!("id-1")),
                    call(3, "sts:GetCallerIdentity", json!("id-2")),
                ],
            },
        ]);

        let mut player = FixturePlayer::new(&archive);
        assert_eq!(player.next_call("ec2:DescribeInstances").unwrap().response, json!("A"));
        assert_eq!(player.next_call("sts:GetCallerIdentity").unwrap().response, json!("id-1"));
        assert_eq!(player.next_call("ec2:DescribeInstances").unwrap().response, json!("B"));
        assert_eq!(player.next_call("ec2:DescribeInstances").unwrap().response, json!("C"));
        assert_eq!(player.next_call("sts:GetCallerIdentity").unwrap().response, json!("id-2"));
    }

    #[test]
    fn exhausted_operation_is_an_unexpected_call() {
        let archive = archive_of(vec![OperationLog {
            operation: "ec2:DescribeInstances".into(),
            calls: vec![
                call(0, "ec2:DescribeInstances", json!("A")),
                call(1, "ec2:DescribeInstances", json!("B")),
                call(2, "ec2:DescribeInstances", json!("C")),
            ],
        }]);

        let mut player = FixturePlayer::new(&archive);
        for _ in 0..3 {
            player.next_call("ec2:DescribeInstances").unwrap();
        }
        let err = player.next_call("ec2:DescribeInstances").unwrap_err();
        assert!(err.contains("Unexpected call"));
        assert!(err.contains("stale"));
    }

    #[test]
    fn unrecorded_operation_lists_what_was_recorded() {
        let archive = archive_of(vec![OperationLog {
            operation: "sts:GetCallerIdentity".into(),
            calls: vec![call(0, "sts:GetCallerIdentity", json!({}))],
        }]);

        let mut player = FixturePlayer::new(&archive);
        let err = player.next_call("iam:DeleteRole").unwrap_err();
        assert!(err.contains("Unexpected call"));
        assert!(err.contains("sts:GetCallerIdentity"));
    }

    #[test]
    fn remaining_counts_unconsumed_calls() {
        let archive = archive_of(vec![OperationLog {
            operation: "ec2:DescribeInstances".into(),
            calls: vec![
                call(0, "ec2:DescribeInstances", json!("A")),
                call(1, "ec2:DescribeInstances", json!("B")),
            ],
        }]);

        let mut player = FixturePlayer::new(&archive);
        assert_eq!(player.remaining("ec2:DescribeInstances"), 2);
        player.next_call("ec2:DescribeInstances").unwrap();
        assert_eq!(player.remaining("ec2:DescribeInstances"), 1);
        assert_eq!(player.remaining("never:Recorded"), 0);
    }
}
