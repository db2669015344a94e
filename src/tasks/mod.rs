//! Declarative task sequences: the input the harness hands to a run.
//!
//! A sequence is a YAML document naming idempotent operations with grouped
//! defaults, bounded retries, and best-effort cleanup tasks.

pub mod runner;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use runner::{run_sequence, RunOptions, TaskOutcome};

/// One declared operation invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskSpec {
    /// Human-readable task name used in diagnostics.
    pub name: String,
    /// Operation in `service:Action` form.
    pub operation: String,
    /// Task-level parameters; merged over the sequence defaults.
    #[serde(default)]
    pub params: serde_json::Map<String, serde_json::Value>,
    /// Extra attempts after a failed invocation (retry-until).
    #[serde(default)]
    pub retries: u32,
    /// Fixed pause between attempts.
    #[serde(default = "default_delay")]
    pub delay_secs: u64,
    /// When true, exhausted retries mark the task failed-but-ignored
    /// instead of aborting the sequence.
    #[serde(default)]
    pub ignore_errors: bool,
    /// Overrides the verb-based mutating classification.
    #[serde(default)]
    pub mutating: Option<bool>,
}

impl TaskSpec {
    /// Whether executing this task would mutate remote state.
    #[must_use]
    pub fn mutates(&self) -> bool {
        self.mutating.unwrap_or_else(|| is_mutating(&self.operation))
    }
}

/// A named sequence of tasks plus best-effort cleanup tasks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskSequence {
    /// Sequence name; doubles as the default recording session name.
    pub name: String,
    /// Grouped default parameters merged into every task invocation.
    /// Explicit configuration, not ambient state: task-level keys win.
    #[serde(default)]
    pub defaults: serde_json::Map<String, serde_json::Value>,
    /// Main tasks, executed in order until the first hard failure.
    pub tasks: Vec<TaskSpec>,
    /// Teardown tasks, always executed, errors reported and swallowed.
    #[serde(default)]
    pub cleanup: Vec<TaskSpec>,
}

impl TaskSequence {
    /// Loads a sequence from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read sequence file {}: {e}", path.display()))?;
        serde_yaml::from_str(&content)
            .map_err(|e| format!("Failed to parse sequence file {}: {e}", path.display()))
    }
}

/// Action verbs that mutate remote state.
const MUTATING_VERBS: &[&str] = &[
    "Attach", "Create", "Delete", "Detach", "Modify", "Put", "Reboot", "Register", "Run", "Set",
    "Start", "Stop", "Tag", "Terminate", "Untag", "Update",
];

/// Classifies an operation as mutating by its action verb.
///
/// `"ec2:DescribeInstances"` is read-only; `"ec2:TerminateInstances"`
/// mutates. Tasks can override the classification via [`TaskSpec::mutating`].
#[must_use]
pub fn is_mutating(operation: &str) -> bool {
    let action = operation.rsplit(':').next().unwrap_or(operation);
    MUTATING_VERBS.iter().any(|verb| action.starts_with(verb))
}

fn default_delay() -> u64 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_actions_by_verb() {
        assert!(is_mutating("ec2:TerminateInstances"));
        assert!(is_mutating("iam:DeleteRole"));
        assert!(is_mutating("ec2:CreateVpc"));
        assert!(!is_mutating("ec2:DescribeInstances"));
        assert!(!is_mutating("sts:GetCallerIdentity"));
        assert!(!is_mutating("s3:ListBuckets"));
    }

    #[test]
    fn mutating_override_wins_over_the_verb() {
        let yaml = "
name: custom
operation: ec2:DescribeInstances
mutating: true
";
        let task: TaskSpec = serde_yaml::from_str(yaml).unwrap();
        assert!(task.mutates());
    }

    #[test]
    fn sequence_parses_with_defaults_and_cleanup() {
        let yaml = "
name: ec2-smoke
defaults:
  Region: us-east-1
tasks:
  - name: who am i
    operation: sts:GetCallerIdentity
  - name: launch
    operation: ec2:RunInstances
    params:
      ImageId: ami-12345678
cleanup:
  - name: terminate
    operation: ec2:TerminateInstances
    retries: 10
    delay_secs: 0
    ignore_errors: true
";
        let sequence: TaskSequence = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(sequence.name, "ec2-smoke");
        assert_eq!(sequence.defaults["Region"], "us-east-1");
        assert_eq!(sequence.tasks.len(), 2);
        assert_eq!(sequence.tasks[0].retries, 0);
        assert_eq!(sequence.tasks[0].delay_secs, 1);
        assert_eq!(sequence.cleanup[0].retries, 10);
        assert!(sequence.cleanup[0].ignore_errors);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = TaskSequence::load(Path::new("/nonexistent/seq.yaml")).unwrap_err();
        assert!(err.contains("Failed to read sequence file"));
    }
}
