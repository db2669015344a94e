//! Executes a task sequence against an `ApiClient` and interprets results.

use std::thread;
use std::time::Duration;

use serde::Serialize;
use uuid::Uuid;

use super::{TaskSequence, TaskSpec};
use crate::client::{ApiClient, ApiRequest};

/// Placeholder substituted in string parameters with the run's resource
/// prefix, so concurrent targets operate on disjoint resource names.
pub const PREFIX_PLACEHOLDER: &str = "{prefix}";

/// Options for one sequence run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Dry-run mode: mutating operations report their would-be effect
    /// without being invoked.
    pub check_mode: bool,
    /// Unique prefix substituted for [`PREFIX_PLACEHOLDER`].
    pub resource_prefix: String,
}

impl RunOptions {
    /// Builds options, generating a unique prefix when none is given.
    #[must_use]
    pub fn new(check_mode: bool, resource_prefix: Option<String>) -> Self {
        Self { check_mode, resource_prefix: resource_prefix.unwrap_or_else(generated_prefix) }
    }
}

/// A unique per-run resource prefix (`ct-` plus eight hex characters).
#[must_use]
pub fn generated_prefix() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("ct-{}", &id[..8])
}

/// The interpreted result of one task.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TaskOutcome {
    /// Task name from the sequence.
    pub task: String,
    /// Operation the task invoked.
    pub operation: String,
    /// Whether remote state changed (or would change, in check mode).
    pub changed: bool,
    /// Whether the final attempt failed.
    pub failed: bool,
    /// Whether a failure was ignored per `ignore_errors`.
    pub ignored: bool,
    /// Returned attributes: the response body, or the would-be request in
    /// check mode.
    pub attributes: serde_json::Value,
}

/// Runs a sequence: main tasks in order until the first hard failure, then
/// cleanup tasks best-effort regardless of outcome.
///
/// # Errors
///
/// Returns the first hard task failure. Cleanup has still been attempted;
/// an aborted sequence is never reported as success.
pub fn run_sequence(
    client: &dyn ApiClient,
    sequence: &TaskSequence,
    options: &RunOptions,
) -> Result<Vec<TaskOutcome>, String> {
    let mut outcomes = Vec::with_capacity(sequence.tasks.len());
    let mut failure = None;

    for task in &sequence.tasks {
        match run_task(client, sequence, task, options) {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => {
                failure = Some(format!("Task {:?} failed: {e}", task.name));
                break;
            }
        }
    }

    for task in &sequence.cleanup {
        if let Err(e) = run_task(client, sequence, task, options) {
            eprintln!("Warning: cleanup task {:?} failed: {e}", task.name);
        }
    }

    match failure {
        Some(e) => Err(e),
        None => Ok(outcomes),
    }
}

/// Runs one task with merged parameters and bounded retries.
fn run_task(
    client: &dyn ApiClient,
    sequence: &TaskSequence,
    task: &TaskSpec,
    options: &RunOptions,
) -> Result<TaskOutcome, String> {
    let params = merged_params(sequence, task, options);
    let mutates = task.mutates();

    if options.check_mode && mutates {
        // Would-be effect reported, no call issued.
        return Ok(TaskOutcome {
            task: task.name.clone(),
            operation: task.operation.clone(),
            changed: true,
            failed: false,
            ignored: false,
            attributes: serde_json::Value::Object(params),
        });
    }

    let request = ApiRequest::new(&task.operation, serde_json::Value::Object(params));
    let mut attempt = 0;
    loop {
        match client.invoke(&request) {
            Ok(response) => {
                return Ok(TaskOutcome {
                    task: task.name.clone(),
                    operation: task.operation.clone(),
                    changed: mutates,
                    failed: false,
                    ignored: false,
                    attributes: response.body,
                });
            }
            Err(_) if attempt < task.retries => {
                attempt += 1;
                if task.delay_secs > 0 {
                    thread::sleep(Duration::from_secs(task.delay_secs));
                }
            }
            Err(e) if task.ignore_errors => {
                return Ok(TaskOutcome {
                    task: task.name.clone(),
                    operation: task.operation.clone(),
                    changed: false,
                    failed: true,
                    ignored: true,
                    attributes: serde_json::json!({"error": e.to_string()}),
                });
            }
            Err(e) => return Err(e.to_string()),
        }
    }
}

/// Defaults merged under task params (task keys win), with the resource
/// prefix substituted into every string value.
fn merged_params(
    sequence: &TaskSequence,
    task: &TaskSpec,
    options: &RunOptions,
) -> serde_json::Map<String, serde_json::Value> {
    let mut merged = sequence.defaults.clone();
    for (key, value) in &task.params {
        merged.insert(key.clone(), value.clone());
    }
    for value in merged.values_mut() {
        substitute_prefix(value, &options.resource_prefix);
    }
    merged
}

/// Replaces the prefix placeholder in every string inside `value`.
fn substitute_prefix(value: &mut serde_json::Value, prefix: &str) {
    match value {
        serde_json::Value::String(s) => {
            if s.contains(PREFIX_PLACEHOLDER) {
                *s = s.replace(PREFIX_PLACEHOLDER, prefix);
            }
        }
        serde_json::Value::Array(items) => {
            for item in items {
                substitute_prefix(item, prefix);
            }
        }
        serde_json::Value::Object(map) => {
            for item in map.values_mut() {
                substitute_prefix(item, prefix);
            }
        }
        _ => {}
    }
}
