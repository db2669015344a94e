//! Records API calls into per-operation sequence files, then archives them.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use super::archive::{self, ARCHIVE_SUFFIX, SEQUENCE_SUFFIX};
use super::format::{OperationLog, RecordedCall};
use super::scrub::{self, ScrubRule};

/// Environment variable set by the outer test-splitting harness.
///
/// Recording must be invoked directly; the splitting harness sets up an
/// environment incompatible with raw capture, so the recorder refuses to
/// start when this variable is present.
pub const HARNESS_GUARD_ENV: &str = "CLOUDTAPE_TEST_SHARD";

/// Captures one recording session into a directory of sequence files.
///
/// Each distinct operation name gets one `<Action>.calls.yaml` file;
/// repeated calls to the same operation accumulate there in call order.
/// [`FixtureRecorder::finish`] scrubs, compresses, and removes the
/// directory, leaving a single archive artifact.
#[derive(Debug)]
pub struct FixtureRecorder {
    output_dir: PathBuf,
    session: String,
    started_at: DateTime<Utc>,
    next_index: u64,
    logs: BTreeMap<String, OperationLog>,
}

impl FixtureRecorder {
    /// Starts a recording session writing into `output_dir`.
    ///
    /// # Errors
    ///
    /// Refuses, before any side effect, if:
    /// - `output_dir` already exists (a stale recording must be removed
    ///   manually rather than overwritten or merged);
    /// - [`HARNESS_GUARD_ENV`] is set in the environment;
    /// - the directory cannot be created.
    pub fn begin(
        output_dir: impl Into<PathBuf>,
        session: impl Into<String>,
    ) -> Result<Self, String> {
        let output_dir = output_dir.into();

        harness_guard(env::var_os(HARNESS_GUARD_ENV).is_some())?;
        if output_dir.exists() {
            return Err(format!(
                "Recording directory already exists: {} — remove the stale recording first",
                output_dir.display()
            ));
        }
        fs::create_dir_all(&output_dir)
            .map_err(|e| format!("Failed to create recording directory: {e}"))?;

        Ok(Self {
            output_dir,
            session: session.into(),
            started_at: Utc::now(),
            next_index: 0,
            logs: BTreeMap::new(),
        })
    }

    /// Appends one call to its operation's sequence file.
    ///
    /// The call index is assigned automatically and is strictly increasing
    /// across the whole session, regardless of operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the sequence file cannot be rewritten.
    pub fn record(
        &mut self,
        operation: &str,
        request: serde_json::Value,
        response: serde_json::Value,
        metadata: serde_json::Value,
    ) -> Result<(), String> {
        let call = RecordedCall {
            call_index: self.next_index,
            operation: operation.to_string(),
            request,
            response,
            metadata,
        };
        self.next_index += 1;

        let log = self
            .logs
            .entry(operation.to_string())
            .or_insert_with(|| OperationLog { operation: operation.to_string(), calls: Vec::new() });
        log.calls.push(call);

        let yaml = serde_yaml::to_string(log)
            .map_err(|e| format!("Failed to serialize sequence for {operation}: {e}"))?;
        let path = self.output_dir.join(sequence_file_name(operation));
        fs::write(&path, yaml)
            .map_err(|e| format!("Failed to write sequence file {}: {e}", path.display()))
    }

    /// Ends the session: scrub every fixture file, compress the directory
    /// into `<session>.fixture.yaml.gz` next to it, and delete the
    /// uncompressed directory. Returns the archive path.
    ///
    /// # Errors
    ///
    /// Returns an error if scrubbing, packing, or directory removal fails.
    pub fn finish(self, rules: &[ScrubRule]) -> Result<PathBuf, String> {
        scrub::scrub_dir(&self.output_dir, rules)?;

        let parent = self.output_dir.parent().map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        let dest = parent.join(format!("{}{ARCHIVE_SUFFIX}", self.session));
        archive::pack(&self.output_dir, &self.session, self.started_at, &dest)?;

        fs::remove_dir_all(&self.output_dir).map_err(|e| {
            format!("Failed to remove recording directory {}: {e}", self.output_dir.display())
        })?;
        Ok(dest)
    }
}

/// File name for one operation's sequence file (`:` is not portable in
/// file names, so it is flattened to `_`).
fn sequence_file_name(operation: &str) -> String {
    format!("{}{SEQUENCE_SUFFIX}", operation.replace(':', "_"))
}

/// Rejects recording when the outer test-splitting harness is detected.
fn harness_guard(harness_env_set: bool) -> Result<(), String> {
    if harness_env_set {
        return Err(format!(
            "Recording must be invoked directly: {HARNESS_GUARD_ENV} is set, which means \
             this process is running under the test-splitting harness"
        ));
    }
    Ok(())
}
