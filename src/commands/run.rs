//! `run` command: execute a sequence live, optionally recording it.

use std::env;
use std::path::Path;

use super::{print_outcomes, RECORD_ENV};
use crate::context::HarnessContext;
use crate::tasks::{run_sequence, RunOptions, TaskSequence};

/// Runs a sequence against the live endpoint. When [`RECORD_ENV`] names a
/// directory, the session is recorded there and finished into a scrubbed,
/// compressed archive.
///
/// # Errors
///
/// Returns an error if the sequence cannot be loaded, the context cannot
/// be built, a task fails hard, or a recording session cannot be finished.
pub fn run(sequence_path: &Path, check: bool, prefix: Option<String>) -> Result<(), String> {
    let sequence = TaskSequence::load(sequence_path)?;
    let options = RunOptions::new(check, prefix);

    let ctx = if let Ok(dir) = env::var(RECORD_ENV) {
        HarnessContext::recording(Path::new(&dir), &sequence.name)?
    } else {
        HarnessContext::live()?
    };

    // Finish the session even when the run failed; the first task failure
    // still wins as the reported error.
    let run_result = run_sequence(ctx.client.as_ref(), &sequence, &options);
    let finish_result = ctx.finish();

    match &finish_result {
        Ok(Some(archive_path)) => eprintln!("Recording saved to: {}", archive_path.display()),
        Ok(None) => {}
        Err(finish_err) if run_result.is_err() => {
            // The run error is about to take precedence; the operator
            // still has to learn the session was left unarchived and
            // unscrubbed on disk.
            eprintln!("Warning: recording session not archived: {finish_err}");
        }
        Err(_) => {}
    }

    let outcomes = run_result?;
    finish_result?;
    print_outcomes(&outcomes);
    Ok(())
}
