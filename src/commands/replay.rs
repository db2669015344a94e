//! `replay` command: execute a sequence from a recorded archive.

use std::path::Path;

use super::print_outcomes;
use crate::context::HarnessContext;
use crate::tasks::{run_sequence, RunOptions, TaskSequence};

/// Replays a sequence from a fixture archive. No network access: every
/// call is served from the recording, and a call the recording does not
/// cover fails the run. Recorded calls the sequence never issues are
/// ignored.
///
/// # Errors
///
/// Returns an error if the sequence or archive cannot be loaded, or
/// playback hits an unexpected call.
pub fn run(sequence_path: &Path, archive_path: &Path, check: bool) -> Result<(), String> {
    let sequence = TaskSequence::load(sequence_path)?;
    let options = RunOptions::new(check, None);

    let ctx = HarnessContext::replaying(archive_path)?;
    let outcomes = run_sequence(ctx.client.as_ref(), &sequence, &options)?;
    print_outcomes(&outcomes);
    Ok(())
}
