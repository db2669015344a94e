//! Command dispatch and handlers.

pub mod replay;
pub mod run;

use crate::cli::Command;
use crate::tasks::TaskOutcome;

/// Environment variable switching `run` into record mode. Its value is the
/// directory the session is recorded into. Developer-only: the recorder
/// refuses to start under the test-splitting harness.
pub const RECORD_ENV: &str = "CLOUDTAPE_RECORD";

/// Dispatch a parsed command to its handler.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch(command: &Command) -> Result<(), String> {
    match command {
        Command::Run { sequence, check, prefix } => run::run(sequence, *check, prefix.clone()),
        Command::Replay { sequence, archive, check } => replay::run(sequence, archive, *check),
    }
}

/// Prints one summary line per task outcome.
pub(crate) fn print_outcomes(outcomes: &[TaskOutcome]) {
    for outcome in outcomes {
        let status = if outcome.ignored {
            "ignored"
        } else if outcome.changed {
            "changed"
        } else {
            "ok"
        };
        println!("{status:>8}  {} ({})", outcome.task, outcome.operation);
    }
}
