//! Binary entrypoint for the `cloudtape` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    // Endpoint and credential variables may come from a generated .env
    // next to the test target; absence is fine.
    dotenvy::dotenv().ok();

    match cloudtape::run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
