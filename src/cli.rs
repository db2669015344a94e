//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI parser for `cloudtape`.
#[derive(Debug, Parser)]
#[command(name = "cloudtape", version, about = "Record and replay cloud API test sequences")]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a task sequence against the live endpoint. Setting
    /// `CLOUDTAPE_RECORD=<dir>` records the session into a fixture archive.
    Run {
        /// Path to the sequence YAML file.
        sequence: PathBuf,
        /// Check mode: report would-be effects without mutating anything.
        #[arg(long)]
        check: bool,
        /// Resource prefix override (a unique one is generated otherwise).
        #[arg(long)]
        prefix: Option<String>,
    },
    /// Replay a task sequence from a recorded fixture archive.
    Replay {
        /// Path to the sequence YAML file.
        sequence: PathBuf,
        /// Path to the compressed fixture archive.
        #[arg(long)]
        archive: PathBuf,
        /// Check mode: report would-be effects without mutating anything.
        #[arg(long)]
        check: bool,
    },
}
