//! Fixture record/replay: capture API sessions, scrub them, play them back.

pub mod archive;
pub mod format;
pub mod player;
pub mod recorder;
pub mod scrub;
