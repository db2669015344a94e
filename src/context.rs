//! Wires an `ApiClient` for the selected execution mode.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::adapters::{LiveApiClient, RecordingApiClient, ReplayingApiClient};
use crate::client::{caller_identity, local_username, ApiClient};
use crate::fixture::recorder::FixtureRecorder;
use crate::fixture::scrub::identity_rules;

/// The active client for one harness run, plus whatever the mode needs at
/// session end (the recorder, and a live handle for the identity lookup).
pub struct HarnessContext {
    /// Client every task invocation goes through.
    pub client: Box<dyn ApiClient>,
    live: Option<Arc<dyn ApiClient>>,
    recorder: Option<Arc<Mutex<FixtureRecorder>>>,
}

impl HarnessContext {
    /// Live mode: dispatch straight to the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint configuration is incomplete.
    pub fn live() -> Result<Self, String> {
        Ok(Self::with_client(Box::new(LiveApiClient::from_env()?)))
    }

    /// Wraps an arbitrary client with no recording (used by tests).
    #[must_use]
    pub fn with_client(client: Box<dyn ApiClient>) -> Self {
        Self { client, live: None, recorder: None }
    }

    /// Record mode over the environment-configured live client.
    ///
    /// # Errors
    ///
    /// Returns an error if the live client cannot be configured or the
    /// recorder refuses to start.
    pub fn recording(dir: &Path, session: &str) -> Result<Self, String> {
        Self::recording_with(Arc::new(LiveApiClient::from_env()?), dir, session)
    }

    /// Record mode over an injected inner client.
    ///
    /// # Errors
    ///
    /// Returns an error if the recorder refuses to start (stale directory,
    /// splitting-harness environment).
    pub fn recording_with(
        inner: Arc<dyn ApiClient>,
        dir: &Path,
        session: &str,
    ) -> Result<Self, String> {
        let recorder = Arc::new(Mutex::new(FixtureRecorder::begin(dir, session)?));
        Ok(Self {
            client: Box::new(RecordingApiClient::new(Arc::clone(&inner), Arc::clone(&recorder))),
            live: Some(inner),
            recorder: Some(recorder),
        })
    }

    /// Replay mode over a compressed fixture archive.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive cannot be read or parsed.
    pub fn replaying(archive: &Path) -> Result<Self, String> {
        Ok(Self {
            client: Box::new(ReplayingApiClient::load(archive)?),
            live: None,
            recorder: None,
        })
    }

    /// Ends the run. In record mode: look up the caller identity through
    /// the live client, scrub every fixture file, compress the session into
    /// an archive, and return its path. Other modes return `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the identity lookup fails (an unscrubbed archive
    /// is never produced) or the recorder cannot finish.
    pub fn finish(self) -> Result<Option<PathBuf>, String> {
        let Self { client, live, recorder } = self;
        // Drop the recording client first so the recorder Arc is unique.
        drop(client);

        let Some(recorder) = recorder else {
            return Ok(None);
        };
        let live = live.ok_or_else(|| "Recording context lost its live client".to_string())?;
        let identity = caller_identity(live.as_ref())
            .map_err(|e| format!("Failed to read caller identity for scrubbing: {e}"))?;
        let rules = identity_rules(&identity, &local_username());

        let recorder = Arc::try_unwrap(recorder)
            .map_err(|_| "Recorder still has references at session end".to_string())?
            .into_inner()
            .map_err(|e| format!("Recorder lock poisoned: {e}"))?;
        recorder.finish(&rules).map(Some)
    }
}
