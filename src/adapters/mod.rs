//! `ApiClient` variants: live HTTP dispatch, passthrough-and-record, and
//! archive-backed replay.

pub mod live;
pub mod recording;
pub mod replaying;

pub use live::LiveApiClient;
pub use recording::RecordingApiClient;
pub use replaying::ReplayingApiClient;
