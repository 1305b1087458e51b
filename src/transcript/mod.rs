//! Transcript source boundary.
//!
//! A transcript source turns a video URL into plain caption text. The rest
//! of the pipeline only sees this trait; "no transcript" is always a typed
//! error, never an empty result.

mod youtube;

pub use youtube::YoutubeTranscriptSource;

use crate::error::Result;
use async_trait::async_trait;

/// A fetched transcript with its source metadata.
#[derive(Debug, Clone)]
pub struct FetchedTranscript {
    /// Parsed video identifier.
    pub video_id: String,
    /// Full caption text, one string.
    pub text: String,
    /// Playback offset from the URL's `t=` parameter, if present.
    pub start_offset_seconds: Option<u64>,
}

/// Trait for transcript retrieval from a video URL.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch the transcript for a video URL.
    ///
    /// Fails with `InvalidUrl` if no video id is parseable and with
    /// `TranscriptUnavailable` if the video has no captions.
    async fn fetch(&self, url: &str) -> Result<FetchedTranscript>;
}
