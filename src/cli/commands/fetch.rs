//! Fetch command implementation.

use crate::cli::Output;
use crate::transcript::{TranscriptSource, YoutubeTranscriptSource};
use anyhow::Result;

/// Run the fetch command: print a video's transcript to stdout.
pub async fn run_fetch(url: &str) -> Result<()> {
    let source = YoutubeTranscriptSource::new();

    let spinner = Output::spinner("Fetching transcript...");
    match source.fetch(url).await {
        Ok(fetched) => {
            spinner.finish_and_clear();
            println!("{}", fetched.text);
            if let Some(offset) = fetched.start_offset_seconds {
                Output::kv("Start offset", &format!("{}s", offset));
            }
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to fetch transcript: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
