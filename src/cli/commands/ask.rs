//! Ask command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::qa::QaEngine;
use crate::transcript::{TranscriptSource, YoutubeTranscriptSource};
use anyhow::Result;

/// Run the ask command: fetch the transcript, index it, answer the question.
pub async fn run_ask(
    url: &str,
    question: &str,
    top_k: Option<u32>,
    model: Option<String>,
    mut settings: Settings,
) -> Result<()> {
    if let Some(k) = top_k {
        settings.rag.top_k = k;
    }
    if let Some(model) = model {
        settings.generation.model = model;
    }
    settings.validate()?;

    let engine = QaEngine::new(&settings)?;
    let source = YoutubeTranscriptSource::new();

    let spinner = Output::spinner("Fetching transcript...");
    let fetched = match source.fetch(url).await {
        Ok(fetched) => fetched,
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to fetch transcript: {}", e));
            return Err(e.into());
        }
    };

    spinner.set_message("Indexing transcript...");
    let chunks = match engine.load(&fetched.text).await {
        Ok(chunks) => chunks,
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to index transcript: {}", e));
            return Err(e.into());
        }
    };

    spinner.set_message("Generating answer...");
    match engine.answer(question).await {
        Ok(answer) => {
            spinner.finish_and_clear();
            println!("\n{}\n", answer);
            Output::kv("Video", &fetched.video_id);
            Output::kv("Chunks indexed", &chunks.to_string());
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to generate answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
