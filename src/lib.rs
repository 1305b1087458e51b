//! Svar - YouTube Transcript Question Answering
//!
//! A CLI tool and HTTP service that answers questions about YouTube videos
//! using retrieval-augmented generation over the video's transcript.
//!
//! The name "Svar" comes from the Norwegian/Scandinavian word for "answer."
//!
//! # Overview
//!
//! Svar allows you to:
//! - Fetch the transcript of a YouTube video from its URL
//! - Chunk and embed the transcript into an in-memory vector index
//! - Ask free-form questions and get answers grounded in the transcript
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration and prompt templates
//! - `transcript` - Transcript source boundary (YouTube)
//! - `chunking` - Fixed-window overlapping text chunking
//! - `embedding` - Embedding generation
//! - `index` - Immutable in-memory vector index
//! - `generation` - LLM answer generation with retry
//! - `qa` - Question-answering engine (load/answer state machine)
//!
//! # Example
//!
//! ```rust,no_run
//! use svar::config::Settings;
//! use svar::qa::QaEngine;
//! use svar::transcript::{TranscriptSource, YoutubeTranscriptSource};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let engine = QaEngine::new(&settings)?;
//!
//!     let source = YoutubeTranscriptSource::new();
//!     let fetched = source.fetch("https://www.youtube.com/watch?v=dQw4w9WgXcQ").await?;
//!
//!     engine.load(&fetched.text).await?;
//!     let answer = engine.answer("What is this video about?").await?;
//!     println!("{}", answer);
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod index;
pub mod qa;
pub mod transcript;

pub use error::{Result, SvarError};
