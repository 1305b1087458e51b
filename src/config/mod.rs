//! Configuration module for Svar.
//!
//! Handles loading and validating application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::QaPrompts;
pub use settings::{
    EmbeddingSettings, GeneralSettings, GenerationSettings, RagSettings, ServerSettings, Settings,
};
