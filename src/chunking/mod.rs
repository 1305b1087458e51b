//! Fixed-window text chunking for breaking transcripts into retrieval units.

use crate::error::{Result, SvarError};
use serde::{Deserialize, Serialize};

/// A chunk of transcript text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextChunk {
    /// Text content of this chunk.
    pub content: String,
    /// Start offset in the source text, in characters.
    pub start_offset: usize,
    /// Order of this chunk in the transcript.
    pub order: usize,
}

/// Split text into overlapping windows of `size` characters.
///
/// Each window after the first starts `size - overlap` characters after the
/// previous one; the final chunk may be shorter than `size`. Offsets count
/// Unicode scalar values, not bytes. Empty input yields an empty vec.
pub fn split(text: &str, size: usize, overlap: usize) -> Result<Vec<TextChunk>> {
    if size == 0 {
        return Err(SvarError::Config("chunk size must be positive".to_string()));
    }
    if overlap >= size {
        return Err(SvarError::Config(format!(
            "chunk overlap ({}) must be smaller than chunk size ({})",
            overlap, size
        )));
    }

    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return Ok(Vec::new());
    }

    let step = size - overlap;
    let mut chunks = Vec::new();
    let mut start = 0;

    loop {
        let end = (start + size).min(chars.len());
        chunks.push(TextChunk {
            content: chars[start..end].iter().collect(),
            start_offset: start,
            order: chunks.len(),
        });
        if end == chars.len() {
            break;
        }
        start += step;
    }

    Ok(chunks)
}
