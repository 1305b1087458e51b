//! Context assembly from retrieved chunks.

use crate::index::ScoredChunk;

/// Join retrieved chunk texts into the context block of the prompt.
///
/// Chunks appear best-first, separated so the model can tell excerpts
/// apart. Retrieval order is deterministic, so the rendered context is too.
pub fn format_context(chunks: &[ScoredChunk]) -> String {
    chunks
        .iter()
        .map(|chunk| chunk.content.trim())
        .collect::<Vec<_>>()
        .join("\n---\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(content: &str, order: usize) -> ScoredChunk {
        ScoredChunk {
            content: content.to_string(),
            order,
            score: 0.5,
        }
    }

    #[test]
    fn test_format_context_joins_chunks() {
        let context = format_context(&[scored("first excerpt", 0), scored("second excerpt", 3)]);
        assert_eq!(context, "first excerpt\n---\nsecond excerpt");
    }

    #[test]
    fn test_format_context_empty() {
        assert_eq!(format_context(&[]), "");
    }
}
