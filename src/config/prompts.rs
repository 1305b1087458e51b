//! Prompt templates for answer generation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Prompts used when composing the generation request.
///
/// The user template is rendered with `{{context}}` and `{{question}}`.
/// The contract is fixed: answers must come solely from the provided
/// transcript context, stated concisely and without filler phrases.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QaPrompts {
    pub system: String,
    pub user: String,
}

impl Default for QaPrompts {
    fn default() -> Self {
        Self {
            system: "You are an expert in answering questions based on the content of \
                     YouTube videos. Use only the context provided to answer the user's \
                     question concisely, avoiding any introductory or filler phrases. \
                     If the context does not contain the answer, say so."
                .to_string(),

            user: r#"Context (from YouTube video):
{{context}}

Question: {{question}}

Answer:"#
                .to_string(),
        }
    }
}

impl QaPrompts {
    /// Render a template, replacing `{{name}}` placeholders.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }
}
