//! The QA engine state machine.

use super::context::format_context;
use crate::chunking;
use crate::config::{QaPrompts, Settings};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{Result, SvarError};
use crate::generation::{Generator, OpenAIGenerator};
use crate::index::VectorIndex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

/// Observable engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QaState {
    /// No transcript loaded yet.
    Empty,
    /// A transcript is indexed and questions can be answered.
    Ready,
}

/// Question-answering engine.
///
/// Holds the single current vector index. `load` replaces it atomically
/// under a write lock; concurrent `answer` calls share read access to the
/// immutable index, so readers never block each other.
pub struct QaEngine {
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn Generator>,
    prompts: QaPrompts,
    chunk_size: usize,
    chunk_overlap: usize,
    top_k: usize,
    index: RwLock<Option<Arc<VectorIndex>>>,
}

impl QaEngine {
    /// Create an engine with OpenAI-backed components from settings.
    pub fn new(settings: &Settings) -> Result<Self> {
        settings.validate()?;

        let timeout = settings.generation.timeout_seconds.map(Duration::from_secs);
        let prompts = QaPrompts::default();
        let embedder = Arc::new(OpenAIEmbedder::new(
            &settings.embedding.model,
            settings.embedding.dimensions as usize,
            timeout,
        ));
        let generator = Arc::new(OpenAIGenerator::new(&settings.generation, &prompts));

        Ok(Self::with_components(settings, prompts, embedder, generator))
    }

    /// Create an engine with injected components.
    pub fn with_components(
        settings: &Settings,
        prompts: QaPrompts,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
    ) -> Self {
        Self {
            embedder,
            generator,
            prompts,
            chunk_size: settings.rag.chunk_size as usize,
            chunk_overlap: settings.rag.chunk_overlap as usize,
            top_k: settings.rag.top_k as usize,
            index: RwLock::new(None),
        }
    }

    /// Current state of the engine.
    pub async fn state(&self) -> QaState {
        if self.index.read().await.is_some() {
            QaState::Ready
        } else {
            QaState::Empty
        }
    }

    /// Chunk, embed, and index a transcript, replacing any prior index.
    ///
    /// The new index is built completely before the current one is swapped
    /// out; on any failure the prior index keeps serving answers. Returns
    /// the number of indexed chunks.
    #[instrument(skip(self, transcript), fields(transcript_len = transcript.len()))]
    pub async fn load(&self, transcript: &str) -> Result<usize> {
        if transcript.trim().is_empty() {
            return Err(SvarError::Validation("transcript is empty".to_string()));
        }

        let chunks = chunking::split(transcript, self.chunk_size, self.chunk_overlap)?;
        debug!("Split transcript into {} chunks", chunks.len());

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed(&texts).await?;

        let index = VectorIndex::build(chunks, embeddings)?;
        let count = index.len();

        // `load` calls serialize on the write lock; readers see either the
        // old index or the new one, never a partial state.
        *self.index.write().await = Some(Arc::new(index));

        info!("Indexed transcript ({} chunks)", count);
        Ok(count)
    }

    /// Answer a question from the loaded transcript.
    #[instrument(skip(self), fields(question = %question))]
    pub async fn answer(&self, question: &str) -> Result<String> {
        if question.trim().is_empty() {
            return Err(SvarError::Validation("question is empty".to_string()));
        }

        let index = self
            .index
            .read()
            .await
            .clone()
            .ok_or_else(|| SvarError::NotReady("no transcript loaded".to_string()))?;

        let query_embedding = self.embedder.embed_one(question).await?;
        let hits = index.search(&query_embedding, self.top_k)?;
        debug!("Retrieved {} chunks for question", hits.len());

        let mut vars = HashMap::new();
        vars.insert("context".to_string(), format_context(&hits));
        vars.insert("question".to_string(), question.to_string());
        let prompt = QaPrompts::render(&self.prompts.user, &vars);

        self.generator.generate(&prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Deterministic embedder: normalized letter-frequency vectors.
    struct LetterFrequencyEmbedder;

    fn letter_histogram(text: &str) -> Vec<f32> {
        let mut hist = vec![0.0f32; 26];
        for c in text.to_lowercase().chars() {
            if c.is_ascii_lowercase() {
                hist[(c as u8 - b'a') as usize] += 1.0;
            }
        }
        hist
    }

    #[async_trait]
    impl Embedder for LetterFrequencyEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|t| letter_histogram(t)).collect())
        }

        async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
            Ok(letter_histogram(text))
        }

        fn dimensions(&self) -> usize {
            26
        }
    }

    /// An embedder that always fails, for state-preservation tests.
    struct FailingEmbedder;

    #[async_trait]
    impl Embedder for FailingEmbedder {
        async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Err(SvarError::Embedding("backend down".to_string()))
        }

        async fn embed_one(&self, _text: &str) -> Result<Vec<f32>> {
            Err(SvarError::Embedding("backend down".to_string()))
        }

        fn dimensions(&self) -> usize {
            26
        }
    }

    /// Generator that records each received prompt and echoes a fixed answer.
    struct CapturingGenerator {
        prompts: Mutex<Vec<String>>,
    }

    impl CapturingGenerator {
        fn new() -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn received(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Generator for CapturingGenerator {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok("mock answer".to_string())
        }
    }

    fn engine_with(
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
        chunk_size: u32,
        chunk_overlap: u32,
        top_k: u32,
    ) -> QaEngine {
        let mut settings = Settings::default();
        settings.rag.chunk_size = chunk_size;
        settings.rag.chunk_overlap = chunk_overlap;
        settings.rag.top_k = top_k;
        QaEngine::with_components(&settings, QaPrompts::default(), embedder, generator)
    }

    fn mock_engine(chunk_size: u32, chunk_overlap: u32, top_k: u32) -> (QaEngine, Arc<CapturingGenerator>) {
        let generator = Arc::new(CapturingGenerator::new());
        let engine = engine_with(
            Arc::new(LetterFrequencyEmbedder),
            generator.clone(),
            chunk_size,
            chunk_overlap,
            top_k,
        );
        (engine, generator)
    }

    #[tokio::test]
    async fn test_answer_before_load_is_not_ready() {
        let (engine, _) = mock_engine(20, 5, 3);
        assert_eq!(engine.state().await, QaState::Empty);

        let result = engine.answer("anything?").await;
        assert!(matches!(result, Err(SvarError::NotReady(_))));
    }

    #[tokio::test]
    async fn test_load_empty_transcript_rejected() {
        let (engine, _) = mock_engine(20, 5, 3);
        assert!(matches!(engine.load("").await, Err(SvarError::Validation(_))));
        assert!(matches!(engine.load("   \n").await, Err(SvarError::Validation(_))));
        assert_eq!(engine.state().await, QaState::Empty);
    }

    #[tokio::test]
    async fn test_empty_question_rejected() {
        let (engine, _) = mock_engine(20, 5, 3);
        engine.load("some transcript text here").await.unwrap();
        assert!(matches!(engine.answer("  ").await, Err(SvarError::Validation(_))));
    }

    #[tokio::test]
    async fn test_load_then_answer_grounds_prompt_in_transcript() {
        let (engine, generator) = mock_engine(20, 5, 3);

        let count = engine
            .load("The cat sat on the mat. The mat was red.")
            .await
            .unwrap();
        assert_eq!(count, 3);
        assert_eq!(engine.state().await, QaState::Ready);

        let answer = engine.answer("What color was the mat?").await.unwrap();
        assert_eq!(answer, "mock answer");

        let prompts = generator.received();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Question: What color was the mat?"));
        // The retrieved context must contain the relevant transcript text.
        assert!(prompts[0].contains("mat was"));
        assert!(prompts[0].contains("red"));
    }

    #[tokio::test]
    async fn test_retrieval_is_idempotent() {
        let transcript = "The quick brown fox jumps over the lazy dog near the river bank.";
        let (engine, generator) = mock_engine(16, 4, 2);

        engine.load(transcript).await.unwrap();
        engine.answer("Where did the fox jump?").await.unwrap();

        engine.load(transcript).await.unwrap();
        engine.answer("Where did the fox jump?").await.unwrap();

        let prompts = generator.received();
        assert_eq!(prompts.len(), 2);
        assert_eq!(prompts[0], prompts[1]);
    }

    #[tokio::test]
    async fn test_reload_replaces_prior_index() {
        let (engine, generator) = mock_engine(100, 10, 5);

        engine.load("aardvarks eat ants all day long").await.unwrap();
        engine
            .load("zebras graze on grass in the savanna")
            .await
            .unwrap();

        engine.answer("what do they eat?").await.unwrap();
        let prompt = generator.received().pop().unwrap();
        assert!(prompt.contains("zebras"));
        assert!(!prompt.contains("aardvarks"));
    }

    #[tokio::test]
    async fn test_failed_load_preserves_prior_index() {
        let mut settings = Settings::default();
        settings.rag.chunk_size = 100;
        settings.rag.chunk_overlap = 10;
        settings.rag.top_k = 5;

        let generator = Arc::new(CapturingGenerator::new());
        let good = engine_with(
            Arc::new(LetterFrequencyEmbedder),
            generator.clone(),
            100,
            10,
            5,
        );
        good.load("penguins live in antarctica").await.unwrap();

        // Validation failure: state untouched.
        assert!(good.load("").await.is_err());
        assert_eq!(good.state().await, QaState::Ready);
        good.answer("where do penguins live?").await.unwrap();
        assert!(generator.received().pop().unwrap().contains("penguins"));

        // Pipeline failure inside load: state untouched too.
        let failing = QaEngine::with_components(
            &settings,
            QaPrompts::default(),
            Arc::new(FailingEmbedder),
            Arc::new(CapturingGenerator::new()),
        );
        assert!(matches!(
            failing.load("some text").await,
            Err(SvarError::Embedding(_))
        ));
        assert_eq!(failing.state().await, QaState::Empty);
    }

    #[tokio::test]
    async fn test_answer_propagates_embedding_failure() {
        let settings = Settings::default();
        let engine = QaEngine::with_components(
            &settings,
            QaPrompts::default(),
            Arc::new(FailingEmbedder),
            Arc::new(CapturingGenerator::new()),
        );
        assert!(matches!(
            engine.load("text").await,
            Err(SvarError::Embedding(_))
        ));
    }

    #[tokio::test]
    async fn test_concurrent_answers_share_index() {
        let (engine, generator) = mock_engine(20, 5, 2);
        let engine = Arc::new(engine);
        engine.load("concurrent readers share one index").await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let engine = engine.clone();
            handles.push(tokio::spawn(async move {
                engine.answer("who shares the index?").await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(generator.received().len(), 8);
    }
}
