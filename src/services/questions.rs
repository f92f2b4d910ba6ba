use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::retrieval::embeddings::EmbeddingProvider;
use crate::retrieval::store::VectorStore;
use crate::services::generation::{build_prompt, TextGenerator};
use crate::services::parser::{parse_questions, ParsedQuestions};

/// Result of one generation request; serializes directly as the success body.
#[derive(Debug, Serialize)]
pub struct GeneratedQuestions {
    pub course_outcome: String,
    pub bloom_level: String,
    pub questions: ParsedQuestions,
    pub raw_text: String,
}

/// Orchestrates one request: embed the course outcome, retrieve the nearest
/// chunk, prompt the generator, parse the reply.
pub struct QuestionService {
    embedder: Arc<dyn EmbeddingProvider>,
    generator: Arc<dyn TextGenerator>,
    top_k: usize,
}

impl QuestionService {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        generator: Arc<dyn TextGenerator>,
        top_k: usize,
    ) -> Self {
        Self {
            embedder,
            generator,
            top_k: top_k.max(1),
        }
    }

    pub async fn generate(
        &self,
        store: &VectorStore,
        course_outcome: &str,
        bloom_level: &str,
    ) -> AppResult<GeneratedQuestions> {
        let query_embedding = self.embedder.embed(course_outcome).await?;

        let results = store.search(&query_embedding, self.top_k);
        // The store constructor rejects empty stores and top_k is >= 1, so
        // rank 0 always exists.
        let best = results
            .first()
            .ok_or_else(|| AppError::Internal("retrieval returned no chunks".to_string()))?;
        debug!(
            "Retrieved chunk {} at distance {:.4}",
            best.index, best.distance
        );

        let prompt = build_prompt(&best.text, course_outcome, bloom_level);
        let raw_text = self.generator.generate(&prompt).await?;

        let questions = parse_questions(&raw_text);
        info!(
            "Generated {} objective and {} subjective questions",
            questions.objective.len(),
            questions.subjective.len()
        );

        Ok(GeneratedQuestions {
            course_outcome: course_outcome.to_string(),
            bloom_level: bloom_level.to_string(),
            questions,
            raw_text,
        })
    }
}
