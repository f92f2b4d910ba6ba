use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tracing::info;

use crate::config::Config;

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("API error: {0}")]
    Api(String),

    #[error("request timed out: {0}")]
    Timeout(String),
}

fn map_reqwest_err(err: reqwest::Error) -> GenerationError {
    if err.is_timeout() {
        GenerationError::Timeout(err.to_string())
    } else {
        GenerationError::Api(err.to_string())
    }
}

/// Instruction template for the question-generation request. The model is
/// asked for exactly two objective and two short-answer questions in the
/// two-section numbered format the parser expects.
pub const QUESTION_PROMPT_TEMPLATE: &str = "You are a Question Generator Agent.
Course Outcome (CO): {{COURSE_OUTCOME}}
Bloom's Taxonomy Level: {{BLOOM_LEVEL}}
Based on the content below, generate multiple questions:
- Two Objective Type Questions
- Two Short Answer Type Questions
Content:
{{CONTENT}}

Only output the questions in the following format:
Objective Questions:
1. <question 1>
2. <question 2>
Short Answer Questions:
1. <question 1>
2. <question 2>";

pub fn build_prompt(content: &str, course_outcome: &str, bloom_level: &str) -> String {
    QUESTION_PROMPT_TEMPLATE
        .replace("{{COURSE_OUTCOME}}", course_outcome)
        .replace("{{BLOOM_LEVEL}}", bloom_level)
        .replace("{{CONTENT}}", content)
}

/// Free-form text completion behind an opaque boundary.
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;

    fn model_name(&self) -> &str;
}

/// OpenAI-compatible `/chat/completions` client. The defaults point at
/// Google's OpenAI-compatible endpoint so `gemini-1.5-pro` works out of the
/// box, but any compatible server can be configured.
pub struct OpenAiChatGenerator {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiChatGenerator {
    pub fn new(
        base_url: &str,
        api_key: &str,
        model: &str,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerationError::Api(format!("failed to build HTTP client: {}", e)))?;

        info!("Initialized chat generator: model={}", model);

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl TextGenerator for OpenAiChatGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let payload = json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "stream": false
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(map_reqwest_err)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api(format!(
                "chat completion failed: {} - {}",
                status, body
            )));
        }

        let body: Value = response.json().await.map_err(map_reqwest_err)?;

        let content = body
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| {
                GenerationError::Api("chat completion response had no message content".to_string())
            })?;

        Ok(content.trim().to_string())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Create the generator from config. Missing credentials are a config error
/// surfaced to the caller, not a silently degraded client.
pub fn text_generator_from_config(config: &Config) -> anyhow::Result<Arc<dyn TextGenerator>> {
    let api_key = config.generation_api_key.as_deref().ok_or_else(|| {
        anyhow::anyhow!("GENERATION_API_KEY (or GOOGLE_API_KEY) is required for question generation")
    })?;

    let generator = OpenAiChatGenerator::new(
        &config.generation_api_base_url,
        api_key,
        &config.generation_model,
        Duration::from_secs(config.upstream_timeout_secs),
    )?;

    Ok(Arc::new(generator))
}
