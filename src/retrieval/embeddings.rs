use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::config::Config;

#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("API error: {0}")]
    Api(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("configuration error: {0}")]
    Config(String),
}

fn map_reqwest_err(err: reqwest::Error) -> EmbeddingError {
    if err.is_timeout() {
        EmbeddingError::Timeout(err.to_string())
    } else {
        EmbeddingError::Api(err.to_string())
    }
}

/// Maps text to a fixed-dimension vector. The same provider instance must be
/// used at index-build time and query time for distances to be comparable.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    fn dimensions(&self) -> usize;

    fn model_name(&self) -> &str;
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingResponse {
    data: Vec<OpenAiEmbeddingData>,
}

/// OpenAI-compatible `/embeddings` client.
#[derive(Debug)]
pub struct OpenAiEmbeddings {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    dimensions: usize,
}

impl OpenAiEmbeddings {
    pub fn new(
        base_url: &str,
        api_key: &str,
        model: &str,
        timeout: Duration,
    ) -> Result<Self, EmbeddingError> {
        let dimensions = match model {
            "text-embedding-3-small" => 1536,
            "text-embedding-3-large" => 3072,
            "text-embedding-ada-002" => 1536,
            _ => 1536,
        };

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EmbeddingError::Config(format!("failed to build HTTP client: {}", e)))?;

        info!(
            "Initialized OpenAI embeddings: model={}, dimensions={}",
            model, dimensions
        );

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            dimensions,
        })
    }

    async fn request(&self, input: Vec<String>) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({
                "model": self.model,
                "input": input,
            }))
            .send()
            .await
            .map_err(map_reqwest_err)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api(format!(
                "embeddings request failed: {} - {}",
                status, body
            )));
        }

        let parsed: OpenAiEmbeddingResponse = response.json().await.map_err(map_reqwest_err)?;

        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for OpenAiEmbeddings {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut embeddings = self.request(vec![text.to_string()]).await?;
        embeddings
            .pop()
            .ok_or_else(|| EmbeddingError::Api("empty embedding response".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let embeddings = self.request(texts.to_vec()).await?;
        if embeddings.len() != texts.len() {
            return Err(EmbeddingError::Api(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                embeddings.len()
            )));
        }
        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Deserialize)]
struct OllamaEmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Ollama `/api/embed` client. The default `all-minilm` model keeps the
/// all-MiniLM-L6-v2 behavior reachable through a local daemon, without auth.
#[derive(Debug)]
pub struct OllamaEmbeddings {
    client: reqwest::Client,
    base_url: String,
    model: String,
    dimensions: usize,
}

impl OllamaEmbeddings {
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self, EmbeddingError> {
        let dimensions = match model {
            "all-minilm" => 384,
            "nomic-embed-text" => 768,
            "mxbai-embed-large" => 1024,
            _ => 384,
        };

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EmbeddingError::Config(format!("failed to build HTTP client: {}", e)))?;

        info!(
            "Initialized Ollama embeddings: model={}, dimensions={}",
            model, dimensions
        );

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            dimensions,
        })
    }

    async fn request(&self, input: Vec<String>) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let response = self
            .client
            .post(format!("{}/api/embed", self.base_url))
            .json(&json!({
                "model": self.model,
                "input": input,
            }))
            .send()
            .await
            .map_err(map_reqwest_err)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api(format!(
                "embed request failed: {} - {}",
                status, body
            )));
        }

        let parsed: OllamaEmbedResponse = response.json().await.map_err(map_reqwest_err)?;

        Ok(parsed.embeddings)
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for OllamaEmbeddings {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut embeddings = self.request(vec![text.to_string()]).await?;
        embeddings
            .pop()
            .ok_or_else(|| EmbeddingError::Api("empty embedding response".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let embeddings = self.request(texts.to_vec()).await?;
        if embeddings.len() != texts.len() {
            return Err(EmbeddingError::Api(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                embeddings.len()
            )));
        }
        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Create the embedding provider selected by `EMBEDDING_ENGINE`.
pub fn embedding_provider_from_config(
    config: &Config,
) -> Result<Arc<dyn EmbeddingProvider>, EmbeddingError> {
    let timeout = Duration::from_secs(config.upstream_timeout_secs);

    match config.embedding_engine.as_str() {
        "openai" => {
            let api_key = config.embedding_api_key.as_deref().ok_or_else(|| {
                EmbeddingError::Config(
                    "EMBEDDING_API_KEY (or OPENAI_API_KEY) is required for the openai embedding engine"
                        .to_string(),
                )
            })?;
            let provider = OpenAiEmbeddings::new(
                &config.embedding_api_base_url,
                api_key,
                &config.embedding_model,
                timeout,
            )?;
            Ok(Arc::new(provider))
        }
        "ollama" => {
            let provider = OllamaEmbeddings::new(
                &config.embedding_api_base_url,
                &config.embedding_model,
                timeout,
            )?;
            Ok(Arc::new(provider))
        }
        other => Err(EmbeddingError::Config(format!(
            "Unsupported embedding engine: {}. Supported: openai, ollama",
            other
        ))),
    }
}
