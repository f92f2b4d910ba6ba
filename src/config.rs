use anyhow::Context;

/// Runtime configuration, loaded once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub cors_allow_origin: String,

    /// Plain-text corpus loaded into the vector store at startup.
    pub corpus_path: String,
    /// Soft chunk budget in characters.
    pub chunk_size: usize,
    pub retrieval_top_k: usize,

    /// "openai" or "ollama"
    pub embedding_engine: String,
    pub embedding_model: String,
    pub embedding_api_base_url: String,
    pub embedding_api_key: Option<String>,

    pub generation_model: String,
    pub generation_api_base_url: String,
    pub generation_api_key: Option<String>,

    /// Request timeout applied to every external embedding/generation call.
    pub upstream_timeout_secs: u64,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let embedding_engine = env_or("EMBEDDING_ENGINE", "openai").to_lowercase();

        // Per-engine defaults: the ollama path mirrors a local all-MiniLM setup.
        let (default_embedding_model, default_embedding_base) = match embedding_engine.as_str() {
            "ollama" => ("all-minilm", "http://localhost:11434"),
            _ => ("text-embedding-3-small", "https://api.openai.com/v1"),
        };

        Ok(Config {
            host: env_or("HOST", "0.0.0.0"),
            port: env_or("PORT", "8000")
                .parse()
                .context("PORT must be a valid port number")?,
            cors_allow_origin: env_or("CORS_ALLOW_ORIGIN", "*"),

            corpus_path: env_or("CORPUS_PATH", "cleaned_transcript.txt"),
            chunk_size: env_or("CHUNK_SIZE", "500")
                .parse()
                .context("CHUNK_SIZE must be a positive integer")?,
            retrieval_top_k: env_or("RETRIEVAL_TOP_K", "1")
                .parse()
                .context("RETRIEVAL_TOP_K must be a positive integer")?,

            embedding_engine,
            embedding_model: env_or("EMBEDDING_MODEL", default_embedding_model),
            embedding_api_base_url: env_or("EMBEDDING_API_BASE_URL", default_embedding_base),
            embedding_api_key: std::env::var("EMBEDDING_API_KEY")
                .or_else(|_| std::env::var("OPENAI_API_KEY"))
                .ok(),

            generation_model: env_or("GENERATION_MODEL", "gemini-1.5-pro"),
            generation_api_base_url: env_or(
                "GENERATION_API_BASE_URL",
                "https://generativelanguage.googleapis.com/v1beta/openai",
            ),
            generation_api_key: std::env::var("GENERATION_API_KEY")
                .or_else(|_| std::env::var("GOOGLE_API_KEY"))
                .ok(),

            upstream_timeout_secs: env_or("UPSTREAM_TIMEOUT_SECS", "30")
                .parse()
                .context("UPSTREAM_TIMEOUT_SECS must be a positive integer")?,
        })
    }
}

#[cfg(test)]
impl Default for Config {
    fn default() -> Self {
        Config {
            host: "127.0.0.1".to_string(),
            port: 8000,
            cors_allow_origin: "*".to_string(),
            corpus_path: "cleaned_transcript.txt".to_string(),
            chunk_size: 500,
            retrieval_top_k: 1,
            embedding_engine: "openai".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            embedding_api_base_url: "https://api.openai.com/v1".to_string(),
            embedding_api_key: None,
            generation_model: "gemini-1.5-pro".to_string(),
            generation_api_base_url: "https://generativelanguage.googleapis.com/v1beta/openai"
                .to_string(),
            generation_api_key: None,
            upstream_timeout_secs: 30,
        }
    }
}
