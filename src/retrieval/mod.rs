pub mod chunking;
pub mod embeddings;
pub mod store;

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::config::Config;
use embeddings::EmbeddingProvider;
use store::{StoreError, VectorStore};

/// Chunk used when the corpus file is missing or empty at build time.
pub const INIT_PLACEHOLDER: &str = "Sample content for initialization";

/// Process-wide vector store with guarded one-time initialization.
///
/// Concurrent first requests race into `get_or_try_init`: exactly one of them
/// builds, the rest wait and observe the fully built store. A failed build
/// caches nothing, so a later request retries.
#[derive(Clone, Default)]
pub struct SharedVectorStore {
    cell: Arc<OnceCell<Arc<VectorStore>>>,
}

impl SharedVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the store, building it on first call: read the corpus file,
    /// chunk it, and embed every chunk. A missing or empty corpus degrades to
    /// a fixed placeholder chunk rather than an empty store; an embedding
    /// failure is returned to the caller instead.
    pub async fn get_or_build(
        &self,
        config: &Config,
        embedder: &dyn EmbeddingProvider,
    ) -> Result<Arc<VectorStore>, StoreError> {
        let store = self
            .cell
            .get_or_try_init(|| async {
                info!("Building vector store from {}", config.corpus_path);

                let text = match tokio::fs::read_to_string(&config.corpus_path).await {
                    Ok(text) if !text.trim().is_empty() => text,
                    Ok(_) => {
                        warn!(
                            "Corpus file {} is empty, using placeholder content",
                            config.corpus_path
                        );
                        INIT_PLACEHOLDER.to_string()
                    }
                    Err(e) => {
                        warn!(
                            "Failed to read corpus file {}: {}, using placeholder content",
                            config.corpus_path, e
                        );
                        INIT_PLACEHOLDER.to_string()
                    }
                };

                let store = VectorStore::build(&text, config.chunk_size, embedder).await?;
                info!("Vector store built with {} chunks", store.len());
                Ok::<_, StoreError>(Arc::new(store))
            })
            .await?;

        Ok(store.clone())
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }
}
