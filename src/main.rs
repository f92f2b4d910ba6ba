mod config;
mod error;
mod retrieval;
mod routes;
mod services;

use std::net::SocketAddr;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{
    middleware::{Logger, NormalizePath},
    web, App, HttpServer,
};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::Config;
use crate::retrieval::embeddings::{embedding_provider_from_config, EmbeddingProvider};
use crate::retrieval::SharedVectorStore;
use crate::services::generation::{text_generator_from_config, TextGenerator};
use crate::routes::create_routes;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    // Providers are None when credentials are missing at startup: the server
    // still comes up, the status endpoint works, and generation requests get
    // a config error.
    pub embedder: Option<Arc<dyn EmbeddingProvider>>,
    pub generator: Option<Arc<dyn TextGenerator>>,
    pub store: SharedVectorStore,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // RUST_LOG accepts full filter directives, e.g. "info,actix_web=warn".
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting question generator service");

    let config = Config::from_env()?;
    info!("Configuration loaded from environment");

    let embedder = match embedding_provider_from_config(&config) {
        Ok(provider) => Some(provider),
        Err(e) => {
            warn!("Embedding provider unavailable: {}", e);
            None
        }
    };

    let generator = match text_generator_from_config(&config) {
        Ok(generator) => Some(generator),
        Err(e) => {
            warn!("Text generator unavailable: {}", e);
            None
        }
    };

    let store = SharedVectorStore::new();

    // Eager index build. Failure is non-fatal: the first request retries
    // through the same guarded path.
    if let Some(ref embedder) = embedder {
        match store.get_or_build(&config, embedder.as_ref()).await {
            Ok(built) => info!("Vector store ready with {} chunks", built.len()),
            Err(e) => warn!("Startup vector store build failed: {}", e),
        }
    } else {
        warn!("Skipping startup vector store build: no embedding provider");
    }

    let state = web::Data::new(AppState {
        config: config.clone(),
        embedder,
        generator,
        store,
    });

    let addr = SocketAddr::from((config.host.parse::<std::net::IpAddr>()?, config.port));
    let cors_allow_origin = config.cors_allow_origin.clone();

    info!("Server running at http://{}", addr);

    HttpServer::new(move || {
        let cors = if cors_allow_origin == "*" {
            Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600)
        } else {
            let origins: Vec<&str> = cors_allow_origin.split(',').map(|s| s.trim()).collect();
            let mut cors = Cors::default();
            for origin in origins {
                cors = cors.allowed_origin(origin);
            }
            cors.allowed_methods(vec!["GET", "POST", "OPTIONS"])
                .allow_any_header()
                .max_age(3600)
        };

        App::new()
            .app_data(state.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(NormalizePath::trim())
            .configure(create_routes)
    })
    .bind(addr)?
    .run()
    .await?;

    Ok(())
}
