use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::retrieval::embeddings::EmbeddingError;
use crate::retrieval::store::StoreError;
use crate::services::generation::GenerationError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Upstream service error: {0}")]
    UpstreamError(String),

    #[error("Upstream timeout: {0}")]
    Timeout(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Wire format for every error response: `{"error": "<message>"}`.
#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let (status, error_message) = match self {
            AppError::Config(ref e) => {
                tracing::error!("Configuration error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.clone())
            }
            AppError::BadRequest(ref e) => (StatusCode::BAD_REQUEST, e.clone()),
            AppError::UpstreamError(ref e) => {
                tracing::error!("Upstream service error: {}", e);
                (StatusCode::BAD_GATEWAY, e.clone())
            }
            AppError::Timeout(ref e) => {
                tracing::error!("Upstream timeout: {}", e);
                (StatusCode::GATEWAY_TIMEOUT, e.clone())
            }
            AppError::Internal(ref e) => {
                // Detail stays in the server log; the body gets a generic message.
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        HttpResponse::build(status).json(ErrorResponse {
            error: error_message,
        })
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::UpstreamError(_) => StatusCode::BAD_GATEWAY,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

impl From<EmbeddingError> for AppError {
    fn from(err: EmbeddingError) -> Self {
        match err {
            EmbeddingError::Timeout(e) => AppError::Timeout(format!("Embedding request: {}", e)),
            EmbeddingError::Api(e) => AppError::UpstreamError(format!("Embedding service: {}", e)),
            EmbeddingError::Config(e) => AppError::Config(e),
        }
    }
}

impl From<GenerationError> for AppError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::Timeout(e) => AppError::Timeout(format!("Generation request: {}", e)),
            GenerationError::Api(e) => {
                AppError::UpstreamError(format!("Generation service: {}", e))
            }
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Embedding(e) => e.into(),
            StoreError::Mismatch { .. } | StoreError::Empty => AppError::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn test_status_codes_match_taxonomy() {
        assert_eq!(
            AppError::Config("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::BadRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::UpstreamError("x".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::Timeout("x".into()).status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            AppError::Internal("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[actix_web::test]
    async fn test_internal_error_body_is_generic() {
        let resp = AppError::Internal("connection string leaked".into()).error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let parsed: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed.error, "Internal server error");
        assert!(!parsed.error.contains("connection string"));
    }

    #[test]
    fn test_embedding_timeout_maps_to_timeout() {
        let err: AppError = EmbeddingError::Timeout("deadline exceeded".into()).into();
        assert!(matches!(err, AppError::Timeout(_)));
    }

    #[test]
    fn test_generation_api_failure_maps_to_upstream() {
        let err: AppError = GenerationError::Api("503 from model".into()).into();
        assert!(matches!(err, AppError::UpstreamError(_)));
    }

    #[test]
    fn test_store_embedding_error_passes_through() {
        let err: AppError =
            StoreError::Embedding(EmbeddingError::Timeout("slow upstream".into())).into();
        assert!(matches!(err, AppError::Timeout(_)));
    }

    #[test]
    fn test_store_invariant_errors_map_to_internal() {
        let err: AppError = StoreError::Empty.into();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
