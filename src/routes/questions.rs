use actix_web::{web, HttpResponse};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    services::questions::QuestionService,
    AppState,
};

const MISSING_PARAMS: &str =
    "Missing required parameters. Please provide 'course_outcome' and 'bloom_level'.";

/// GET / - Status and usage descriptor
pub async fn api_status() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "online",
        "message": "Course Outcome & Bloom's Level Question Generator API is running",
        "usage": {
            "endpoint": "/generate-questions",
            "method": "POST",
            "body": {
                "course_outcome": "CO1: Demonstrate understanding...",
                "bloom_level": "Understand",
                "save_to_json": false
            }
        }
    }))
}

/// GET /health - Liveness probe
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(json!({"status": true}))
}

/// POST /generate-questions
///
/// The body is accepted as loose JSON: both required fields must be present
/// and be strings. `save_to_json` is accepted and ignored.
pub async fn generate_questions(
    state: web::Data<AppState>,
    body: web::Json<Value>,
) -> AppResult<HttpResponse> {
    let course_outcome = body.get("course_outcome").and_then(Value::as_str);
    let bloom_level = body.get("bloom_level").and_then(Value::as_str);

    let (course_outcome, bloom_level) = match (course_outcome, bloom_level) {
        (Some(co), Some(bloom)) => (co, bloom),
        _ => return Err(AppError::BadRequest(MISSING_PARAMS.to_string())),
    };

    let embedder = state
        .embedder
        .as_ref()
        .ok_or_else(|| AppError::Config("Embedding provider is not configured".to_string()))?;
    let generator = state
        .generator
        .as_ref()
        .ok_or_else(|| AppError::Config("Text generator is not configured".to_string()))?;

    // Lazy path: a request arriving before (or after a failed) startup build
    // triggers exactly one guarded build.
    let store = state
        .store
        .get_or_build(&state.config, embedder.as_ref())
        .await?;

    let service = QuestionService::new(
        embedder.clone(),
        generator.clone(),
        state.config.retrieval_top_k,
    );
    let result = service.generate(&store, course_outcome, bloom_level).await?;

    Ok(HttpResponse::Ok().json(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::retrieval::embeddings::{EmbeddingError, EmbeddingProvider};
    use crate::retrieval::SharedVectorStore;
    use crate::services::generation::{GenerationError, TextGenerator};
    use actix_web::{test, App};
    use std::sync::Arc;

    #[derive(Debug)]
    struct MockEmbedder;

    #[async_trait::async_trait]
    impl EmbeddingProvider for MockEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
            Ok(vec![text.chars().count() as f32, 1.0])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Ok(texts
                .iter()
                .map(|t| vec![t.chars().count() as f32, 1.0])
                .collect())
        }

        fn dimensions(&self) -> usize {
            2
        }

        fn model_name(&self) -> &str {
            "mock-embedder"
        }
    }

    struct MockGenerator;

    #[async_trait::async_trait]
    impl TextGenerator for MockGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            Ok("Objective Questions:\n1. Mock objective one?\n2. Mock objective two?\n\
                Short Answer Questions:\n1. Mock subjective one.\n2. Mock subjective two."
                .to_string())
        }

        fn model_name(&self) -> &str {
            "mock-generator"
        }
    }

    struct FailingGenerator;

    #[async_trait::async_trait]
    impl TextGenerator for FailingGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            Err(GenerationError::Api("model offline".to_string()))
        }

        fn model_name(&self) -> &str {
            "failing-generator"
        }
    }

    struct TimeoutGenerator;

    #[async_trait::async_trait]
    impl TextGenerator for TimeoutGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            Err(GenerationError::Timeout("deadline exceeded".to_string()))
        }

        fn model_name(&self) -> &str {
            "timeout-generator"
        }
    }

    fn test_state(generator: Arc<dyn TextGenerator>) -> web::Data<AppState> {
        // Nonexistent corpus path: the store build falls back to the
        // placeholder chunk, which is all these tests need.
        let config = Config {
            corpus_path: "/nonexistent/test_corpus.txt".to_string(),
            ..Config::default()
        };
        web::Data::new(AppState {
            config,
            embedder: Some(Arc::new(MockEmbedder)),
            generator: Some(generator),
            store: SharedVectorStore::new(),
        })
    }

    #[actix_web::test]
    async fn test_status_endpoint() {
        let app = test::init_service(
            App::new()
                .app_data(test_state(Arc::new(MockGenerator)))
                .configure(crate::routes::create_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["status"], "online");
        assert_eq!(body["usage"]["endpoint"], "/generate-questions");
    }

    #[actix_web::test]
    async fn test_missing_bloom_level_returns_400() {
        let app = test::init_service(
            App::new()
                .app_data(test_state(Arc::new(MockGenerator)))
                .configure(crate::routes::create_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/generate-questions")
            .set_json(json!({"course_outcome": "CO1: Explain routing"}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 400);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], MISSING_PARAMS);
    }

    #[actix_web::test]
    async fn test_non_string_fields_return_400() {
        let app = test::init_service(
            App::new()
                .app_data(test_state(Arc::new(MockGenerator)))
                .configure(crate::routes::create_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/generate-questions")
            .set_json(json!({"course_outcome": 42, "bloom_level": "Apply"}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 400);
    }

    #[actix_web::test]
    async fn test_successful_generation_returns_questions() {
        let app = test::init_service(
            App::new()
                .app_data(test_state(Arc::new(MockGenerator)))
                .configure(crate::routes::create_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/generate-questions")
            .set_json(json!({
                "course_outcome": "CO1: Explain routing",
                "bloom_level": "Understand",
                "save_to_json": true
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 200);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["course_outcome"], "CO1: Explain routing");
        assert_eq!(body["bloom_level"], "Understand");
        assert_eq!(body["questions"]["objective"].as_array().unwrap().len(), 2);
        assert_eq!(body["questions"]["subjective"].as_array().unwrap().len(), 2);
        assert!(body["raw_text"].as_str().unwrap().contains("Mock objective"));
    }

    #[actix_web::test]
    async fn test_generator_failure_returns_502() {
        let app = test::init_service(
            App::new()
                .app_data(test_state(Arc::new(FailingGenerator)))
                .configure(crate::routes::create_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/generate-questions")
            .set_json(json!({
                "course_outcome": "CO1: Explain routing",
                "bloom_level": "Apply"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 502);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("model offline"));
    }

    #[actix_web::test]
    async fn test_generator_timeout_returns_504() {
        let app = test::init_service(
            App::new()
                .app_data(test_state(Arc::new(TimeoutGenerator)))
                .configure(crate::routes::create_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/generate-questions")
            .set_json(json!({
                "course_outcome": "CO1: Explain routing",
                "bloom_level": "Apply"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 504);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("deadline exceeded"));
    }

    #[actix_web::test]
    async fn test_unconfigured_generator_returns_500() {
        let config = Config {
            corpus_path: "/nonexistent/test_corpus.txt".to_string(),
            ..Config::default()
        };
        let state = web::Data::new(AppState {
            config,
            embedder: Some(Arc::new(MockEmbedder)),
            generator: None,
            store: SharedVectorStore::new(),
        });
        let app = test::init_service(
            App::new()
                .app_data(state)
                .configure(crate::routes::create_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/generate-questions")
            .set_json(json!({
                "course_outcome": "CO1: Explain routing",
                "bloom_level": "Apply"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 500);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("not configured"));
    }

    #[actix_web::test]
    async fn test_health_endpoint() {
        let app = test::init_service(
            App::new()
                .app_data(test_state(Arc::new(MockGenerator)))
                .configure(crate::routes::create_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], true);
    }
}
