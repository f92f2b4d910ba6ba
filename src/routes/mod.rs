pub mod questions;

use actix_web::web;

pub fn create_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(questions::api_status))
        .route("/health", web::get().to(questions::health_check))
        .route(
            "/generate-questions",
            web::post().to(questions::generate_questions),
        );
}
