pub mod progress;
pub mod rest;
pub mod scoring;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use rest::ApiDoc;
use state::AppState;

/// Builds the complete application router: REST routes, CORS, request tracing and Swagger UI.
pub fn router(app_state: Arc<AppState>) -> Router {
    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);
    match app_state.config.cors_origin.parse::<HeaderValue>() {
        Ok(origin) => cors = cors.allow_origin(origin),
        Err(_) => warn!(
            "CORS_ORIGIN '{}' is not a valid header value; cross-origin requests are disabled",
            app_state.config.cors_origin
        ),
    }

    let api_router = Router::new()
        .route("/scoring/text", post(scoring::score_text_handler))
        .route("/scoring/answer", post(scoring::grade_answer_handler))
        .route("/scoring/speech", post(scoring::score_speech_handler))
        .route(
            "/students/{student_id}/recommendations",
            get(progress::daily_recommendations_handler),
        )
        .route(
            "/students/{student_id}/recommendations/completed",
            post(progress::completed_sections_handler),
        )
        .route(
            "/students/{student_id}/goals",
            get(progress::list_goals_handler).post(progress::create_goal_handler),
        )
        .route(
            "/goals/{goal_id}/completed",
            put(progress::set_goal_completed_handler),
        )
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
