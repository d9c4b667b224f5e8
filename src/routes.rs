// src/routes.rs

use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{account, exam, history, learn, stats},
    state::AppState,
    utils::identity::{PUBLIC_ID_HEADER, identity_middleware},
};

/// Assembles the main application router.
///
/// * Mounts the learning, exam, history and stats routes under `/api/v1`.
/// * Resolves (or mints) the caller's public id on every request.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .cors_origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(PUBLIC_ID_HEADER),
        ])
        .allow_credentials(true);

    let learn_routes = Router::new()
        .route("/questions", get(learn::list_questions))
        .route("/learn/answer", post(learn::evaluate_answer));

    let exam_routes = Router::new()
        .route("/", post(exam::start_exam).get(history::list_exams))
        .route("/{id}", get(history::get_exam))
        .route("/{id}/questions/{question_id}/answer", post(exam::submit_answer))
        .route("/{id}/finish", post(exam::finish_exam));

    let me_routes = Router::new()
        .route("/export-key", get(account::export_key))
        .route("/restore", post(account::restore));

    let api_routes = Router::new()
        .merge(learn_routes)
        .nest("/exams", exam_routes)
        .nest("/me", me_routes)
        .route("/stats", get(stats::get_stats))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            identity_middleware,
        ));

    Router::new()
        .route("/healthz", get(stats::healthz))
        .nest("/api/v1", api_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
