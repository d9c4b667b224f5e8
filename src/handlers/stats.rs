// src/handlers/stats.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};

use crate::{engine::ExamEngine, error::AppError, utils::identity::Identity};

pub async fn get_stats(
    State(engine): State<ExamEngine>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, AppError> {
    let owner = identity.require()?;
    let stats = engine.stats(owner).await?;
    Ok(Json(stats))
}

pub async fn healthz() -> &'static str {
    "ok"
}
