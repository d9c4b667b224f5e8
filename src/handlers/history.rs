// src/handlers/history.rs

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};

use crate::{
    engine::ExamEngine, error::AppError, models::exam::ExamListParams,
    utils::identity::Identity,
};

pub async fn list_exams(
    State(engine): State<ExamEngine>,
    Extension(identity): Extension<Identity>,
    Query(params): Query<ExamListParams>,
) -> Result<impl IntoResponse, AppError> {
    let owner = identity.require()?;
    let page = engine.list_sessions(owner, &params).await?;
    Ok(Json(page))
}

/// Review of a past exam. Only its owner may read it.
pub async fn get_exam(
    State(engine): State<ExamEngine>,
    Extension(identity): Extension<Identity>,
    Path(exam_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let owner = identity.require()?;
    let detail = engine.session_detail(owner, &exam_id).await?;
    Ok(Json(detail))
}
