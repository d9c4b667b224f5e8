// src/handlers/learn.rs

use axum::{Json, extract::State, response::IntoResponse};

use crate::{
    engine::ExamEngine, error::AppError, models::learn::EvaluateRequest,
    utils::extract::ValidatedJson,
};

/// Lists the whole bank for learning mode. Correct keys are not included.
pub async fn list_questions(
    State(engine): State<ExamEngine>,
) -> Result<impl IntoResponse, AppError> {
    let questions = engine.list_questions().await?;
    Ok(Json(questions))
}

/// Immediate feedback for a single question, outside any exam.
pub async fn evaluate_answer(
    State(engine): State<ExamEngine>,
    ValidatedJson(req): ValidatedJson<EvaluateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let result = engine.evaluate(&req).await?;
    Ok(Json(result))
}
