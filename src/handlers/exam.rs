// src/handlers/exam.rs

use axum::{
    Extension, Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    engine::ExamEngine,
    error::AppError,
    models::exam::{StartExamRequest, StartExamResponse, SubmitAnswerRequest, SubmitAnswerResponse},
    utils::{
        extract::{ValidatedJson, optional_json},
        identity::Identity,
    },
};

/// Starts a new exam for the caller (anonymous if no public id).
///
/// The body is optional; `{count?, durationSeconds?, seed?}`.
pub async fn start_exam(
    State(engine): State<ExamEngine>,
    Extension(identity): Extension<Identity>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let req: StartExamRequest = optional_json(&body)?;
    let started = engine.start(&req, identity.0).await?;

    Ok((
        StatusCode::CREATED,
        Json(StartExamResponse {
            exam_id: started.session.id,
            duration_sec: started.session.duration_seconds,
            ordered_questions: started.questions,
        }),
    ))
}

/// Records one answer. The response never tells whether it was correct.
pub async fn submit_answer(
    State(engine): State<ExamEngine>,
    Path((exam_id, question_id)): Path<(String, String)>,
    ValidatedJson(req): ValidatedJson<SubmitAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    engine
        .submit_answer(&exam_id, &question_id, &req.selected_option_keys)
        .await?;

    Ok(Json(SubmitAnswerResponse { accepted: true }))
}

/// Scores the exam and returns the review. Safe to call repeatedly.
pub async fn finish_exam(
    State(engine): State<ExamEngine>,
    Path(exam_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let result = engine.finish(&exam_id).await?;
    Ok(Json(result))
}
