//! Learning mode: immediate verdict with explanations, no session.

use crate::{
    engine::grader::is_fully_correct,
    error::AppError,
    models::learn::{EvaluateRequest, EvaluateResponse},
    store::QuestionBank,
};

pub async fn evaluate<B>(bank: &B, req: &EvaluateRequest) -> Result<EvaluateResponse, AppError>
where
    B: QuestionBank + ?Sized,
{
    let correct = bank.correct_keys(&req.question_id).await?;
    if correct.is_empty() {
        return Err(AppError::Conflict(format!(
            "Question '{}' has no correct option in the bank",
            req.question_id
        )));
    }

    let is_correct = is_fully_correct(&req.selected_option_keys, &correct);
    let explanations = bank.explanations(&req.question_id, &req.language_code()).await?;

    Ok(EvaluateResponse {
        is_correct,
        correct_option_keys: correct,
        explanations_by_option_key: explanations,
    })
}
