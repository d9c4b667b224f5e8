// src/models/exam.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::question::{ExplanationMap, PublicQuestion};

pub const EXAM_KIND: &str = "exam";

/// A persisted exam attempt with its fixed question order.
#[derive(Debug, Clone, PartialEq)]
pub struct ExamSession {
    pub id: String,
    pub owner: Option<String>,
    pub kind: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub duration_seconds: i64,
    pub score_percent: Option<f64>,
    pub seed: Option<i64>,
    /// Sorted by `position`, dense 1..N.
    pub questions: Vec<QuestionRef>,
}

impl ExamSession {
    pub fn contains_question(&self, question_id: &str) -> bool {
        self.questions.iter().any(|r| r.question_id == question_id)
    }

    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }
}

/// Immutable (position, question) pair of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRef {
    pub position: i32,
    pub question_id: String,
}

/// One logged submission. Never updated after insert.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerRecord {
    /// Insertion sequence, used to break timestamp ties.
    pub id: i64,
    pub exam_id: String,
    pub question_id: String,
    pub selected: Vec<String>,
    pub is_correct: bool,
    pub answered_at: DateTime<Utc>,
}

/// An answer about to be appended to the log.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAnswer {
    pub exam_id: String,
    pub question_id: String,
    pub selected: Vec<String>,
    pub is_correct: bool,
    pub answered_at: DateTime<Utc>,
}

/// Row of the history listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ExamSummary {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub duration_seconds: i64,
    pub score_percent: Option<f64>,
    pub question_count: i64,
}

/// One page of an owner's sessions plus the owner's total.
#[derive(Debug, Clone, PartialEq)]
pub struct ExamPage {
    pub total: i64,
    pub items: Vec<ExamSummary>,
}

// ---------------------------------------------------------------------------
// Request / response DTOs
// ---------------------------------------------------------------------------

/// DTO for starting an exam. Every field is optional; oversized counts are
/// clamped to the bank and non-positive values fall back to the defaults.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StartExamRequest {
    pub count: Option<i64>,
    pub duration_seconds: Option<i64>,
    pub seed: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartExamResponse {
    pub exam_id: String,
    pub duration_sec: i64,
    pub ordered_questions: Vec<PublicQuestion>,
}

/// DTO for submitting an answer to one exam question.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerRequest {
    #[validate(length(max = 16), custom(function = validate_option_keys))]
    pub selected_option_keys: Vec<String>,
}

/// Submit acknowledgement. Deliberately carries no correctness.
#[derive(Debug, Serialize)]
pub struct SubmitAnswerResponse {
    pub accepted: bool,
}

/// Review row of a single question.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewItem {
    pub question_id: String,
    pub question_text: String,
    pub multi_select: bool,
    pub selected_keys: Vec<String>,
    pub correct_keys: Vec<String>,
    /// Language code -> option key -> explanation.
    pub explanations_by_language: BTreeMap<String, ExplanationMap>,
    pub was_correct: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishExamResponse {
    pub score_percent: f64,
    pub correct_count: i64,
    pub wrong_count: i64,
    pub passed: bool,
    pub review_items: Vec<ReviewItem>,
}

/// Query parameters of the history listing.
#[derive(Debug, Default, Deserialize)]
pub struct ExamListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamListItem {
    pub id: String,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    pub duration_sec: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passed: Option<bool>,
    pub question_count: i64,
}

#[derive(Debug, Serialize)]
pub struct ExamListResponse {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub items: Vec<ExamListItem>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamDetailResponse {
    pub exam_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub duration_sec: i64,
    pub score_percent: Option<f64>,
    pub passed: Option<bool>,
    pub correct_count: i64,
    pub wrong_count: i64,
    pub review_items: Vec<ReviewItem>,
}

/// Option keys are short ("a".."d"); anything longer is malformed input.
pub(crate) fn validate_option_keys(keys: &[String]) -> Result<(), validator::ValidationError> {
    for key in keys {
        let trimmed = key.trim();
        if trimmed.is_empty() || trimmed.len() > 4 {
            return Err(validator::ValidationError::new("invalid_option_key"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_request_accepts_empty_object() {
        let req: StartExamRequest = serde_json::from_str("{}").unwrap();
        assert!(req.count.is_none() && req.duration_seconds.is_none() && req.seed.is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_start_request_accepts_oversized_values() {
        let req: StartExamRequest =
            serde_json::from_str(r#"{"count": 5000, "durationSeconds": 9999999}"#).unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.count, Some(5000));
    }

    #[test]
    fn test_submit_request_requires_keys_field() {
        assert!(serde_json::from_str::<SubmitAnswerRequest>("{}").is_err());
    }

    #[test]
    fn test_submit_request_rejects_long_keys() {
        let req: SubmitAnswerRequest =
            serde_json::from_str(r#"{"selectedOptionKeys": ["a", "banana"]}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_submit_response_has_no_correctness() {
        let body = serde_json::to_value(SubmitAnswerResponse { accepted: true }).unwrap();
        assert_eq!(body, serde_json::json!({"accepted": true}));
    }

    #[test]
    fn test_list_item_omits_absent_fields() {
        let item = ExamListItem {
            id: "e1".into(),
            started_at: Utc::now(),
            finished_at: None,
            duration_sec: 60,
            score_percent: None,
            passed: None,
            question_count: 3,
        };
        let body = serde_json::to_value(item).unwrap();
        assert!(body.get("passed").is_none());
        assert!(body.get("finishedAt").is_none());
        assert_eq!(body["questionCount"], 3);
    }
}
