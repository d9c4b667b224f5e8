// src/models/stats.rs

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Raw per-owner data the statistics report is computed from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OwnerActivity {
    /// One entry per session; `None` while the session is unfinished.
    pub exams: Vec<ExamOutcome>,
    /// Every logged answer of the owner's sessions.
    pub answers: Vec<AnswerOutcome>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExamOutcome {
    pub finished_at: Option<DateTime<Utc>>,
    pub score_percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnswerOutcome {
    pub is_correct: bool,
    pub answered_at: DateTime<Utc>,
}

/// Aggregate report for the current identity. Rates are percentages.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_exams: i64,
    pub completed_exams: i64,
    pub passed_exams: i64,
    pub failed_exams: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pass_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_score: Option<f64>,
    pub total_answers: i64,
    pub correct_answers: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy_overall: Option<f64>,
    #[serde(rename = "answersLast30d")]
    pub answers_last_30d: i64,
    #[serde(rename = "correctLast30d")]
    pub correct_last_30d: i64,
    #[serde(rename = "accuracyLast30d", skip_serializing_if = "Option::is_none")]
    pub accuracy_last_30d: Option<f64>,
}
