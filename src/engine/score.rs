//! Latest-answer-wins scoring.

use std::collections::HashMap;

use crate::{error::AppError, models::exam::AnswerRecord};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreSummary {
    pub score_percent: f64,
    pub correct_count: i64,
    pub wrong_count: i64,
}

impl ScoreSummary {
    pub fn passed(&self, passing_score: f64) -> bool {
        is_passing(self.score_percent, passing_score)
    }
}

/// Inclusive pass check, shared by scoring, history and statistics.
pub fn is_passing(score_percent: f64, passing_score: f64) -> bool {
    score_percent >= passing_score
}

/// The effective record per question: latest `answered_at`, ties broken by
/// the highest record id.
pub fn resolve_latest(log: &[AnswerRecord]) -> HashMap<&str, &AnswerRecord> {
    let mut latest: HashMap<&str, &AnswerRecord> = HashMap::new();
    for record in log {
        latest
            .entry(record.question_id.as_str())
            .and_modify(|current| {
                if (record.answered_at, record.id) > (current.answered_at, current.id) {
                    *current = record;
                }
            })
            .or_insert(record);
    }
    latest
}

/// Reduces an answer log to a score over `total_questions`.
///
/// The log must only contain answers to the session's questions. Unanswered
/// questions count as wrong.
pub fn compute_score(total_questions: usize, log: &[AnswerRecord]) -> Result<ScoreSummary, AppError> {
    if total_questions == 0 {
        return Err(AppError::InvalidState("Exam has no questions".to_string()));
    }

    let correct = resolve_latest(log)
        .values()
        .filter(|record| record.is_correct)
        .count()
        .min(total_questions);

    let total = total_questions as i64;
    let correct_count = correct as i64;

    Ok(ScoreSummary {
        score_percent: correct as f64 * 100.0 / total_questions as f64,
        correct_count,
        wrong_count: total - correct_count,
    })
}
