//! Per-owner statistics report.

use chrono::{DateTime, Duration, Utc};

use crate::{
    engine::score::is_passing,
    models::stats::{OwnerActivity, StatsResponse},
};

const RECENT_WINDOW_DAYS: i64 = 30;

/// Aggregates an owner's sessions and answers. Pass/fail uses the same
/// threshold as scoring.
pub fn compute_stats(activity: &OwnerActivity, passing_score: f64, now: DateTime<Utc>) -> StatsResponse {
    let mut stats = StatsResponse {
        total_exams: activity.exams.len() as i64,
        ..StatsResponse::default()
    };

    let mut score_sum = 0.0;
    let mut scored = 0i64;
    for exam in &activity.exams {
        if exam.finished_at.is_some() {
            stats.completed_exams += 1;
        }
        if let Some(score) = exam.score_percent {
            scored += 1;
            score_sum += score;
            if is_passing(score, passing_score) {
                stats.passed_exams += 1;
            } else {
                stats.failed_exams += 1;
            }
        }
    }
    stats.pass_rate = percent(stats.passed_exams, stats.completed_exams);
    stats.average_score = (scored > 0).then(|| score_sum / scored as f64);

    let since = now - Duration::days(RECENT_WINDOW_DAYS);
    for answer in &activity.answers {
        stats.total_answers += 1;
        if answer.is_correct {
            stats.correct_answers += 1;
        }
        if answer.answered_at >= since {
            stats.answers_last_30d += 1;
            if answer.is_correct {
                stats.correct_last_30d += 1;
            }
        }
    }
    stats.accuracy_overall = percent(stats.correct_answers, stats.total_answers);
    stats.accuracy_last_30d = percent(stats.correct_last_30d, stats.answers_last_30d);

    stats
}

fn percent(part: i64, whole: i64) -> Option<f64> {
    (whole > 0).then(|| part as f64 * 100.0 / whole as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::stats::{AnswerOutcome, ExamOutcome};

    #[test]
    fn test_empty_activity() {
        let stats = compute_stats(&OwnerActivity::default(), 61.0, Utc::now());
        assert_eq!(stats, StatsResponse::default());
    }

    #[test]
    fn test_exam_counts_use_threshold() {
        let now = Utc::now();
        let activity = OwnerActivity {
            exams: vec![
                ExamOutcome { finished_at: Some(now), score_percent: Some(61.0) },
                ExamOutcome { finished_at: Some(now), score_percent: Some(40.0) },
                ExamOutcome { finished_at: None, score_percent: None },
            ],
            answers: vec![],
        };
        let stats = compute_stats(&activity, 61.0, now);
        assert_eq!(stats.total_exams, 3);
        assert_eq!(stats.completed_exams, 2);
        assert_eq!(stats.passed_exams, 1);
        assert_eq!(stats.failed_exams, 1);
        assert_eq!(stats.pass_rate, Some(50.0));
        assert_eq!(stats.average_score, Some(50.5));

        let strict = compute_stats(&activity, 70.0, now);
        assert_eq!(strict.passed_exams, 0);
    }

    #[test]
    fn test_answer_accuracy_and_recent_window() {
        let now = Utc::now();
        let old = now - Duration::days(45);
        let activity = OwnerActivity {
            exams: vec![],
            answers: vec![
                AnswerOutcome { is_correct: true, answered_at: now },
                AnswerOutcome { is_correct: false, answered_at: now },
                AnswerOutcome { is_correct: true, answered_at: old },
                AnswerOutcome { is_correct: true, answered_at: old },
            ],
        };
        let stats = compute_stats(&activity, 61.0, now);
        assert_eq!(stats.total_answers, 4);
        assert_eq!(stats.correct_answers, 3);
        assert_eq!(stats.accuracy_overall, Some(75.0));
        assert_eq!(stats.answers_last_30d, 2);
        assert_eq!(stats.correct_last_30d, 1);
        assert_eq!(stats.accuracy_last_30d, Some(50.0));
    }
}
