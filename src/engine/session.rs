//! Exam session lifecycle: start, submit, finish, history.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    config::Config,
    engine::{
        draw::{draw, rng_for},
        grader::{is_fully_correct, normalize_selection},
        learn,
        review::build_review,
        score::{ScoreSummary, compute_score, is_passing},
        stats::compute_stats,
    },
    error::AppError,
    models::{
        exam::{
            AnswerRecord, EXAM_KIND, ExamDetailResponse, ExamListItem, ExamListParams,
            ExamListResponse, ExamSession, FinishExamResponse, NewAnswer, QuestionRef,
            StartExamRequest,
        },
        learn::{EvaluateRequest, EvaluateResponse},
        question::{PublicQuestion, Question},
        stats::StatsResponse,
    },
    store::Store,
};

const DEFAULT_PAGE_LIMIT: i64 = 20;
const MAX_PAGE_LIMIT: i64 = 100;

/// Exam defaults and the pass threshold, taken from [`Config`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExamSettings {
    pub default_question_count: i64,
    pub default_duration_seconds: i64,
    pub passing_score: f64,
}

impl From<&Config> for ExamSettings {
    fn from(config: &Config) -> Self {
        Self {
            default_question_count: config.default_question_count,
            default_duration_seconds: config.default_duration_seconds,
            passing_score: config.passing_score,
        }
    }
}

/// A freshly created session with its questions in presentation order.
#[derive(Debug, Clone)]
pub struct StartedExam {
    pub session: ExamSession,
    pub questions: Vec<PublicQuestion>,
}

/// Stateless service over the shared store. Cheap to clone.
#[derive(Clone)]
pub struct ExamEngine {
    store: Arc<dyn Store>,
    settings: ExamSettings,
}

impl ExamEngine {
    pub fn new(store: Arc<dyn Store>, settings: ExamSettings) -> Self {
        Self { store, settings }
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// Draws the questions and persists the session with its fixed order.
    ///
    /// Non-positive or absent count and duration fall back to the defaults.
    pub async fn start(
        &self,
        req: &StartExamRequest,
        owner: Option<String>,
    ) -> Result<StartedExam, AppError> {
        let count = req
            .count
            .filter(|c| *c > 0)
            .unwrap_or(self.settings.default_question_count);
        let duration_seconds = req
            .duration_seconds
            .filter(|d| *d > 0)
            .unwrap_or(self.settings.default_duration_seconds);

        let all_ids = self.store.list_all_ids().await?;
        if all_ids.is_empty() {
            return Err(AppError::InvalidState("No questions in the bank".to_string()));
        }

        let mut rng = rng_for(req.seed);
        let drawn = draw(&all_ids, count.max(0) as usize, &mut rng);

        let mut by_id: HashMap<String, Question> = self
            .store
            .find_questions(&drawn)
            .await?
            .into_iter()
            .map(|q| (q.id.clone(), q))
            .collect();

        let mut ordered = Vec::with_capacity(drawn.len());
        for id in &drawn {
            let question = by_id
                .remove(id)
                .ok_or_else(|| AppError::NotFound(format!("Question '{}' not found", id)))?;
            if question.correct_keys().is_empty() {
                return Err(AppError::Conflict(format!(
                    "Question '{}' has no correct option in the bank",
                    id
                )));
            }
            ordered.push(question);
        }

        let session = ExamSession {
            id: Uuid::new_v4().to_string(),
            owner,
            kind: EXAM_KIND.to_string(),
            started_at: Utc::now(),
            finished_at: None,
            duration_seconds,
            score_percent: None,
            seed: req.seed,
            questions: drawn
                .iter()
                .enumerate()
                .map(|(i, id)| QuestionRef {
                    position: i as i32 + 1,
                    question_id: id.clone(),
                })
                .collect(),
        };
        self.store.create_exam(&session).await?;

        tracing::info!(
            "Exam {} started with {} questions (owner: {:?}, seeded: {})",
            session.id,
            session.questions.len(),
            session.owner,
            session.seed.is_some()
        );

        Ok(StartedExam {
            questions: ordered.iter().map(Question::to_public).collect(),
            session,
        })
    }

    /// Grades and logs one submission. The returned record is for internal
    /// use; callers must not expose its correctness during the exam.
    pub async fn submit_answer(
        &self,
        exam_id: &str,
        question_id: &str,
        selected: &[String],
    ) -> Result<AnswerRecord, AppError> {
        let exam = self.load_exam(exam_id).await?;
        if !exam.contains_question(question_id) {
            return Err(AppError::BadRequest(format!(
                "Question '{}' is not part of exam '{}'",
                question_id, exam_id
            )));
        }

        let correct = self.store.correct_keys(question_id).await?;
        if correct.is_empty() {
            return Err(AppError::Conflict(format!(
                "Question '{}' has no correct option in the bank",
                question_id
            )));
        }

        let record = self
            .store
            .append_answer(NewAnswer {
                exam_id: exam.id.clone(),
                question_id: question_id.to_string(),
                selected: normalize_selection(selected).into_iter().collect(),
                is_correct: is_fully_correct(selected, &correct),
                answered_at: Utc::now(),
            })
            .await?;

        tracing::debug!("Answer {} logged for exam {} question {}", record.id, exam_id, question_id);
        Ok(record)
    }

    /// Scores the session and stores score and finish time. Every call
    /// recomputes from the log and overwrites the stored values.
    pub async fn finish(&self, exam_id: &str) -> Result<FinishExamResponse, AppError> {
        let exam = self.load_exam(exam_id).await?;
        // Fixed before the log is read: every scored answer is at or before it.
        let finished_at = Utc::now();
        let log = self.session_log(&exam).await?;
        let score = compute_score(exam.questions.len(), &log)?;

        self.store
            .record_finish(&exam.id, finished_at, score.score_percent)
            .await?;

        let review_items = build_review(&exam, &log, self.store.as_ref()).await?;
        let passed = score.passed(self.settings.passing_score);

        tracing::info!(
            "Exam {} finished: {:.1}% ({} correct, {} wrong, passed: {})",
            exam.id,
            score.score_percent,
            score.correct_count,
            score.wrong_count,
            passed
        );

        Ok(FinishExamResponse {
            score_percent: score.score_percent,
            correct_count: score.correct_count,
            wrong_count: score.wrong_count,
            passed,
            review_items,
        })
    }

    /// One page of the owner's sessions, newest first.
    pub async fn list_sessions(
        &self,
        owner: &str,
        params: &ExamListParams,
    ) -> Result<ExamListResponse, AppError> {
        let (limit, offset) = page_bounds(params);
        let page = self.store.list_exams_by_owner(owner, limit, offset).await?;

        let items = page
            .items
            .into_iter()
            .map(|e| ExamListItem {
                passed: e
                    .score_percent
                    .map(|s| is_passing(s, self.settings.passing_score)),
                id: e.id,
                started_at: e.started_at,
                finished_at: e.finished_at,
                duration_sec: e.duration_seconds,
                score_percent: e.score_percent,
                question_count: e.question_count,
            })
            .collect();

        Ok(ExamListResponse {
            total: page.total,
            limit,
            offset,
            items,
        })
    }

    /// Read-only review of an owned session.
    ///
    /// A finished session is shown as of its finish time: answers logged
    /// after it are left out, so the counts and review match the stored score.
    pub async fn session_detail(
        &self,
        owner: &str,
        exam_id: &str,
    ) -> Result<ExamDetailResponse, AppError> {
        let exam = self.load_exam(exam_id).await?;
        if exam.owner.as_deref() != Some(owner) {
            return Err(AppError::Forbidden("Exam belongs to another user".to_string()));
        }

        let mut log = self.session_log(&exam).await?;
        if let Some(finished_at) = exam.finished_at {
            log.retain(|a| a.answered_at <= finished_at);
        }
        let score = if exam.questions.is_empty() {
            ScoreSummary {
                score_percent: 0.0,
                correct_count: 0,
                wrong_count: 0,
            }
        } else {
            compute_score(exam.questions.len(), &log)?
        };
        let review_items = build_review(&exam, &log, self.store.as_ref()).await?;

        Ok(ExamDetailResponse {
            passed: exam
                .score_percent
                .map(|s| is_passing(s, self.settings.passing_score)),
            exam_id: exam.id,
            started_at: exam.started_at,
            finished_at: exam.finished_at,
            duration_sec: exam.duration_seconds,
            score_percent: exam.score_percent,
            correct_count: score.correct_count,
            wrong_count: score.wrong_count,
            review_items,
        })
    }

    pub async fn evaluate(&self, req: &EvaluateRequest) -> Result<EvaluateResponse, AppError> {
        learn::evaluate(self.store.as_ref(), req).await
    }

    /// The learning-mode catalogue, without correctness.
    pub async fn list_questions(&self) -> Result<Vec<PublicQuestion>, AppError> {
        Ok(self
            .store
            .list_questions()
            .await?
            .iter()
            .map(Question::to_public)
            .collect())
    }

    pub async fn stats(&self, owner: &str) -> Result<StatsResponse, AppError> {
        let activity = self.store.owner_activity(owner).await?;
        Ok(compute_stats(&activity, self.settings.passing_score, Utc::now()))
    }

    async fn load_exam(&self, exam_id: &str) -> Result<ExamSession, AppError> {
        self.store
            .find_exam(exam_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Exam '{}' not found", exam_id)))
    }

    /// The answer log restricted to the session's own questions.
    async fn session_log(&self, exam: &ExamSession) -> Result<Vec<AnswerRecord>, AppError> {
        let mut log = self.store.list_answers(&exam.id).await?;
        log.retain(|a| exam.contains_question(&a.question_id));
        Ok(log)
    }
}

/// Clamps history pagination: limit in 1..=100 (default 20), offset >= 0.
fn page_bounds(params: &ExamListParams) -> (i64, i64) {
    let limit = match params.limit {
        Some(n) if n > 0 => n.min(MAX_PAGE_LIMIT),
        _ => DEFAULT_PAGE_LIMIT,
    };
    let offset = params.offset.filter(|o| *o >= 0).unwrap_or(0);
    (limit, offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(limit: Option<i64>, offset: Option<i64>) -> ExamListParams {
        ExamListParams { limit, offset }
    }

    #[test]
    fn test_page_bounds_defaults() {
        assert_eq!(page_bounds(&params(None, None)), (20, 0));
    }

    #[test]
    fn test_page_bounds_clamps() {
        assert_eq!(page_bounds(&params(Some(500), Some(10))), (100, 10));
        assert_eq!(page_bounds(&params(Some(0), Some(-4))), (20, 0));
        assert_eq!(page_bounds(&params(Some(-1), None)), (20, 0));
        assert_eq!(page_bounds(&params(Some(35), Some(0))), (35, 0));
    }
}
