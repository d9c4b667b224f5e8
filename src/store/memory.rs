//! In-memory storage used by tests and DB-less runs.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{QuestionBank, SessionStore};
use crate::{
    error::AppError,
    models::{
        exam::{AnswerRecord, ExamPage, ExamSession, ExamSummary, NewAnswer},
        question::{Explanation, NewQuestion, Question},
        stats::{AnswerOutcome, ExamOutcome, OwnerActivity},
    },
};

#[derive(Default)]
struct Inner {
    /// Insertion order is preserved.
    questions: Vec<Question>,
    explanations: Vec<Explanation>,
    exams: HashMap<String, ExamSession>,
    answers: Vec<AnswerRecord>,
    next_answer_id: i64,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuestionBank for MemoryStore {
    async fn list_all_ids(&self) -> Result<Vec<String>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner.questions.iter().map(|q| q.id.clone()).collect())
    }

    async fn find_question(&self, id: &str) -> Result<Option<Question>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner.questions.iter().find(|q| q.id == id).cloned())
    }

    async fn find_questions(&self, ids: &[String]) -> Result<Vec<Question>, AppError> {
        let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let inner = self.inner.read().await;
        Ok(inner
            .questions
            .iter()
            .filter(|q| wanted.contains(q.id.as_str()))
            .cloned()
            .collect())
    }

    async fn list_questions(&self) -> Result<Vec<Question>, AppError> {
        let inner = self.inner.read().await;
        let mut questions = inner.questions.clone();
        questions.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(questions)
    }

    async fn find_explanations(&self, question_id: &str) -> Result<Vec<Explanation>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .explanations
            .iter()
            .filter(|e| e.question_id == question_id)
            .cloned()
            .collect())
    }

    async fn is_empty(&self) -> Result<bool, AppError> {
        Ok(self.inner.read().await.questions.is_empty())
    }

    async fn insert_questions(&self, batch: Vec<NewQuestion>) -> Result<usize, AppError> {
        let mut inner = self.inner.write().await;

        // Check everything before touching state so a rejected batch leaves no trace.
        let mut seen: HashSet<&str> = inner.questions.iter().map(|q| q.id.as_str()).collect();
        for item in &batch {
            if !seen.insert(item.question.id.as_str()) {
                return Err(AppError::Conflict(format!(
                    "Question '{}' already exists",
                    item.question.id
                )));
            }
        }

        let count = batch.len();
        for item in batch {
            inner.questions.push(item.question);
            inner.explanations.extend(item.explanations);
        }
        Ok(count)
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn create_exam(&self, exam: &ExamSession) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        if inner.exams.contains_key(&exam.id) {
            return Err(AppError::Conflict(format!("Exam '{}' already exists", exam.id)));
        }
        inner.exams.insert(exam.id.clone(), exam.clone());
        Ok(())
    }

    async fn find_exam(&self, id: &str) -> Result<Option<ExamSession>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner.exams.get(id).cloned())
    }

    async fn append_answer(&self, answer: NewAnswer) -> Result<AnswerRecord, AppError> {
        let mut inner = self.inner.write().await;
        inner.next_answer_id += 1;
        let record = AnswerRecord {
            id: inner.next_answer_id,
            exam_id: answer.exam_id,
            question_id: answer.question_id,
            selected: answer.selected,
            is_correct: answer.is_correct,
            answered_at: answer.answered_at,
        };
        inner.answers.push(record.clone());
        Ok(record)
    }

    async fn list_answers(&self, exam_id: &str) -> Result<Vec<AnswerRecord>, AppError> {
        let inner = self.inner.read().await;
        let mut answers: Vec<AnswerRecord> = inner
            .answers
            .iter()
            .filter(|a| a.exam_id == exam_id)
            .cloned()
            .collect();
        answers.sort_by(|a, b| a.answered_at.cmp(&b.answered_at).then(a.id.cmp(&b.id)));
        Ok(answers)
    }

    async fn record_finish(
        &self,
        exam_id: &str,
        finished_at: DateTime<Utc>,
        score_percent: f64,
    ) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        let exam = inner
            .exams
            .get_mut(exam_id)
            .ok_or_else(|| AppError::NotFound(format!("Exam '{}' not found", exam_id)))?;
        exam.finished_at = Some(finished_at);
        exam.score_percent = Some(score_percent);
        Ok(())
    }

    async fn list_exams_by_owner(
        &self,
        owner: &str,
        limit: i64,
        offset: i64,
    ) -> Result<ExamPage, AppError> {
        let inner = self.inner.read().await;
        let mut owned: Vec<&ExamSession> = inner
            .exams
            .values()
            .filter(|e| e.owner.as_deref() == Some(owner))
            .collect();
        owned.sort_by(|a, b| b.started_at.cmp(&a.started_at).then(b.id.cmp(&a.id)));

        let items = owned
            .iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .map(|e| ExamSummary {
                id: e.id.clone(),
                started_at: e.started_at,
                finished_at: e.finished_at,
                duration_seconds: e.duration_seconds,
                score_percent: e.score_percent,
                question_count: e.questions.len() as i64,
            })
            .collect();

        Ok(ExamPage {
            total: owned.len() as i64,
            items,
        })
    }

    async fn owner_activity(&self, owner: &str) -> Result<OwnerActivity, AppError> {
        let inner = self.inner.read().await;
        let owned: HashSet<&str> = inner
            .exams
            .values()
            .filter(|e| e.owner.as_deref() == Some(owner))
            .map(|e| e.id.as_str())
            .collect();

        let exams = inner
            .exams
            .values()
            .filter(|e| owned.contains(e.id.as_str()))
            .map(|e| ExamOutcome {
                finished_at: e.finished_at,
                score_percent: e.score_percent,
            })
            .collect();
        let answers = inner
            .answers
            .iter()
            .filter(|a| owned.contains(a.exam_id.as_str()))
            .map(|a| AnswerOutcome {
                is_correct: a.is_correct,
                answered_at: a.answered_at,
            })
            .collect();

        Ok(OwnerActivity { exams, answers })
    }
}
