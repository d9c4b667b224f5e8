//! Storage seams of the exam engine.
//!
//! `QuestionBank` is the read-mostly question catalogue, `SessionStore` holds
//! exam sessions and the append-only answer log. Both are implemented by
//! [`postgres::PgStore`] and by [`memory::MemoryStore`].

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    error::AppError,
    models::{
        exam::{AnswerRecord, ExamPage, ExamSession, NewAnswer},
        question::{Explanation, ExplanationMap, ExplanationText, NewQuestion, Question},
        stats::OwnerActivity,
    },
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait QuestionBank: Send + Sync {
    /// All question ids in insertion order.
    async fn list_all_ids(&self) -> Result<Vec<String>, AppError>;

    async fn find_question(&self, id: &str) -> Result<Option<Question>, AppError>;

    /// Questions for the given ids. Unknown ids are absent from the result;
    /// the order of the result is unspecified.
    async fn find_questions(&self, ids: &[String]) -> Result<Vec<Question>, AppError>;

    /// Every question, ordered by id.
    async fn list_questions(&self) -> Result<Vec<Question>, AppError>;

    /// Every explanation of a question, in all languages.
    async fn find_explanations(&self, question_id: &str) -> Result<Vec<Explanation>, AppError>;

    async fn is_empty(&self) -> Result<bool, AppError>;

    /// Inserts a batch of questions with options and explanations.
    /// All or nothing: an id that already exists rejects the whole batch.
    async fn insert_questions(&self, batch: Vec<NewQuestion>) -> Result<usize, AppError>;

    async fn get(&self, id: &str) -> Result<Question, AppError> {
        self.find_question(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Question '{}' not found", id)))
    }

    /// Ground truth for grading. Fails with `NotFound` for unknown ids.
    async fn correct_keys(&self, id: &str) -> Result<BTreeSet<String>, AppError> {
        Ok(self.get(id).await?.correct_keys())
    }

    /// Explanations of a question for one exact language code.
    async fn explanations(&self, id: &str, lang: &str) -> Result<ExplanationMap, AppError> {
        Ok(self
            .find_explanations(id)
            .await?
            .iter()
            .filter(|e| e.lang == lang)
            .map(|e| (e.option_key.clone(), ExplanationText::from(e)))
            .collect())
    }
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persists a session and all its question refs atomically.
    async fn create_exam(&self, exam: &ExamSession) -> Result<(), AppError>;

    /// Loads a session with its question refs sorted by position.
    async fn find_exam(&self, id: &str) -> Result<Option<ExamSession>, AppError>;

    /// Appends to the answer log and returns the stored record.
    async fn append_answer(&self, answer: NewAnswer) -> Result<AnswerRecord, AppError>;

    /// The answer log of a session, ordered by (answered_at, id).
    async fn list_answers(&self, exam_id: &str) -> Result<Vec<AnswerRecord>, AppError>;

    /// Overwrites the finish timestamp and score of a session.
    async fn record_finish(
        &self,
        exam_id: &str,
        finished_at: DateTime<Utc>,
        score_percent: f64,
    ) -> Result<(), AppError>;

    /// Sessions of an owner, newest first.
    async fn list_exams_by_owner(
        &self,
        owner: &str,
        limit: i64,
        offset: i64,
    ) -> Result<ExamPage, AppError>;

    async fn owner_activity(&self, owner: &str) -> Result<OwnerActivity, AppError>;
}

/// Everything the service needs from storage.
pub trait Store: QuestionBank + SessionStore {}

impl<T: QuestionBank + SessionStore> Store for T {}
