//! PostgreSQL storage (sqlx).

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, postgres::PgPoolOptions, types::Json};

use super::{QuestionBank, SessionStore};
use crate::{
    error::AppError,
    models::{
        exam::{AnswerRecord, ExamPage, ExamSession, ExamSummary, NewAnswer, QuestionRef},
        question::{Explanation, NewQuestion, Question, QuestionOption},
        stats::{AnswerOutcome, ExamOutcome, OwnerActivity},
    },
};

const CONNECT_RETRIES: u32 = 5;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

#[derive(FromRow)]
struct QuestionRow {
    id: String,
    text_en: String,
    text_pl: Option<String>,
    multi_select: bool,
}

#[derive(FromRow)]
struct OptionRow {
    question_id: String,
    option_key: String,
    text_en: String,
    text_pl: Option<String>,
    is_correct: bool,
}

#[derive(FromRow)]
struct ExplanationRow {
    question_id: String,
    option_key: String,
    lang: String,
    text: String,
    url: Option<String>,
}

#[derive(FromRow)]
struct ExamRow {
    id: String,
    owner: Option<String>,
    kind: String,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    duration_seconds: i64,
    score_percent: Option<f64>,
    seed: Option<i64>,
}

#[derive(FromRow)]
struct AnswerRow {
    id: i64,
    exam_id: String,
    question_id: String,
    selected: Json<Vec<String>>,
    is_correct: bool,
    answered_at: DateTime<Utc>,
}

impl From<AnswerRow> for AnswerRecord {
    fn from(row: AnswerRow) -> Self {
        Self {
            id: row.id,
            exam_id: row.exam_id,
            question_id: row.question_id,
            selected: row.selected.0,
            is_correct: row.is_correct,
            answered_at: row.answered_at,
        }
    }
}

#[derive(FromRow)]
struct SummaryRow {
    id: String,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    duration_seconds: i64,
    score_percent: Option<f64>,
    question_count: i64,
}

impl PgStore {
    /// Connects with a small retry loop, for databases that start alongside the app.
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let mut retry_count = 0;
        let pool = loop {
            match PgPoolOptions::new()
                .max_connections(5)
                .acquire_timeout(Duration::from_secs(3))
                .connect(database_url)
                .await
            {
                Ok(pool) => break pool,
                Err(e) => {
                    retry_count += 1;
                    if retry_count > CONNECT_RETRIES {
                        return Err(AppError::InternalServerError(format!(
                            "Failed to connect to database after {} retries: {}",
                            CONNECT_RETRIES, e
                        )));
                    }
                    tracing::warn!(
                        "Database not ready, retrying in 2s... (Attempt {})",
                        retry_count
                    );
                    tokio::time::sleep(Duration::from_secs(2)).await;
                }
            }
        };
        tracing::info!("Database connected...");
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), AppError> {
        tracing::info!("Running migrations...");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Migrations applied successfully.");
        Ok(())
    }

    /// Attaches options to question rows, keeping the row order.
    async fn with_options(&self, rows: Vec<QuestionRow>) -> Result<Vec<Question>, AppError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<String> = rows.iter().map(|r| r.id.clone()).collect();
        let option_rows: Vec<OptionRow> = sqlx::query_as(
            r#"
            SELECT question_id, option_key, text_en, text_pl, is_correct
            FROM options
            WHERE question_id = ANY($1)
            ORDER BY question_id, position
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_question: HashMap<String, Vec<QuestionOption>> = HashMap::new();
        for o in option_rows {
            by_question.entry(o.question_id).or_default().push(QuestionOption {
                key: o.option_key,
                text: o.text_en,
                text_pl: o.text_pl,
                is_correct: o.is_correct,
            });
        }

        Ok(rows
            .into_iter()
            .map(|r| Question {
                options: by_question.remove(&r.id).unwrap_or_default(),
                id: r.id,
                text: r.text_en,
                text_pl: r.text_pl,
                multi_select: r.multi_select,
            })
            .collect())
    }
}

#[async_trait]
impl QuestionBank for PgStore {
    async fn list_all_ids(&self) -> Result<Vec<String>, AppError> {
        let ids: Vec<(String,)> = sqlx::query_as("SELECT id FROM questions ORDER BY seq")
            .fetch_all(&self.pool)
            .await?;
        Ok(ids.into_iter().map(|(id,)| id).collect())
    }

    async fn find_question(&self, id: &str) -> Result<Option<Question>, AppError> {
        let row: Option<QuestionRow> = sqlx::query_as(
            "SELECT id, text_en, text_pl, multi_select FROM questions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.with_options(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_questions(&self, ids: &[String]) -> Result<Vec<Question>, AppError> {
        let rows: Vec<QuestionRow> = sqlx::query_as(
            "SELECT id, text_en, text_pl, multi_select FROM questions WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        self.with_options(rows).await
    }

    async fn list_questions(&self) -> Result<Vec<Question>, AppError> {
        let rows: Vec<QuestionRow> = sqlx::query_as(
            "SELECT id, text_en, text_pl, multi_select FROM questions ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        self.with_options(rows).await
    }

    async fn find_explanations(&self, question_id: &str) -> Result<Vec<Explanation>, AppError> {
        let rows: Vec<ExplanationRow> = sqlx::query_as(
            r#"
            SELECT question_id, option_key, lang, text, url
            FROM explanations
            WHERE question_id = $1
            ORDER BY id
            "#,
        )
        .bind(question_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Explanation {
                question_id: r.question_id,
                option_key: r.option_key,
                lang: r.lang,
                text: r.text,
                url: r.url,
            })
            .collect())
    }

    async fn is_empty(&self) -> Result<bool, AppError> {
        let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS (SELECT 1 FROM questions)")
            .fetch_one(&self.pool)
            .await?;
        Ok(!exists)
    }

    async fn insert_questions(&self, batch: Vec<NewQuestion>) -> Result<usize, AppError> {
        let mut tx = self.pool.begin().await?;

        for item in &batch {
            let q = &item.question;
            sqlx::query(
                "INSERT INTO questions (id, text_en, text_pl, multi_select) VALUES ($1, $2, $3, $4)",
            )
            .bind(&q.id)
            .bind(&q.text)
            .bind(&q.text_pl)
            .bind(q.multi_select)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                let duplicate =
                    matches!(&e, sqlx::Error::Database(db) if db.is_unique_violation());
                if duplicate {
                    AppError::Conflict(format!("Question '{}' already exists", q.id))
                } else {
                    AppError::from(e)
                }
            })?;

            for (position, o) in q.options.iter().enumerate() {
                sqlx::query(
                    r#"
                    INSERT INTO options (question_id, position, option_key, text_en, text_pl, is_correct)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    "#,
                )
                .bind(&q.id)
                .bind(position as i32 + 1)
                .bind(&o.key)
                .bind(&o.text)
                .bind(&o.text_pl)
                .bind(o.is_correct)
                .execute(&mut *tx)
                .await?;
            }

            for e in &item.explanations {
                sqlx::query(
                    r#"
                    INSERT INTO explanations (question_id, option_key, lang, text, url)
                    VALUES ($1, $2, $3, $4, $5)
                    "#,
                )
                .bind(&e.question_id)
                .bind(&e.option_key)
                .bind(&e.lang)
                .bind(&e.text)
                .bind(&e.url)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(batch.len())
    }
}

#[async_trait]
impl SessionStore for PgStore {
    async fn create_exam(&self, exam: &ExamSession) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO exams (id, owner, kind, started_at, finished_at, duration_seconds, score_percent, seed)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&exam.id)
        .bind(&exam.owner)
        .bind(&exam.kind)
        .bind(exam.started_at)
        .bind(exam.finished_at)
        .bind(exam.duration_seconds)
        .bind(exam.score_percent)
        .bind(exam.seed)
        .execute(&mut *tx)
        .await?;

        for r in &exam.questions {
            sqlx::query(
                "INSERT INTO exam_questions (exam_id, question_id, position) VALUES ($1, $2, $3)",
            )
            .bind(&exam.id)
            .bind(&r.question_id)
            .bind(r.position)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn find_exam(&self, id: &str) -> Result<Option<ExamSession>, AppError> {
        let row: Option<ExamRow> = sqlx::query_as(
            r#"
            SELECT id, owner, kind, started_at, finished_at, duration_seconds, score_percent, seed
            FROM exams
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let refs: Vec<(i32, String)> = sqlx::query_as(
            "SELECT position, question_id FROM exam_questions WHERE exam_id = $1 ORDER BY position",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(ExamSession {
            id: row.id,
            owner: row.owner,
            kind: row.kind,
            started_at: row.started_at,
            finished_at: row.finished_at,
            duration_seconds: row.duration_seconds,
            score_percent: row.score_percent,
            seed: row.seed,
            questions: refs
                .into_iter()
                .map(|(position, question_id)| QuestionRef { position, question_id })
                .collect(),
        }))
    }

    async fn append_answer(&self, answer: NewAnswer) -> Result<AnswerRecord, AppError> {
        let row: AnswerRow = sqlx::query_as(
            r#"
            INSERT INTO answers (exam_id, question_id, selected, is_correct, answered_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, exam_id, question_id, selected, is_correct, answered_at
            "#,
        )
        .bind(&answer.exam_id)
        .bind(&answer.question_id)
        .bind(Json(&answer.selected))
        .bind(answer.is_correct)
        .bind(answer.answered_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn list_answers(&self, exam_id: &str) -> Result<Vec<AnswerRecord>, AppError> {
        let rows: Vec<AnswerRow> = sqlx::query_as(
            r#"
            SELECT id, exam_id, question_id, selected, is_correct, answered_at
            FROM answers
            WHERE exam_id = $1
            ORDER BY answered_at ASC, id ASC
            "#,
        )
        .bind(exam_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(AnswerRecord::from).collect())
    }

    async fn record_finish(
        &self,
        exam_id: &str,
        finished_at: DateTime<Utc>,
        score_percent: f64,
    ) -> Result<(), AppError> {
        let result =
            sqlx::query("UPDATE exams SET finished_at = $1, score_percent = $2 WHERE id = $3")
                .bind(finished_at)
                .bind(score_percent)
                .bind(exam_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Exam '{}' not found", exam_id)));
        }
        Ok(())
    }

    async fn list_exams_by_owner(
        &self,
        owner: &str,
        limit: i64,
        offset: i64,
    ) -> Result<ExamPage, AppError> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM exams WHERE owner = $1")
            .bind(owner)
            .fetch_one(&self.pool)
            .await?;

        let rows: Vec<SummaryRow> = sqlx::query_as(
            r#"
            SELECT
                e.id, e.started_at, e.finished_at, e.duration_seconds, e.score_percent,
                (SELECT COUNT(*) FROM exam_questions q WHERE q.exam_id = e.id) AS question_count
            FROM exams e
            WHERE e.owner = $1
            ORDER BY e.started_at DESC, e.id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(owner)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(ExamPage {
            total,
            items: rows
                .into_iter()
                .map(|r| ExamSummary {
                    id: r.id,
                    started_at: r.started_at,
                    finished_at: r.finished_at,
                    duration_seconds: r.duration_seconds,
                    score_percent: r.score_percent,
                    question_count: r.question_count,
                })
                .collect(),
        })
    }

    async fn owner_activity(&self, owner: &str) -> Result<OwnerActivity, AppError> {
        let exams: Vec<(Option<DateTime<Utc>>, Option<f64>)> =
            sqlx::query_as("SELECT finished_at, score_percent FROM exams WHERE owner = $1")
                .bind(owner)
                .fetch_all(&self.pool)
                .await?;

        let answers: Vec<(bool, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT a.is_correct, a.answered_at
            FROM answers a
            JOIN exams e ON e.id = a.exam_id
            WHERE e.owner = $1
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        Ok(OwnerActivity {
            exams: exams
                .into_iter()
                .map(|(finished_at, score_percent)| ExamOutcome {
                    finished_at,
                    score_percent,
                })
                .collect(),
            answers: answers
                .into_iter()
                .map(|(is_correct, answered_at)| AnswerOutcome {
                    is_correct,
                    answered_at,
                })
                .collect(),
        })
    }
}
