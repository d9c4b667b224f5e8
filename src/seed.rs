//! Question-bank ingestion from a JSON seed file.
//!
//! Accepts either a bare array of questions or `{"questions": [...]}`. The
//! whole file is validated first and then written with a single
//! `insert_questions` call, so a bad file leaves the bank untouched.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;
use validator::Validate;

use crate::{
    error::AppError,
    models::question::{Explanation, NewQuestion, Question, QuestionOption, normalize_key},
    store::QuestionBank,
    utils::html::clean_html,
};

static QUESTION_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.:-]{1,64}$").expect("valid question id regex"));

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SeedFile {
    Wrapped { questions: Vec<SeedQuestion> },
    Bare(Vec<SeedQuestion>),
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SeedQuestion {
    #[validate(regex(path = *QUESTION_ID, message = "Question id must be 1-64 chars of [A-Za-z0-9_.:-]"))]
    pub id: String,
    #[validate(length(min = 1, max = 4000))]
    pub question_text: String,
    #[validate(length(max = 4000))]
    pub question_text_pl: Option<String>,
    #[serde(default)]
    pub multi_select: bool,
    #[validate(length(min = 1, max = 10), nested)]
    pub options: Vec<SeedOption>,
    #[validate(length(min = 1))]
    pub correct_option_ids: Vec<String>,
    #[serde(default)]
    #[validate(nested)]
    pub options_explanation: SeedExplanations,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SeedOption {
    #[validate(length(min = 1, max = 4))]
    pub id: String,
    #[validate(length(min = 1, max = 2000))]
    pub text: String,
    pub text_pl: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct SeedExplanations {
    #[serde(default)]
    #[validate(nested)]
    pub en: Vec<SeedExplanation>,
    #[serde(default)]
    #[validate(nested)]
    pub pl: Vec<SeedExplanation>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct SeedExplanation {
    #[validate(length(min = 1, max = 4))]
    pub id: String,
    #[validate(length(max = 4000))]
    pub text: String,
    #[serde(default)]
    #[validate(custom(function = validate_explanation_url))]
    pub url: String,
}

fn validate_explanation_url(url: &str) -> Result<(), validator::ValidationError> {
    let url = url.trim();
    if url.is_empty() {
        return Ok(());
    }
    match Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        _ => Err(validator::ValidationError::new("invalid_explanation_url")),
    }
}

/// Parses and validates a seed document into insertable questions.
pub fn parse_seed(raw: &str) -> Result<Vec<NewQuestion>, AppError> {
    let questions = match serde_json::from_str::<SeedFile>(raw) {
        Ok(SeedFile::Wrapped { questions }) | Ok(SeedFile::Bare(questions)) => questions,
        Err(e) => return Err(AppError::BadRequest(format!("Invalid seed file: {}", e))),
    };

    let mut seen = HashSet::new();
    let mut duplicates = BTreeSet::new();
    for q in &questions {
        if !seen.insert(q.id.as_str()) {
            duplicates.insert(q.id.clone());
        }
    }
    if !duplicates.is_empty() {
        return Err(AppError::BadRequest(format!(
            "Duplicate question ids in seed file: {:?}",
            duplicates
        )));
    }

    questions.into_iter().map(into_new_question).collect()
}

fn into_new_question(input: SeedQuestion) -> Result<NewQuestion, AppError> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(format!("Question '{}': {}", input.id, e)))?;

    let mut keys = HashSet::new();
    for o in &input.options {
        if !keys.insert(normalize_key(&o.id)) {
            return Err(AppError::BadRequest(format!(
                "Question '{}': duplicate option key '{}'",
                input.id, o.id
            )));
        }
    }

    let correct: BTreeSet<String> = input.correct_option_ids.iter().map(|k| normalize_key(k)).collect();
    if let Some(unknown) = correct.iter().find(|k| !keys.contains(*k)) {
        return Err(AppError::BadRequest(format!(
            "Question '{}': correct option '{}' is not among its options",
            input.id, unknown
        )));
    }

    let question_id = &input.id;
    let explanations = [("en", &input.options_explanation.en), ("pl", &input.options_explanation.pl)]
        .into_iter()
        .flat_map(|(lang, items)| {
            items.iter().map(move |e| Explanation {
                question_id: question_id.clone(),
                option_key: normalize_key(&e.id),
                lang: lang.to_string(),
                text: clean_html(&e.text),
                url: Some(e.url.trim().to_string()).filter(|u| !u.is_empty()),
            })
        })
        .collect();

    let options = input
        .options
        .iter()
        .map(|o| {
            let key = normalize_key(&o.id);
            QuestionOption {
                is_correct: correct.contains(&key),
                key,
                text: clean_html(&o.text),
                text_pl: o.text_pl.as_deref().map(clean_html),
            }
        })
        .collect();

    Ok(NewQuestion {
        question: Question {
            id: input.id.clone(),
            text: clean_html(&input.question_text),
            text_pl: input.question_text_pl.as_deref().map(clean_html),
            multi_select: input.multi_select,
            options,
        },
        explanations,
    })
}

/// Loads `path` into the bank in one batch. Returns the number of questions.
pub async fn seed_from_file<B>(bank: &B, path: &Path) -> Result<usize, AppError>
where
    B: QuestionBank + ?Sized,
{
    let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
        AppError::InternalServerError(format!("Failed to read seed file {}: {}", path.display(), e))
    })?;
    let batch = parse_seed(&raw)?;
    bank.insert_questions(batch).await
}

/// Seeds the bank at boot when it is empty and the seed file exists.
pub async fn seed_if_empty<B>(bank: &B, path: &Path) -> Result<Option<usize>, AppError>
where
    B: QuestionBank + ?Sized,
{
    if !bank.is_empty().await? {
        return Ok(None);
    }
    let exists = tokio::fs::try_exists(path).await.map_err(|e| {
        AppError::InternalServerError(format!("Failed to check seed file {}: {}", path.display(), e))
    })?;
    if !exists {
        tracing::info!("No seed file at {}; running with empty bank", path.display());
        return Ok(None);
    }
    let count = seed_from_file(bank, path).await?;
    tracing::info!("Seeded {} questions from {}", count, path.display());
    Ok(Some(count))
}
