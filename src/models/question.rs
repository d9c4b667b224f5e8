// src/models/question.rs

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// A question of the bank together with its ordered options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,

    /// English display text.
    pub text: String,

    /// Polish display text, when the bank provides one.
    pub text_pl: Option<String>,

    /// Whether more than one option may be correct.
    pub multi_select: bool,

    pub options: Vec<QuestionOption>,
}

impl Question {
    /// The set of option keys flagged as correct.
    /// An empty set means the bank is inconsistent for this question.
    pub fn correct_keys(&self) -> BTreeSet<String> {
        self.options
            .iter()
            .filter(|o| o.is_correct)
            .map(|o| o.key.clone())
            .collect()
    }

    /// Public view of the question (no correctness flags).
    pub fn to_public(&self) -> PublicQuestion {
        PublicQuestion {
            id: self.id.clone(),
            text: self.text.clone(),
            multi_select: self.multi_select,
            options: self
                .options
                .iter()
                .map(|o| PublicOption {
                    id: o.key.clone(),
                    text: o.text.clone(),
                })
                .collect(),
        }
    }
}

/// One answer option. `key` is the canonical lowercase key ("a".."d").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOption {
    pub key: String,
    pub text: String,
    pub text_pl: Option<String>,
    pub is_correct: bool,
}

/// Explanation of one option in one language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Explanation {
    pub question_id: String,
    pub option_key: String,
    pub lang: String,
    pub text: String,
    pub url: Option<String>,
}

/// Explanation payload as sent to clients, keyed by option key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplanationText {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl From<&Explanation> for ExplanationText {
    fn from(e: &Explanation) -> Self {
        Self {
            text: e.text.clone(),
            url: e.url.clone(),
        }
    }
}

/// Option key -> explanation, for a single language.
pub type ExplanationMap = BTreeMap<String, ExplanationText>;

/// A question plus its explanations, as written by the ingestion batch.
#[derive(Debug, Clone, PartialEq)]
pub struct NewQuestion {
    pub question: Question,
    pub explanations: Vec<Explanation>,
}

/// DTO for sending a question to the client (excludes correctness).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicQuestion {
    pub id: String,
    pub text: String,
    pub multi_select: bool,
    pub options: Vec<PublicOption>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublicOption {
    pub id: String,
    pub text: String,
}

/// Canonical form of an option key: trimmed and lowercased.
pub fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}
