// src/models/learn.rs

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{exam::validate_option_keys, question::ExplanationMap};

/// Language used when a learning request does not name one.
pub const DEFAULT_LANGUAGE: &str = "en";

/// DTO for checking an answer in learning mode.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateRequest {
    #[validate(length(min = 1, max = 64))]
    pub question_id: String,
    #[validate(length(max = 16), custom(function = validate_option_keys))]
    pub selected_option_keys: Vec<String>,
    #[validate(length(max = 8))]
    pub language: Option<String>,
}

impl EvaluateRequest {
    /// Requested language code, lowercased, falling back to English.
    pub fn language_code(&self) -> String {
        match self.language.as_deref().map(str::trim) {
            Some(lang) if !lang.is_empty() => lang.to_lowercase(),
            _ => DEFAULT_LANGUAGE.to_string(),
        }
    }
}

/// Learning-mode verdict. Always reveals correctness.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateResponse {
    pub is_correct: bool,
    pub correct_option_keys: BTreeSet<String>,
    pub explanations_by_option_key: ExplanationMap,
}
