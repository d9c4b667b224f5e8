// src/models/account.rs

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::utils::identity::is_valid_public_id;

/// DTO for re-attaching a browser to an existing public id.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RestoreRequest {
    #[validate(custom(function = validate_public_id))]
    pub public_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportKeyResponse {
    pub public_id: String,
}

#[derive(Debug, Serialize)]
pub struct RestoreResponse {
    pub status: &'static str,
}

fn validate_public_id(value: &str) -> Result<(), ValidationError> {
    if is_valid_public_id(value.trim()) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_public_id"))
    }
}
