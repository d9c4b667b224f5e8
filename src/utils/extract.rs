// src/utils/extract.rs

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::AppError;

/// `Json<T>` that also runs `validator` rules before the handler sees `T`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e: JsonRejection| AppError::BadRequest(e.body_text()))?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

/// Parses an optional JSON body: empty (or whitespace) means `T::default()`.
pub fn optional_json<T>(body: &[u8]) -> Result<T, AppError>
where
    T: DeserializeOwned + Validate + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    let value: T = serde_json::from_slice(body)?;
    value.validate()?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::exam::StartExamRequest;

    #[test]
    fn test_optional_json_empty_body() {
        let req: StartExamRequest = optional_json(b"").unwrap();
        assert!(req.count.is_none());
        let req: StartExamRequest = optional_json(b"  \n").unwrap();
        assert!(req.seed.is_none());
    }

    #[test]
    fn test_optional_json_parses_and_validates() {
        let req: StartExamRequest = optional_json(br#"{"count": 2, "seed": 42}"#).unwrap();
        assert_eq!(req.count, Some(2));
        assert_eq!(req.seed, Some(42));

        let req: StartExamRequest = optional_json(br#"{"count": 5000}"#).unwrap();
        assert_eq!(req.count, Some(5000));

        let err = optional_json::<StartExamRequest>(b"{nope").unwrap_err();
        assert_eq!(err.kind(), "invalid_input");
    }
}
