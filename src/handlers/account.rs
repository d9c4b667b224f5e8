// src/handlers/account.rs

use axum::{
    Extension, Json,
    extract::State,
    http::header,
    response::IntoResponse,
};

use crate::{
    config::Config,
    error::AppError,
    models::account::{ExportKeyResponse, RestoreRequest, RestoreResponse},
    utils::{
        extract::ValidatedJson,
        identity::{Identity, session_cookie},
    },
};

/// Echoes the caller's public id so it can be restored on another device.
pub async fn export_key(
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, AppError> {
    let public_id = identity.require()?.to_string();
    Ok(Json(ExportKeyResponse { public_id }))
}

/// Re-sets the identity cookie to a previously exported public id.
pub async fn restore(
    State(config): State<Config>,
    ValidatedJson(payload): ValidatedJson<RestoreRequest>,
) -> Result<impl IntoResponse, AppError> {
    let public_id = payload.public_id.trim();
    let cookie = session_cookie(public_id, config.secure_cookies).ok_or_else(|| {
        AppError::BadRequest("Public id cannot be stored in a cookie".to_string())
    })?;
    tracing::info!("Restored public id {}", public_id);
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(RestoreResponse { status: "restored" }),
    ))
}
