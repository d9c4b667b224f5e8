// src/utils/identity.rs

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, Request, header},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{config::Config, error::AppError};

pub const PUBLIC_ID_HEADER: &str = "x-public-id";
pub const PUBLIC_ID_COOKIE: &str = "sq_uid";
const MAX_PUBLIC_ID_LEN: usize = 64;
/// One year, in seconds.
const COOKIE_MAX_AGE: u64 = 31_536_000;

/// The opaque public id of the caller, or `None` for anonymous requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity(pub Option<String>);

impl Identity {
    pub fn owner(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Fails with `Unauthorized` for anonymous callers.
    pub fn require(&self) -> Result<&str, AppError> {
        self.owner()
            .ok_or_else(|| AppError::Unauthorized("A public id is required".to_string()))
    }
}

/// Where the request's public id came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Header,
    Cookie,
    Minted,
}

/// 1..=64 visible ASCII characters.
pub fn is_valid_public_id(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_PUBLIC_ID_LEN
        && value.bytes().all(|b| b.is_ascii_graphic())
}

fn is_cookie_safe(value: &str) -> bool {
    !value.contains([';', ',', '"', '\\'])
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.trim())
}

fn resolve(headers: &HeaderMap) -> Option<(String, Source)> {
    let (raw, source) = match headers.get(PUBLIC_ID_HEADER) {
        Some(value) => (value.to_str().ok().map(str::trim), Source::Header),
        None => (cookie_value(headers, PUBLIC_ID_COOKIE), Source::Cookie),
    };
    raw.filter(|v| is_valid_public_id(v))
        .map(|v| (v.to_string(), source))
}

/// Header first, then cookie. An invalid header value does not fall back.
pub fn resolve_identity(headers: &HeaderMap) -> Identity {
    Identity(resolve(headers).map(|(id, _)| id))
}

/// `Set-Cookie` value carrying `public_id`, or `None` if the id cannot be
/// stored in a cookie verbatim.
pub fn session_cookie(public_id: &str, secure: bool) -> Option<HeaderValue> {
    if !is_valid_public_id(public_id) || !is_cookie_safe(public_id) {
        return None;
    }
    let attrs = if secure {
        "SameSite=None; Secure"
    } else {
        "SameSite=Lax"
    };
    HeaderValue::from_str(&format!(
        "{PUBLIC_ID_COOKIE}={public_id}; Path=/; Max-Age={COOKIE_MAX_AGE}; HttpOnly; {attrs}"
    ))
    .ok()
}

fn sets_identity_cookie(response: &Response) -> bool {
    let prefix = format!("{PUBLIC_ID_COOKIE}=");
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .any(|v| v.as_bytes().starts_with(prefix.as_bytes()))
}

/// Axum Middleware: attaches an `Identity` to every request.
///
/// Callers without a valid id get a freshly minted one. Minted and
/// header-supplied ids are written back as the `sq_uid` cookie unless the
/// handler already set it.
pub async fn identity_middleware(
    State(config): State<Config>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let (public_id, source) = resolve(req.headers()).unwrap_or_else(|| {
        let minted = Uuid::new_v4().to_string();
        tracing::debug!("Minted public id {}", minted);
        (minted, Source::Minted)
    });
    req.extensions_mut().insert(Identity(Some(public_id.clone())));

    let mut response = next.run(req).await;
    if source != Source::Cookie && !sets_identity_cookie(&response) {
        if let Some(cookie) = session_cookie(&public_id, config.secure_cookies) {
            response.headers_mut().append(header::SET_COOKIE, cookie);
        }
    }
    response
}
