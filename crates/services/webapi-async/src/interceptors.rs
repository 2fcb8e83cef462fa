//! Steps every request and error response passes through.

use crate::error::{ErrorData, ResponseError};
use portal_identity::TokenProvider;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};

/// Body type the caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    Json,
    Binary,
}

/// Adds `Authorization: Bearer <token>` unless the token is empty.
///
/// The header is marked sensitive so it never appears in debug output.
pub fn attach_bearer(headers: &mut HeaderMap, token: &str) -> Result<(), ResponseError> {
    let token = token.trim();
    if token.is_empty() {
        return Ok(());
    }
    let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|_| ResponseError::Config("access token is not a valid header value".into()))?;
    value.set_sensitive(true);
    headers.insert(AUTHORIZATION, value);
    Ok(())
}

/// Normalizes an error response body.
///
/// Binary requests keep their raw bytes unless the server labelled the body
/// as JSON and it parses. JSON requests parse the body, falling back to text.
pub fn normalize_error_data(
    expect: Expect,
    content_type: Option<&str>,
    body: &[u8],
) -> ErrorData {
    if body.is_empty() {
        return ErrorData::Empty;
    }
    match expect {
        Expect::Binary => {
            let is_json = content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains("json"));
            if is_json && let Ok(value) = serde_json::from_slice(body) {
                return ErrorData::Json(value);
            }
            ErrorData::Binary(bytes::Bytes::copy_from_slice(body))
        }
        Expect::Json => serde_json::from_slice(body).map_or_else(
            |_| ErrorData::Text(String::from_utf8_lossy(body).into_owned()),
            ErrorData::Json,
        ),
    }
}

/// Called on 401: one token acquisition so the provider can refresh its cache
/// or start an interactive sign-in. The token itself is discarded.
pub async fn prime_on_unauthorized(tokens: &dyn TokenProvider, scopes: &[String]) {
    tracing::warn!("web API answered 401; priming token acquisition");
    let _ = tokens.get_access_token(scopes).await;
}
