//! Token endpoint grants: authorization code and refresh token.

use super::AuthorityConfig;
use crate::error::{IdentityError, Result};
use serde::Deserialize;

/// Successful token endpoint response.
#[derive(Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
    /// Space-separated granted scopes.
    #[serde(default)]
    pub scope: Option<String>,
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct OAuthErrorBody {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Scopes always added to interactive and refresh requests.
pub(crate) const OIDC_SCOPES: &[&str] = &["openid", "profile", "offline_access"];

/// Space-joined request scopes plus the OIDC scopes, without duplicates.
pub(crate) fn scope_param(scopes: &[String]) -> String {
    let mut all: Vec<&str> = scopes.iter().map(String::as_str).collect();
    for s in OIDC_SCOPES {
        if !all.contains(s) {
            all.push(s);
        }
    }
    all.join(" ")
}

pub(crate) async fn exchange_code(
    http: &reqwest::Client,
    authority: &AuthorityConfig,
    code: &str,
    code_verifier: &str,
    scopes: &[String],
) -> Result<TokenResponse> {
    let scope = scope_param(scopes);
    let form = [
        ("grant_type", "authorization_code"),
        ("client_id", authority.client_id.as_str()),
        ("redirect_uri", authority.redirect_uri.as_str()),
        ("code", code),
        ("code_verifier", code_verifier),
        ("scope", scope.as_str()),
    ];
    post_form(http, authority, &form).await
}

pub(crate) async fn refresh(
    http: &reqwest::Client,
    authority: &AuthorityConfig,
    refresh_token: &str,
    scopes: &[String],
) -> Result<TokenResponse> {
    let scope = scope_param(scopes);
    let form = [
        ("grant_type", "refresh_token"),
        ("client_id", authority.client_id.as_str()),
        ("refresh_token", refresh_token),
        ("scope", scope.as_str()),
    ];
    post_form(http, authority, &form).await
}

async fn post_form(
    http: &reqwest::Client,
    authority: &AuthorityConfig,
    form: &[(&str, &str)],
) -> Result<TokenResponse> {
    let response = http
        .post(authority.token_endpoint()?)
        .form(form)
        .send()
        .await?;

    let status = response.status();
    let body = response.bytes().await?;

    if status.is_success() {
        return Ok(serde_json::from_slice(&body)?);
    }

    match serde_json::from_slice::<OAuthErrorBody>(&body) {
        Ok(err) => {
            tracing::debug!(
                status = status.as_u16(),
                code = %err.error,
                "token endpoint rejected grant"
            );
            Err(IdentityError::from_oauth(
                &err.error,
                err.error_description.as_deref().unwrap_or_default(),
            ))
        }
        // Cap the body so a proxy error page does not flood the logs.
        Err(_) => Err(IdentityError::Provider {
            code: format!("http_{}", status.as_u16()),
            description: String::from_utf8_lossy(&body[..body.len().min(400)]).into_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_param_appends_oidc_scopes_once() {
        let scopes = vec!["email".to_string(), "openid".to_string()];
        assert_eq!(scope_param(&scopes), "email openid profile offline_access");
    }

    #[test]
    fn token_response_debug_hides_tokens() {
        let resp: TokenResponse = serde_json::from_value(serde_json::json!({
            "access_token": "at-secret",
            "refresh_token": "rt-secret",
            "expires_in": 3600
        }))
        .unwrap();
        let debug_str = format!("{resp:?}");
        assert!(!debug_str.contains("at-secret"));
        assert!(!debug_str.contains("rt-secret"));
    }
}
