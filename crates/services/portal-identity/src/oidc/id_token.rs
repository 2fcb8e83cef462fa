//! ID-token claim decoding.
//!
//! The ID token arrives directly from the token endpoint over TLS in response
//! to our own code exchange, so only the claims are read; the signature is
//! not verified here.

use crate::error::{IdentityError, Result};
use crate::types::Account;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::Deserialize;

/// Claims used to build an [`Account`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdTokenClaims {
    #[serde(default)]
    pub oid: Option<String>,
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub tid: Option<String>,
    #[serde(default)]
    pub preferred_username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Decodes the payload segment of a compact JWT.
pub fn decode_id_token(token: &str) -> Result<IdTokenClaims> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| IdentityError::Redirect("malformed id token".into()))?;
    // Some issuers pad the segment even though JWTs should not be padded.
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| IdentityError::Redirect(format!("id token is not base64url: {e}")))?;
    Ok(serde_json::from_slice(&bytes)?)
}

impl IdTokenClaims {
    /// Account for these claims; requires a subject (`oid` or `sub`).
    pub fn into_account(self) -> Result<Account> {
        let object_id = self
            .oid
            .or(self.sub)
            .ok_or_else(|| IdentityError::Redirect("id token has no subject".into()))?;
        let tenant_id = self.tid.unwrap_or_default();
        Ok(Account {
            home_account_id: format!("{object_id}.{tenant_id}"),
            username: self.preferred_username.or(self.email).unwrap_or_default(),
            tenant_id,
            name: self.name,
        })
    }
}
