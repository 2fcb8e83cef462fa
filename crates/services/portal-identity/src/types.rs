//! Account and token types shared by the SDK interface and its callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A signed-in identity as known to the SDK cache.
///
/// The application only ever holds clones; the SDK owns the cached record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Stable cache key, `<object id>.<tenant id>`.
    pub home_account_id: String,
    /// Preferred username, usually the e-mail address.
    pub username: String,
    pub tenant_id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Scopes requested for a token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenRequest {
    pub scopes: Vec<String>,
}

impl TokenRequest {
    #[must_use]
    pub fn new<I, S>(scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            scopes: scopes.into_iter().map(Into::into).collect(),
        }
    }
}

/// Outcome of a completed redirect or a silent acquisition.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthenticationResult {
    pub access_token: String,
    pub account: Account,
    pub scopes: Vec<String>,
    pub expires_on: DateTime<Utc>,
}

impl std::fmt::Debug for AuthenticationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticationResult")
            .field("access_token", &"<redacted>")
            .field("account", &self.account)
            .field("scopes", &self.scopes)
            .field("expires_on", &self.expires_on)
            .finish()
    }
}
