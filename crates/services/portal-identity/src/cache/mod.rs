//! Token cache persisted between runs.
//!
//! Plays the role browser local storage plays for a web SDK: accounts, their
//! refresh and access tokens, and the one redirect request awaiting its
//! callback.

mod file;
mod memory;

pub use file::FileCacheStore;
pub use memory::MemoryCacheStore;

use crate::error::Result;
use crate::types::Account;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persistence backend for [`CacheSnapshot`].
pub trait CacheStore: Send + Sync {
    /// Loads the snapshot; a missing cache is an empty snapshot.
    fn load(&self) -> Result<CacheSnapshot>;

    fn save(&self, snapshot: &CacheSnapshot) -> Result<()>;
}

/// Whole cache contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSnapshot {
    #[serde(default)]
    pub accounts: Vec<CachedAccount>,
    #[serde(default)]
    pub active_account_id: Option<String>,
    #[serde(default)]
    pub pending: Option<PendingRedirect>,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedAccount {
    pub account: Account,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub access_tokens: Vec<CachedAccessToken>,
}

impl std::fmt::Debug for CachedAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedAccount")
            .field("account", &self.account)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("access_tokens", &self.access_tokens)
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedAccessToken {
    pub secret: String,
    pub scopes: Vec<String>,
    pub expires_on: DateTime<Utc>,
}

impl std::fmt::Debug for CachedAccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedAccessToken")
            .field("secret", &"<redacted>")
            .field("scopes", &self.scopes)
            .field("expires_on", &self.expires_on)
            .finish()
    }
}

impl CachedAccessToken {
    /// Whether this token grants every scope in `requested` (case-insensitive).
    pub fn covers(&self, requested: &[String]) -> bool {
        requested
            .iter()
            .all(|r| self.scopes.iter().any(|s| s.eq_ignore_ascii_case(r)))
    }
}

/// Why the pending redirect was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectKind {
    Login,
    AcquireToken,
}

/// Redirect request waiting for its callback.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRedirect {
    pub state: String,
    pub code_verifier: String,
    pub scopes: Vec<String>,
    pub kind: RedirectKind,
}

impl std::fmt::Debug for PendingRedirect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingRedirect")
            .field("state", &self.state)
            .field("code_verifier", &"<redacted>")
            .field("scopes", &self.scopes)
            .field("kind", &self.kind)
            .finish()
    }
}

impl CacheSnapshot {
    pub fn find(&self, home_account_id: &str) -> Option<&CachedAccount> {
        self.accounts
            .iter()
            .find(|a| a.account.home_account_id == home_account_id)
    }

    pub fn find_mut(&mut self, home_account_id: &str) -> Option<&mut CachedAccount> {
        self.accounts
            .iter_mut()
            .find(|a| a.account.home_account_id == home_account_id)
    }

    /// Active account record, if the active id still names a cached account.
    pub fn active(&self) -> Option<&CachedAccount> {
        self.active_account_id.as_deref().and_then(|id| self.find(id))
    }

    /// Inserts or replaces the record for `account`, keeping cache order.
    pub fn upsert_account(&mut self, account: Account) -> &mut CachedAccount {
        let id = account.home_account_id.clone();
        let idx = match self
            .accounts
            .iter()
            .position(|a| a.account.home_account_id == id)
        {
            Some(idx) => {
                self.accounts[idx].account = account;
                idx
            }
            None => {
                self.accounts.push(CachedAccount {
                    account,
                    refresh_token: None,
                    access_tokens: vec![],
                });
                self.accounts.len() - 1
            }
        };
        &mut self.accounts[idx]
    }
}

impl CachedAccount {
    /// Newest token covering `scopes` that is still valid at `not_before`.
    pub fn usable_token(
        &self,
        scopes: &[String],
        not_before: DateTime<Utc>,
    ) -> Option<&CachedAccessToken> {
        self.access_tokens
            .iter()
            .filter(|t| t.expires_on > not_before && t.covers(scopes))
            .max_by_key(|t| t.expires_on)
    }

    /// Stores `token`, dropping expired entries and entries with the same scopes.
    pub fn store_token(&mut self, token: CachedAccessToken, now: DateTime<Utc>) {
        self.access_tokens
            .retain(|t| t.expires_on > now && t.scopes != token.scopes);
        self.access_tokens.push(token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn account(id: &str) -> Account {
        Account {
            home_account_id: id.into(),
            username: format!("{id}@contoso.com"),
            tenant_id: "tenant".into(),
            name: None,
        }
    }

    fn token(secret: &str, scopes: &[&str], expires_on: DateTime<Utc>) -> CachedAccessToken {
        CachedAccessToken {
            secret: secret.into(),
            scopes: scopes.iter().map(|s| (*s).to_string()).collect(),
            expires_on,
        }
    }

    #[test]
    fn upsert_keeps_order_and_replaces() {
        let mut snap = CacheSnapshot::default();
        snap.upsert_account(account("a"));
        snap.upsert_account(account("b"));
        let mut renamed = account("a");
        renamed.name = Some("Alice".into());
        snap.upsert_account(renamed);

        assert_eq!(snap.accounts.len(), 2);
        assert_eq!(snap.accounts[0].account.name.as_deref(), Some("Alice"));
    }

    #[test]
    fn active_requires_cached_account() {
        let mut snap = CacheSnapshot::default();
        snap.active_account_id = Some("ghost".into());
        assert!(snap.active().is_none());

        snap.upsert_account(account("ghost"));
        assert!(snap.active().is_some());
    }

    #[test]
    fn usable_token_checks_scopes_and_expiry() {
        let now = Utc::now();
        let mut cached = CachedAccount {
            account: account("a"),
            refresh_token: None,
            access_tokens: vec![],
        };
        cached.store_token(
            token("old", &["api://x/read"], now - Duration::minutes(1)),
            now - Duration::hours(1),
        );
        cached.store_token(
            token("fresh", &["api://x/read", "email"], now + Duration::hours(1)),
            now,
        );

        let requested = vec!["EMAIL".to_string()];
        assert_eq!(cached.usable_token(&requested, now).unwrap().secret, "fresh");
        assert!(cached.usable_token(&["other".to_string()], now).is_none());
        assert!(
            cached
                .usable_token(&requested, now + Duration::hours(2))
                .is_none()
        );
        assert_eq!(cached.access_tokens.len(), 1, "expired token dropped on store");
    }

    #[test]
    fn debug_redacts_secrets() {
        let cached = CachedAccount {
            account: account("a"),
            refresh_token: Some("refresh-secret".into()),
            access_tokens: vec![token("access-secret", &["email"], Utc::now())],
        };
        let debug_str = format!("{cached:?}");
        assert!(!debug_str.contains("refresh-secret"));
        assert!(!debug_str.contains("access-secret"));
    }
}
