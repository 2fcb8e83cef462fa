//! Test-only token providers.

use async_trait::async_trait;
use parking_lot::Mutex;
use portal_identity::TokenProvider;

/// Hands out a fixed token and records every request for one.
#[derive(Debug, Default)]
pub struct StaticTokenProvider {
    token: String,
    requested: Mutex<Vec<Vec<String>>>,
}

impl StaticTokenProvider {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            requested: Mutex::new(Vec::new()),
        }
    }

    /// Provider that never has a token.
    #[must_use]
    pub fn empty() -> Self {
        Self::new("")
    }

    pub fn calls(&self) -> usize {
        self.requested.lock().len()
    }

    /// Scopes passed to each `get_access_token` call, in order.
    pub fn requested_scopes(&self) -> Vec<Vec<String>> {
        self.requested.lock().clone()
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn get_access_token(&self, scopes: &[String]) -> String {
        self.requested.lock().push(scopes.to_vec());
        self.token.clone()
    }
}
