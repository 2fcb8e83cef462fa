//! Application-facing identity client.

use crate::error::Result;
use crate::provider::TokenProvider;
use crate::sdk::IdentitySdk;
use crate::types::{Account, TokenRequest};
use async_trait::async_trait;
use std::sync::Arc;

/// Wraps an [`IdentitySdk`] with the sign-in and token policies of the app.
#[derive(Clone)]
pub struct IdentityClient {
    sdk: Arc<dyn IdentitySdk>,
    scopes: Vec<String>,
}

impl std::fmt::Debug for IdentityClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityClient")
            .field("scopes", &self.scopes)
            .finish_non_exhaustive()
    }
}

impl IdentityClient {
    /// Creates a client over `sdk`; `scopes` are used for sign-in requests.
    pub fn new(sdk: Arc<dyn IdentitySdk>, scopes: Vec<String>) -> Self {
        Self { sdk, scopes }
    }

    /// Default scopes requested at sign-in.
    #[must_use]
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// Underlying SDK, for start-up code that needs the raw capabilities.
    #[must_use]
    pub fn sdk(&self) -> &Arc<dyn IdentitySdk> {
        &self.sdk
    }

    /// Prepares the SDK. Must complete before any other call; idempotent.
    pub async fn initialize(&self) -> Result<()> {
        self.sdk.initialize().await
    }

    /// Establishes an active account, redirecting to sign in if none is known.
    ///
    /// Returns `Ok(true)` when an account is now active. Returns `Ok(false)`
    /// after starting the login redirect; the sign-in completes on the next
    /// load, when [`IdentitySdk::handle_redirect_promise`] sees the callback.
    pub async fn login(&self) -> Result<bool> {
        match self.sdk.handle_redirect_promise().await {
            Ok(Some(result)) => {
                tracing::info!(username = %result.account.username, "redirect sign-in completed");
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("redirect response could not be processed: {e}"),
        }

        let accounts = self.sdk.get_all_accounts();
        if let Some(first) = accounts.first() {
            self.sdk.set_active_account(Some(first));
            tracing::debug!(
                username = %first.username,
                accounts = accounts.len(),
                "active account selected"
            );
            return Ok(true);
        }

        tracing::info!("no cached account; redirecting to sign in");
        self.sdk
            .login_redirect(&TokenRequest::new(self.scopes.iter().cloned()))
            .await?;
        Ok(false)
    }

    /// Acquires a token for `scopes`, silently when possible.
    ///
    /// Falls back to an interactive redirect when the provider requires
    /// interaction; the redirect produces no token, so the empty string is
    /// returned. Any other failure is logged and also yields the empty string.
    pub async fn get_access_token(&self, scopes: &[String]) -> String {
        let request = TokenRequest::new(scopes.iter().cloned());

        match self.sdk.acquire_token_silent(&request).await {
            Ok(result) => return result.access_token,
            Err(e) if e.is_interaction_required() => {
                tracing::info!("silent token acquisition needs interaction; redirecting: {e}");
                if let Err(e) = self.sdk.acquire_token_redirect(&request).await {
                    tracing::error!("token redirect failed: {e}");
                }
            }
            Err(e) => tracing::error!("silent token acquisition failed: {e}"),
        }

        String::new()
    }

    /// Currently active account, if any.
    pub fn get_active_account(&self) -> Option<Account> {
        self.sdk.get_active_account()
    }

    /// Signs out through the provider. Failures are logged, not returned.
    pub async fn logout(&self) {
        if let Err(e) = self.sdk.logout_redirect().await {
            tracing::error!("logout redirect failed: {e}");
        }
    }
}

#[async_trait]
impl TokenProvider for IdentityClient {
    async fn get_access_token(&self, scopes: &[String]) -> String {
        Self::get_access_token(self, scopes).await
    }
}
