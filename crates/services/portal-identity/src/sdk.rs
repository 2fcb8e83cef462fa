//! The narrow interface the application needs from an identity SDK.

use crate::error::Result;
use crate::types::{Account, AuthenticationResult, TokenRequest};
use async_trait::async_trait;

/// Public-client identity SDK capabilities.
///
/// The SDK owns the account and token cache. The application reads it through
/// `get_all_accounts`/`get_active_account` and changes it only through the
/// other methods. Redirect methods navigate away; their futures resolve once
/// the navigation has been handed off, not when the user comes back.
#[async_trait]
pub trait IdentitySdk: Send + Sync {
    /// Prepares the SDK runtime. Repeated calls are no-ops.
    async fn initialize(&self) -> Result<()>;

    /// Completes a sign-in if the current location is a redirect callback.
    async fn handle_redirect_promise(&self) -> Result<Option<AuthenticationResult>>;

    /// All accounts in the cache, in cache order.
    fn get_all_accounts(&self) -> Vec<Account>;

    /// Designates the active account; `None` clears it.
    fn set_active_account(&self, account: Option<&Account>);

    fn get_active_account(&self) -> Option<Account>;

    /// Returns a token from the cache or a refresh grant, without interaction.
    async fn acquire_token_silent(&self, request: &TokenRequest) -> Result<AuthenticationResult>;

    /// Starts an interactive token request by redirecting.
    async fn acquire_token_redirect(&self, request: &TokenRequest) -> Result<()>;

    /// Starts an interactive sign-in by redirecting.
    async fn login_redirect(&self, request: &TokenRequest) -> Result<()>;

    /// Forgets cached accounts and redirects to the provider's sign-out page.
    async fn logout_redirect(&self) -> Result<()>;
}
