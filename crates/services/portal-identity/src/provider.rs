//! Token provider trait consumed by HTTP clients.

use async_trait::async_trait;

/// Supplies bearer tokens for outgoing requests.
///
/// An empty string means no token is available right now, either because an
/// interactive redirect is in progress or because acquisition failed. Callers
/// send the request unauthenticated in that case.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn get_access_token(&self, scopes: &[String]) -> String;
}
