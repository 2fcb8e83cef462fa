//! Start-up sequence run once before the router takes over.

use crate::client::IdentityClient;
use crate::error::Result;
use crate::types::Account;

/// Prepares the identity client and picks the active account.
///
/// Initialization failure is returned; everything after it is best-effort.
/// A redirect response that cannot be processed is logged and ignored so a
/// stale or tampered callback never blocks start-up.
pub async fn bootstrap(identity: &IdentityClient) -> Result<Option<Account>> {
    tracing::info!("initializing identity client");
    identity.initialize().await?;

    let sdk = identity.sdk();
    match sdk.handle_redirect_promise().await {
        Ok(Some(response)) => {
            tracing::info!(
                username = %response.account.username,
                "redirect handled; setting active account"
            );
            sdk.set_active_account(Some(&response.account));
        }
        Ok(None) => {}
        Err(e) => tracing::warn!("redirect handling failed: {e}"),
    }

    let accounts = sdk.get_all_accounts();
    match accounts.first() {
        Some(first) => {
            tracing::info!(username = %first.username, "setting active account");
            sdk.set_active_account(Some(first));
        }
        None => tracing::info!("no accounts found"),
    }

    Ok(identity.get_active_account())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::IdentitySdk;
    use crate::test_support::{FakeSdk, account};
    use std::sync::Arc;

    fn client(sdk: &Arc<FakeSdk>) -> IdentityClient {
        IdentityClient::new(Arc::clone(sdk) as Arc<dyn IdentitySdk>, vec![])
    }

    #[tokio::test]
    async fn no_accounts_leaves_session_empty() {
        let sdk = Arc::new(FakeSdk::new());
        let active = bootstrap(&client(&sdk)).await.unwrap();

        assert!(active.is_none());
        assert!(sdk.is_initialized());
        assert_eq!(sdk.calls().login_redirect, 0);
    }

    #[tokio::test]
    async fn cached_account_becomes_active() {
        let sdk = Arc::new(FakeSdk::new());
        sdk.add_account(account("frank"));

        let active = bootstrap(&client(&sdk)).await.unwrap();
        assert_eq!(active.unwrap().username, "frank@contoso.com");
    }

    #[tokio::test]
    async fn redirect_failure_does_not_block_startup() {
        let sdk = Arc::new(FakeSdk::new());
        sdk.fail_redirect_handling();
        sdk.add_account(account("gina"));

        let active = bootstrap(&client(&sdk)).await.unwrap();
        assert_eq!(active.unwrap().username, "gina@contoso.com");
    }

    #[tokio::test]
    async fn initialize_failure_is_fatal() {
        let sdk = Arc::new(FakeSdk::new());
        sdk.fail_initialize();

        assert!(bootstrap(&client(&sdk)).await.is_err());
    }
}
