//! Session state derived from the identity client's active account.

use crate::client::IdentityClient;
use crate::types::Account;
use parking_lot::RwLock;

/// Holds the account loaded from the identity client.
///
/// The store never persists anything; the SDK cache stays the single source
/// of truth and [`SessionStore::load_account`] re-reads it.
#[derive(Debug)]
pub struct SessionStore {
    identity: IdentityClient,
    account: RwLock<Option<Account>>,
}

impl SessionStore {
    #[must_use]
    pub fn new(identity: IdentityClient) -> Self {
        Self {
            identity,
            account: RwLock::new(None),
        }
    }

    /// Identity client the store reads from.
    #[must_use]
    pub fn identity(&self) -> &IdentityClient {
        &self.identity
    }

    /// Refreshes the loaded account from the active account.
    pub fn load_account(&self) {
        let account = self.identity.get_active_account();
        tracing::debug!(
            username = account.as_ref().map(|a| a.username.as_str()),
            "session account loaded"
        );
        *self.account.write() = account;
    }

    /// `true` while an account is loaded.
    pub fn is_authenticated(&self) -> bool {
        self.account.read().is_some()
    }

    pub fn account(&self) -> Option<Account> {
        self.account.read().clone()
    }

    pub fn clear(&self) {
        *self.account.write() = None;
    }
}
