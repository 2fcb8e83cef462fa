//! Sign-in guard run before a navigation is committed.

use crate::routes::ResolvedRoute;
use portal_identity::SessionStore;
use std::sync::Arc;

/// Stages a single guard check moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Checking,
    /// Sign-in redirect started; the user leaves the app.
    Redirecting,
    Authenticated,
    Denied,
}

/// Which routes the guard checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GuardScope {
    /// Routes with `requires_auth`.
    #[default]
    Marked,
    /// Every route.
    Global,
}

/// Result of [`NavigationGuard::check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardOutcome {
    /// Every state entered, ending with `Authenticated` or `Denied`.
    pub states: Vec<GuardState>,
}

impl GuardOutcome {
    #[must_use]
    pub fn state(&self) -> GuardState {
        self.states.last().copied().unwrap_or(GuardState::Checking)
    }

    #[must_use]
    pub fn allowed(&self) -> bool {
        self.state() == GuardState::Authenticated
    }

    fn enter(&mut self, state: GuardState) {
        tracing::debug!(?state, "guard state");
        self.states.push(state);
    }
}

#[derive(Debug, Clone)]
pub struct NavigationGuard {
    session: Arc<SessionStore>,
    scope: GuardScope,
}

impl NavigationGuard {
    #[must_use]
    pub const fn new(session: Arc<SessionStore>, scope: GuardScope) -> Self {
        Self { session, scope }
    }

    #[must_use]
    pub const fn scope(&self) -> GuardScope {
        self.scope
    }

    #[must_use]
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Whether navigating to `route` must pass [`Self::check`].
    #[must_use]
    pub const fn applies_to(&self, route: &ResolvedRoute) -> bool {
        match self.scope {
            GuardScope::Marked => route.requires_auth,
            GuardScope::Global => true,
        }
    }

    /// Makes sure a user is signed in, starting the sign-in redirect if not.
    ///
    /// Never fails: identity errors are logged and deny the navigation.
    pub async fn check(&self) -> GuardOutcome {
        let mut outcome = GuardOutcome { states: Vec::new() };
        outcome.enter(GuardState::Checking);

        let identity = self.session.identity();
        if let Err(e) = identity.initialize().await {
            tracing::error!("identity initialization failed: {e}");
            outcome.enter(GuardState::Denied);
            return outcome;
        }

        match identity.login().await {
            Ok(true) => {}
            Ok(false) => {
                outcome.enter(GuardState::Redirecting);
                outcome.enter(GuardState::Denied);
                return outcome;
            }
            Err(e) => {
                tracing::error!("login failed: {e}");
                outcome.enter(GuardState::Denied);
                return outcome;
            }
        }

        self.session.load_account();
        if !self.session.is_authenticated() {
            tracing::warn!("login reported success but no account is active");
            outcome.enter(GuardState::Denied);
            return outcome;
        }

        outcome.enter(GuardState::Authenticated);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_identity::IdentityClient;
    use portal_identity::test_support::{FakeSdk, account};

    fn guard(sdk: &Arc<FakeSdk>) -> NavigationGuard {
        let identity = IdentityClient::new(
            Arc::clone(sdk) as Arc<dyn portal_identity::IdentitySdk>,
            vec!["email".into()],
        );
        NavigationGuard::new(Arc::new(SessionStore::new(identity)), GuardScope::Marked)
    }

    #[tokio::test]
    async fn cached_account_is_authenticated() {
        let sdk = Arc::new(FakeSdk::new());
        sdk.add_account(account("alice"));
        let guard = guard(&sdk);

        let outcome = guard.check().await;
        assert_eq!(
            outcome.states,
            vec![GuardState::Checking, GuardState::Authenticated]
        );
        assert_eq!(
            guard.session().account().map(|a| a.username),
            Some("alice@contoso.com".to_string())
        );
        assert!(sdk.is_initialized());
    }

    #[tokio::test]
    async fn no_account_redirects_then_denies() {
        let sdk = Arc::new(FakeSdk::new());
        let guard = guard(&sdk);

        let outcome = guard.check().await;
        assert_eq!(
            outcome.states,
            vec![
                GuardState::Checking,
                GuardState::Redirecting,
                GuardState::Denied
            ]
        );
        assert_eq!(sdk.calls().login_redirect, 1);
        assert!(!guard.session().is_authenticated());
    }

    #[tokio::test]
    async fn vanished_account_is_denied() {
        let sdk = Arc::new(FakeSdk::new());
        sdk.add_account(account("bob"));
        sdk.ignore_set_active();
        let guard = guard(&sdk);

        let outcome = guard.check().await;
        assert_eq!(outcome.state(), GuardState::Denied);
        assert!(!outcome.states.contains(&GuardState::Redirecting));
    }

    #[tokio::test]
    async fn failed_initialize_is_denied() {
        let sdk = Arc::new(FakeSdk::new());
        sdk.fail_initialize();
        let guard = guard(&sdk);

        let outcome = guard.check().await;
        assert!(!outcome.allowed());
        assert_eq!(sdk.calls().login_redirect, 0);
    }

    #[test]
    fn scope_selects_routes() {
        let sdk = Arc::new(FakeSdk::new());
        let open = ResolvedRoute {
            path: "/unauthorized".into(),
            name: None,
            requires_auth: false,
            redirected_from: vec![],
        };
        let marked = guard(&sdk);
        assert!(!marked.applies_to(&open));

        let global = NavigationGuard::new(Arc::clone(marked.session()), GuardScope::Global);
        assert!(global.applies_to(&open));
    }
}
