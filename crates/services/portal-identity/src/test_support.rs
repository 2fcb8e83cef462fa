//! Test doubles for the identity SDK and page navigation.

use crate::error::{IdentityError, Result};
use crate::oidc::Navigator;
use crate::sdk::IdentitySdk;
use crate::types::{Account, AuthenticationResult, TokenRequest};
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Duration, Utc};
use parking_lot::Mutex;
use url::Url;

/// Account `<name>@contoso.com` with a deterministic id.
pub fn account(name: &str) -> Account {
    Account {
        home_account_id: format!("{name}-oid.contoso"),
        username: format!("{name}@contoso.com"),
        tenant_id: "contoso".into(),
        name: Some(name.to_string()),
    }
}

/// Unsigned compact JWT carrying `claims`.
pub fn unsigned_jwt(claims: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.")
}

/// Number of calls made to each [`FakeSdk`] operation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SdkCalls {
    pub initialize: usize,
    pub handle_redirect: usize,
    pub acquire_token_silent: usize,
    pub acquire_token_redirect: usize,
    pub login_redirect: usize,
    pub logout_redirect: usize,
}

/// What [`FakeSdk::acquire_token_silent`] answers.
#[derive(Debug, Clone, Default)]
pub enum SilentBehavior {
    Token(String),
    InteractionRequired,
    #[default]
    Fail,
}

#[derive(Debug, Default)]
struct FakeState {
    initialized: bool,
    fail_initialize: bool,
    accounts: Vec<Account>,
    active: Option<Account>,
    ignore_set_active: bool,
    redirect_account: Option<Account>,
    fail_redirect: bool,
    silent: SilentBehavior,
    last_login_scopes: Option<Vec<String>>,
    calls: SdkCalls,
}

/// Scriptable in-memory [`IdentitySdk`].
#[derive(Debug, Default)]
pub struct FakeSdk {
    state: Mutex<FakeState>,
}

impl FakeSdk {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_account(&self, account: Account) {
        self.state.lock().accounts.push(account);
    }

    /// Makes the next `handle_redirect_promise` complete a sign-in for `account`.
    pub fn set_redirect_account(&self, account: Account) {
        self.state.lock().redirect_account = Some(account);
    }

    pub fn fail_redirect_handling(&self) {
        self.state.lock().fail_redirect = true;
    }

    pub fn fail_initialize(&self) {
        self.state.lock().fail_initialize = true;
    }

    /// Makes `set_active_account` a no-op, as if the account vanished.
    pub fn ignore_set_active(&self) {
        self.state.lock().ignore_set_active = true;
    }

    pub fn set_silent(&self, behavior: SilentBehavior) {
        self.state.lock().silent = behavior;
    }

    pub fn calls(&self) -> SdkCalls {
        self.state.lock().calls
    }

    pub fn is_initialized(&self) -> bool {
        self.state.lock().initialized
    }

    pub fn last_login_scopes(&self) -> Option<Vec<String>> {
        self.state.lock().last_login_scopes.clone()
    }
}

#[async_trait]
impl IdentitySdk for FakeSdk {
    async fn initialize(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.calls.initialize += 1;
        if state.fail_initialize {
            return Err(IdentityError::Storage("fake cache unavailable".into()));
        }
        state.initialized = true;
        Ok(())
    }

    async fn handle_redirect_promise(&self) -> Result<Option<AuthenticationResult>> {
        let mut state = self.state.lock();
        state.calls.handle_redirect += 1;
        if state.fail_redirect {
            return Err(IdentityError::Redirect("fake state mismatch".into()));
        }
        let Some(account) = state.redirect_account.take() else {
            return Ok(None);
        };
        state.accounts.push(account.clone());
        Ok(Some(AuthenticationResult {
            access_token: "redirect-token".into(),
            account,
            scopes: vec![],
            expires_on: Utc::now() + Duration::hours(1),
        }))
    }

    fn get_all_accounts(&self) -> Vec<Account> {
        self.state.lock().accounts.clone()
    }

    fn set_active_account(&self, account: Option<&Account>) {
        let mut state = self.state.lock();
        if !state.ignore_set_active {
            state.active = account.cloned();
        }
    }

    fn get_active_account(&self) -> Option<Account> {
        self.state.lock().active.clone()
    }

    async fn acquire_token_silent(&self, request: &TokenRequest) -> Result<AuthenticationResult> {
        let mut state = self.state.lock();
        state.calls.acquire_token_silent += 1;
        match state.silent.clone() {
            SilentBehavior::Token(token) => Ok(AuthenticationResult {
                access_token: token,
                account: state.active.clone().unwrap_or_else(|| account("silent")),
                scopes: request.scopes.clone(),
                expires_on: Utc::now() + Duration::hours(1),
            }),
            SilentBehavior::InteractionRequired => Err(IdentityError::InteractionRequired(
                "fake consent needed".into(),
            )),
            SilentBehavior::Fail => Err(IdentityError::Provider {
                code: "temporarily_unavailable".into(),
                description: "fake outage".into(),
            }),
        }
    }

    async fn acquire_token_redirect(&self, _request: &TokenRequest) -> Result<()> {
        self.state.lock().calls.acquire_token_redirect += 1;
        Ok(())
    }

    async fn login_redirect(&self, request: &TokenRequest) -> Result<()> {
        let mut state = self.state.lock();
        state.calls.login_redirect += 1;
        state.last_login_scopes = Some(request.scopes.clone());
        Ok(())
    }

    async fn logout_redirect(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.calls.logout_redirect += 1;
        state.accounts.clear();
        state.active = None;
        Ok(())
    }
}

/// Navigator that records redirects instead of performing them.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    location: Mutex<Option<Url>>,
    visited: Mutex<Vec<Url>>,
}

impl RecordingNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates loading the application at `location`.
    pub fn load(&self, location: &str) {
        *self.location.lock() = Url::parse(location).ok();
    }

    pub fn visited(&self) -> Vec<Url> {
        self.visited.lock().clone()
    }

    pub fn last_visited(&self) -> Option<Url> {
        self.visited.lock().last().cloned()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, url: &Url) -> Result<()> {
        self.visited.lock().push(url.clone());
        Ok(())
    }

    fn current_location(&self) -> Option<Url> {
        self.location.lock().clone()
    }
}
