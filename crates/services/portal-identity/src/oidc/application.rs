use super::token_exchange::{self, TokenResponse};
use super::{AuthorityConfig, Navigator, decode_id_token};
use crate::cache::{CacheSnapshot, CacheStore, CachedAccessToken, PendingRedirect, RedirectKind};
use crate::error::{IdentityError, Result};
use crate::pkce;
use crate::sdk::IdentitySdk;
use crate::types::{Account, AuthenticationResult, TokenRequest};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Cached access tokens closer than this to expiry are refreshed instead.
const EXPIRY_MARGIN_MINUTES: i64 = 5;
/// Lifetime assumed when the token endpoint omits `expires_in`.
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

/// Public client (no secret) talking to an OIDC authority.
pub struct PublicClientApplication {
    config: AuthorityConfig,
    http: reqwest::Client,
    store: Arc<dyn CacheStore>,
    navigator: Arc<dyn Navigator>,
    cache: RwLock<CacheSnapshot>,
    initialized: OnceCell<()>,
}

impl std::fmt::Debug for PublicClientApplication {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublicClientApplication")
            .field("config", &self.config)
            .field("initialized", &self.initialized.initialized())
            .finish_non_exhaustive()
    }
}

impl PublicClientApplication {
    pub fn new(
        config: AuthorityConfig,
        store: Arc<dyn CacheStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(5))
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self {
            config,
            http,
            store,
            navigator,
            cache: RwLock::new(CacheSnapshot::default()),
            initialized: OnceCell::new(),
        })
    }

    /// Replaces the HTTP client used for token requests.
    #[must_use]
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    #[must_use]
    pub fn config(&self) -> &AuthorityConfig {
        &self.config
    }

    fn ensure_initialized(&self) -> Result<()> {
        if self.initialized.initialized() {
            Ok(())
        } else {
            Err(IdentityError::NotInitialized)
        }
    }

    /// Applies `f` to the cache and persists the result.
    ///
    /// The save happens under the write lock so snapshots reach the store in
    /// the order they were applied.
    fn update<R>(&self, f: impl FnOnce(&mut CacheSnapshot) -> R) -> Result<R> {
        let mut cache = self.cache.write();
        let out = f(&mut cache);
        self.store.save(&cache)?;
        Ok(out)
    }

    fn start_redirect(
        &self,
        request: &TokenRequest,
        kind: RedirectKind,
        login_hint: Option<String>,
    ) -> Result<()> {
        self.ensure_initialized()?;

        let code_verifier = pkce::generate_code_verifier();
        let challenge = pkce::code_challenge_s256(&code_verifier);
        let state = pkce::generate_state();

        let mut url = self.config.authorize_endpoint()?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("client_id", &self.config.client_id)
                .append_pair("response_type", "code")
                .append_pair("redirect_uri", &self.config.redirect_uri)
                .append_pair("scope", &token_exchange::scope_param(&request.scopes))
                .append_pair("code_challenge", &challenge)
                .append_pair("code_challenge_method", "S256")
                .append_pair("state", &state)
                .append_pair("response_mode", "query");
            if let Some(hint) = &login_hint {
                query.append_pair("login_hint", hint);
            }
        }

        self.update(|cache| {
            cache.pending = Some(PendingRedirect {
                state,
                code_verifier,
                scopes: request.scopes.clone(),
                kind,
            });
        })?;

        tracing::info!(?kind, "redirecting to identity provider");
        self.navigator.navigate(&url)
    }

    /// Caches a token response and builds the result handed to callers.
    fn store_tokens(
        &self,
        response: TokenResponse,
        requested: &[String],
        known_account: Option<&Account>,
    ) -> Result<AuthenticationResult> {
        let account = match (&response.id_token, known_account) {
            (Some(id_token), _) => decode_id_token(id_token)?.into_account()?,
            (None, Some(account)) => account.clone(),
            (None, None) => {
                return Err(IdentityError::Redirect(
                    "token response carries no id token".into(),
                ));
            }
        };

        let now = Utc::now();
        let expires_on = now
            + Duration::seconds(response.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS));

        let mut scopes = requested.to_vec();
        for granted in response.scope.as_deref().unwrap_or_default().split_whitespace() {
            if !scopes.iter().any(|s| s.eq_ignore_ascii_case(granted)) {
                scopes.push(granted.to_string());
            }
        }

        let TokenResponse {
            access_token,
            refresh_token,
            ..
        } = response;

        self.update(|cache| {
            let entry = cache.upsert_account(account.clone());
            if let Some(rt) = refresh_token {
                entry.refresh_token = Some(rt);
            }
            entry.store_token(
                CachedAccessToken {
                    secret: access_token.clone(),
                    scopes: scopes.clone(),
                    expires_on,
                },
                now,
            );
        })?;

        Ok(AuthenticationResult {
            access_token,
            account,
            scopes,
            expires_on,
        })
    }
}

#[async_trait]
impl IdentitySdk for PublicClientApplication {
    async fn initialize(&self) -> Result<()> {
        self.initialized
            .get_or_try_init(|| async {
                let snapshot = self.store.load()?;
                tracing::debug!(accounts = snapshot.accounts.len(), "identity cache loaded");
                *self.cache.write() = snapshot;
                Ok::<(), IdentityError>(())
            })
            .await?;
        Ok(())
    }

    async fn handle_redirect_promise(&self) -> Result<Option<AuthenticationResult>> {
        self.ensure_initialized()?;

        let Some(location) = self.navigator.current_location() else {
            return Ok(None);
        };
        let params: HashMap<String, String> = location.query_pairs().into_owned().collect();
        let Some(state) = params.get("state") else {
            return Ok(None);
        };

        let Some(pending) = self.cache.read().pending.clone() else {
            tracing::debug!("callback location present but no redirect is pending");
            return Ok(None);
        };
        if &pending.state != state {
            return Err(IdentityError::Redirect(
                "state does not match the pending request".into(),
            ));
        }

        self.update(|cache| cache.pending = None)?;

        if let Some(code) = params.get("error") {
            let description = params
                .get("error_description")
                .map_or("", String::as_str);
            return Err(IdentityError::from_oauth(code, description));
        }

        let code = params.get("code").ok_or_else(|| {
            IdentityError::Redirect("callback carries neither code nor error".into())
        })?;

        let response = token_exchange::exchange_code(
            &self.http,
            &self.config,
            code,
            &pending.code_verifier,
            &pending.scopes,
        )
        .await?;

        let result = self.store_tokens(response, &pending.scopes, None)?;
        tracing::info!(
            username = %result.account.username,
            kind = ?pending.kind,
            "redirect callback exchanged"
        );
        Ok(Some(result))
    }

    fn get_all_accounts(&self) -> Vec<Account> {
        self.cache
            .read()
            .accounts
            .iter()
            .map(|a| a.account.clone())
            .collect()
    }

    fn set_active_account(&self, account: Option<&Account>) {
        let id = account.map(|a| a.home_account_id.clone());
        if let Err(e) = self.update(|cache| cache.active_account_id = id) {
            tracing::warn!("failed to persist active account: {e}");
        }
    }

    fn get_active_account(&self) -> Option<Account> {
        self.cache.read().active().map(|a| a.account.clone())
    }

    async fn acquire_token_silent(&self, request: &TokenRequest) -> Result<AuthenticationResult> {
        self.ensure_initialized()?;

        let not_before = Utc::now() + Duration::minutes(EXPIRY_MARGIN_MINUTES);
        let (account, cached, refresh_token) = {
            let cache = self.cache.read();
            let active = cache.active().ok_or(IdentityError::NoActiveAccount)?;
            (
                active.account.clone(),
                active.usable_token(&request.scopes, not_before).cloned(),
                active.refresh_token.clone(),
            )
        };

        if let Some(token) = cached {
            tracing::debug!("access token served from cache");
            return Ok(AuthenticationResult {
                access_token: token.secret,
                account,
                scopes: token.scopes,
                expires_on: token.expires_on,
            });
        }

        let Some(refresh_token) = refresh_token else {
            return Err(IdentityError::InteractionRequired(
                "no refresh token cached for the active account".into(),
            ));
        };

        tracing::debug!("refreshing access token");
        let response =
            token_exchange::refresh(&self.http, &self.config, &refresh_token, &request.scopes)
                .await?;
        self.store_tokens(response, &request.scopes, Some(&account))
    }

    async fn acquire_token_redirect(&self, request: &TokenRequest) -> Result<()> {
        let hint = self.get_active_account().map(|a| a.username);
        self.start_redirect(request, RedirectKind::AcquireToken, hint)
    }

    async fn login_redirect(&self, request: &TokenRequest) -> Result<()> {
        self.start_redirect(request, RedirectKind::Login, None)
    }

    async fn logout_redirect(&self) -> Result<()> {
        self.ensure_initialized()?;

        self.update(|cache| {
            cache.accounts.clear();
            cache.active_account_id = None;
            cache.pending = None;
        })?;

        let mut url = self.config.logout_endpoint()?;
        if let Some(post_logout) = &self.config.post_logout_redirect_uri {
            url.query_pairs_mut()
                .append_pair("post_logout_redirect_uri", post_logout);
        }
        tracing::info!("signed out; redirecting to identity provider");
        self.navigator.navigate(&url)
    }
}
