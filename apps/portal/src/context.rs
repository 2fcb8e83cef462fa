//! Wiring of settings, identity, session and router for one CLI run.

use anyhow::{Context, Result};
use portal_identity::{
    AuthorityConfig, CacheStore, ConsoleNavigator, FileCacheStore, IdentityClient, IdentitySdk,
    Navigator, PublicClientApplication, SessionStore,
};
use portal_router::{GuardScope, NavigationGuard, RouteTable, Router};
use portal_settings::{Settings, loader};
use std::path::PathBuf;
use std::sync::Arc;
use webapi_async::{Client, WebApiConfig};

const APP_NAME: &str = "portal";

/// Command-line choices that affect wiring.
#[derive(Debug, Clone)]
pub struct Options {
    pub cache: Option<PathBuf>,
    pub open_browser: bool,
    pub guard_all: bool,
}

pub struct Portal {
    pub settings: Settings,
    pub navigator: Arc<ConsoleNavigator>,
    pub identity: IdentityClient,
    pub session: Arc<SessionStore>,
    pub router: Router,
}

impl Portal {
    pub fn build(settings: Settings, options: &Options) -> Result<Self> {
        let ad = &settings.azure_ad;
        // Loading never fails on empty values; commands that talk to the
        // authority refuse to start without one.
        let missing: Vec<&str> = [
            (&ad.client_id, loader::ENV_CLIENT_ID),
            (&ad.tenant_id, loader::ENV_TENANT_ID),
            (&ad.instance, loader::ENV_INSTANCE),
        ]
        .into_iter()
        .filter(|(value, _)| value.is_empty())
        .map(|(_, name)| name)
        .collect();
        if !missing.is_empty() {
            anyhow::bail!("identity settings incomplete: set {}", missing.join(", "));
        }

        let store = match &options.cache {
            Some(path) => FileCacheStore::new(path),
            None => FileCacheStore::in_data_dir(APP_NAME)?,
        };
        tracing::debug!(path = %store.path().display(), "identity cache");

        let navigator = Arc::new(ConsoleNavigator::new(options.open_browser));
        let app = PublicClientApplication::new(
            AuthorityConfig::from_settings(ad),
            Arc::new(store) as Arc<dyn CacheStore>,
            Arc::clone(&navigator) as Arc<dyn Navigator>,
        )
        .context("Failed to create identity client")?;

        let identity = IdentityClient::new(
            Arc::new(app) as Arc<dyn IdentitySdk>,
            ad.effective_scopes(),
        );
        let session = Arc::new(SessionStore::new(identity.clone()));
        let scope = if options.guard_all {
            GuardScope::Global
        } else {
            GuardScope::Marked
        };
        let router = Router::new(
            RouteTable::portal_default(),
            NavigationGuard::new(Arc::clone(&session), scope),
        );

        Ok(Self {
            settings,
            navigator,
            identity,
            session,
            router,
        })
    }

    /// Runs the identity start-up sequence and loads the session.
    pub async fn start(&self) -> Result<()> {
        if self.settings.app_insights.is_configured() {
            tracing::info!("telemetry connection string present; no exporter is wired");
        }
        portal_identity::bootstrap(&self.identity)
            .await
            .context("Failed to initialize identity client")?;
        self.session.load_account();
        Ok(())
    }

    /// Web API client authenticated through the identity client.
    pub fn web_api(&self) -> Result<Client<WebApiConfig>> {
        let config = WebApiConfig::from_settings(&self.settings.web_api);
        Ok(Client::with_config(
            config,
            Arc::new(self.identity.clone()),
            self.identity.scopes().to_vec(),
        )?)
    }
}
