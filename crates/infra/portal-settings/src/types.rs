//! Settings types.

use secrecy::{ExposeSecret, SecretString};

/// Root settings object.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// Deployment environment name (`APP_ENV`).
    pub environment: String,
    /// Identity provider parameters.
    pub azure_ad: AzureAdSettings,
    /// Web API parameters.
    pub web_api: WebApiSettings,
    /// Telemetry parameters.
    pub app_insights: AppInsightsSettings,
}

/// Identity provider parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AzureAdSettings {
    pub client_id: String,
    /// Application id of the web API; used to derive the default scope.
    pub api_client_id: String,
    pub tenant_id: String,
    /// Authority instance, e.g. `https://login.microsoftonline.com`.
    pub instance: String,
    pub callback_path: String,
    pub scopes: Vec<String>,
    /// Origin the callback path is resolved against.
    pub origin: String,
}

impl AzureAdSettings {
    /// Authority URL: `{instance}/{tenant_id}/`.
    #[must_use]
    pub fn authority(&self) -> String {
        format!("{}/{}/", self.instance.trim_end_matches('/'), self.tenant_id)
    }

    /// Redirect URI registered with the identity provider.
    #[must_use]
    pub fn redirect_uri(&self) -> String {
        format!("{}{}", self.origin.trim_end_matches('/'), self.callback_path)
    }

    /// Scopes requested for web API tokens.
    ///
    /// Falls back to `email` plus the API's `access_as_user` scope when no
    /// scopes are configured but the API client id is known.
    #[must_use]
    pub fn effective_scopes(&self) -> Vec<String> {
        if !self.scopes.is_empty() || self.api_client_id.is_empty() {
            return self.scopes.clone();
        }
        vec![
            "email".to_string(),
            format!("api://{}/access_as_user", self.api_client_id),
        ]
    }
}

/// Web API parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebApiSettings {
    pub base_url: String,
}

/// Telemetry parameters.
///
/// Debug output redacts the connection string via [`SecretString`].
#[derive(Debug, Clone)]
pub struct AppInsightsSettings {
    pub connection_string: SecretString,
}

impl Default for AppInsightsSettings {
    fn default() -> Self {
        Self {
            connection_string: SecretString::from(String::new()),
        }
    }
}

impl AppInsightsSettings {
    /// Whether a connection string was provided.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.connection_string.expose_secret().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn azure_ad() -> AzureAdSettings {
        AzureAdSettings {
            client_id: "front".into(),
            api_client_id: "back".into(),
            tenant_id: "contoso".into(),
            instance: "https://login.microsoftonline.com".into(),
            callback_path: "/auth".into(),
            scopes: vec![],
            origin: "http://localhost:5173".into(),
        }
    }

    #[test]
    fn authority_joins_instance_and_tenant() {
        assert_eq!(
            azure_ad().authority(),
            "https://login.microsoftonline.com/contoso/"
        );

        let mut ad = azure_ad();
        ad.instance = "https://login.microsoftonline.com/".into();
        assert_eq!(ad.authority(), "https://login.microsoftonline.com/contoso/");
    }

    #[test]
    fn redirect_uri_appends_callback_path() {
        assert_eq!(azure_ad().redirect_uri(), "http://localhost:5173/auth");
    }

    #[test]
    fn effective_scopes_default_to_api_scope() {
        assert_eq!(
            azure_ad().effective_scopes(),
            vec!["email", "api://back/access_as_user"]
        );
    }

    #[test]
    fn effective_scopes_prefer_configured_scopes() {
        let mut ad = azure_ad();
        ad.scopes = vec!["User.Read".into()];
        assert_eq!(ad.effective_scopes(), vec!["User.Read"]);

        ad.scopes.clear();
        ad.api_client_id.clear();
        assert!(ad.effective_scopes().is_empty());
    }

    #[test]
    fn app_insights_debug_redacts_connection_string() {
        let ai = AppInsightsSettings {
            connection_string: SecretString::from("InstrumentationKey=abc".to_string()),
        };
        assert!(ai.is_configured());
        let debug_str = format!("{ai:?}");
        assert!(!debug_str.contains("InstrumentationKey=abc"));
        assert!(!AppInsightsSettings::default().is_configured());
    }
}
