use crate::error::{IdentityError, Result};
use portal_settings::AzureAdSettings;
use url::Url;

/// Client registration and authority endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorityConfig {
    pub client_id: String,
    /// Authority base, ending with `/`, e.g. `https://login.microsoftonline.com/<tenant>/`.
    pub authority: String,
    pub redirect_uri: String,
    pub post_logout_redirect_uri: Option<String>,
}

impl AuthorityConfig {
    /// Builds the configuration from identity settings.
    #[must_use]
    pub fn from_settings(settings: &AzureAdSettings) -> Self {
        let origin = settings.origin.trim();
        Self {
            client_id: settings.client_id.clone(),
            authority: settings.authority(),
            redirect_uri: settings.redirect_uri(),
            post_logout_redirect_uri: (!origin.is_empty()).then(|| origin.to_string()),
        }
    }

    pub fn authorize_endpoint(&self) -> Result<Url> {
        self.endpoint("oauth2/v2.0/authorize")
    }

    pub fn token_endpoint(&self) -> Result<Url> {
        self.endpoint("oauth2/v2.0/token")
    }

    pub fn logout_endpoint(&self) -> Result<Url> {
        self.endpoint("oauth2/v2.0/logout")
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let base = format!("{}/", self.authority.trim_end_matches('/'));
        Url::parse(&base)
            .and_then(|u| u.join(path))
            .map_err(|e| {
                IdentityError::Config(format!("invalid authority '{}': {e}", self.authority))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(authority: &str) -> AuthorityConfig {
        AuthorityConfig {
            client_id: "client".into(),
            authority: authority.into(),
            redirect_uri: "http://localhost/auth".into(),
            post_logout_redirect_uri: None,
        }
    }

    #[test]
    fn endpoints_are_relative_to_tenant() {
        let cfg = config("https://login.microsoftonline.com/contoso/");
        assert_eq!(
            cfg.token_endpoint().unwrap().as_str(),
            "https://login.microsoftonline.com/contoso/oauth2/v2.0/token"
        );

        let cfg = config("https://login.microsoftonline.com/contoso");
        assert_eq!(
            cfg.authorize_endpoint().unwrap().as_str(),
            "https://login.microsoftonline.com/contoso/oauth2/v2.0/authorize"
        );
    }

    #[test]
    fn empty_authority_is_a_config_error() {
        let err = config("/").token_endpoint().unwrap_err();
        assert!(matches!(err, IdentityError::Config(_)));
    }

    #[test]
    fn from_settings_uses_origin_for_logout() {
        let settings = AzureAdSettings {
            client_id: "front".into(),
            tenant_id: "contoso".into(),
            instance: "https://login.microsoftonline.com".into(),
            callback_path: "/auth".into(),
            origin: "http://localhost:5173".into(),
            ..AzureAdSettings::default()
        };

        let cfg = AuthorityConfig::from_settings(&settings);
        assert_eq!(cfg.authority, "https://login.microsoftonline.com/contoso/");
        assert_eq!(cfg.redirect_uri, "http://localhost:5173/auth");
        assert_eq!(cfg.post_logout_redirect_uri.as_deref(), Some("http://localhost:5173"));
    }
}
