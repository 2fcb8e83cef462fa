//! Advisory validation for [`Settings`].
//!
//! Missing settings never stop the client from starting; they are reported so
//! the caller can log them.

use crate::loader;
use crate::types::Settings;

/// An advisory warning about a configuration issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisoryWarning {
    /// Machine-readable warning code.
    pub code: &'static str,

    /// Human-readable warning message.
    pub message: String,

    /// Environment variable the warning is about.
    pub variable: &'static str,
}

impl std::fmt::Display for AdvisoryWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.variable, self.message)
    }
}

impl Settings {
    /// Collects advisory warnings for empty or malformed values.
    pub fn warnings(&self) -> Vec<AdvisoryWarning> {
        let mut warnings = vec![];
        let ad = &self.azure_ad;

        for (value, variable) in [
            (&ad.client_id, loader::ENV_CLIENT_ID),
            (&ad.tenant_id, loader::ENV_TENANT_ID),
            (&ad.instance, loader::ENV_INSTANCE),
            (&ad.callback_path, loader::ENV_CALLBACK_PATH),
            (&self.web_api.base_url, loader::ENV_WEB_API_BASE_URL),
        ] {
            if value.is_empty() {
                warnings.push(AdvisoryWarning {
                    code: "settings.missing",
                    message: "not set; an empty value is used".into(),
                    variable,
                });
            }
        }

        for (value, variable) in [
            (&ad.instance, loader::ENV_INSTANCE),
            (&self.web_api.base_url, loader::ENV_WEB_API_BASE_URL),
        ] {
            if !value.is_empty() && !is_http_url(value) {
                warnings.push(AdvisoryWarning {
                    code: "settings.url.invalid",
                    message: format!("'{value}' is not an http(s) URL"),
                    variable,
                });
            }
        }

        if ad.effective_scopes().is_empty() {
            warnings.push(AdvisoryWarning {
                code: "settings.scopes.empty",
                message: "no scopes configured and no API client id to derive one".into(),
                variable: loader::ENV_SCOPES,
            });
        }

        warnings
    }
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("https://") || value.starts_with("http://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_settings_warn_about_required_values() {
        let warnings = Settings::default().warnings();
        let variables: Vec<_> = warnings.iter().map(|w| w.variable).collect();

        assert!(variables.contains(&loader::ENV_CLIENT_ID));
        assert!(variables.contains(&loader::ENV_WEB_API_BASE_URL));
        assert!(variables.contains(&loader::ENV_SCOPES));
    }

    #[test]
    fn complete_settings_have_no_warnings() {
        let mut settings = Settings::default();
        settings.azure_ad.client_id = "front".into();
        settings.azure_ad.api_client_id = "back".into();
        settings.azure_ad.tenant_id = "tenant".into();
        settings.azure_ad.instance = "https://login.microsoftonline.com".into();
        settings.azure_ad.callback_path = "/auth".into();
        settings.web_api.base_url = "https://api.example.com".into();

        assert!(settings.warnings().is_empty());
    }

    #[test]
    fn non_http_base_url_is_flagged() {
        let mut settings = Settings::default();
        settings.web_api.base_url = "api.example.com".into();

        let warning = settings
            .warnings()
            .into_iter()
            .find(|w| w.code == "settings.url.invalid")
            .unwrap();
        assert_eq!(warning.variable, loader::ENV_WEB_API_BASE_URL);
        assert!(warning.to_string().contains("api.example.com"));
    }
}
