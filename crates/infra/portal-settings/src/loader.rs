//! Environment loading.
//!
//! Every variable is optional. Missing or blank values become empty strings so
//! a misconfigured deployment still starts; [`crate::validation`] reports what
//! is missing.

use crate::types::{AppInsightsSettings, AzureAdSettings, Settings, WebApiSettings};
use secrecy::SecretString;

pub const ENV_ENVIRONMENT: &str = "APP_ENV";
pub const ENV_CLIENT_ID: &str = "APP_AZURE_AD_CLIENT_ID";
pub const ENV_API_CLIENT_ID: &str = "APP_AZURE_AD_API_CLIENT_ID";
pub const ENV_TENANT_ID: &str = "APP_AZURE_AD_TENANT_ID";
pub const ENV_INSTANCE: &str = "APP_AZURE_AD_INSTANCE";
pub const ENV_CALLBACK_PATH: &str = "APP_AZURE_AD_CALLBACK_PATH";
pub const ENV_SCOPES: &str = "APP_AZURE_AD_SCOPES";
pub const ENV_ORIGIN: &str = "APP_ORIGIN";
pub const ENV_WEB_API_BASE_URL: &str = "APP_WEB_API_BASE_URL";
pub const ENV_APPINSIGHTS_CONNECTION_STRING: &str = "APP_APPINSIGHTS_CONNECTION_STRING";

impl Settings {
    /// Reads settings from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads settings through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            let value = lookup(name)
                .map(|v| v.trim().to_string())
                .unwrap_or_default();
            if value.is_empty() {
                tracing::debug!(variable = name, "setting not provided; using empty value");
            }
            value
        };

        Self {
            environment: get(ENV_ENVIRONMENT),
            azure_ad: AzureAdSettings {
                client_id: get(ENV_CLIENT_ID),
                api_client_id: get(ENV_API_CLIENT_ID),
                tenant_id: get(ENV_TENANT_ID),
                instance: get(ENV_INSTANCE),
                callback_path: get(ENV_CALLBACK_PATH),
                scopes: split_scopes(&get(ENV_SCOPES)),
                origin: get(ENV_ORIGIN),
            },
            web_api: WebApiSettings {
                base_url: get(ENV_WEB_API_BASE_URL),
            },
            app_insights: AppInsightsSettings {
                connection_string: SecretString::from(get(ENV_APPINSIGHTS_CONNECTION_STRING)),
            },
        }
    }
}

/// Splits a space-separated scope list, dropping empty segments.
fn split_scopes(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::EnvGuard;
    use serial_test::serial;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn missing_variables_become_empty_strings() {
        let settings = Settings::from_lookup(|_| None);

        assert_eq!(settings.environment, "");
        assert_eq!(settings.azure_ad.client_id, "");
        assert_eq!(settings.azure_ad.tenant_id, "");
        assert!(settings.azure_ad.scopes.is_empty());
        assert_eq!(settings.web_api.base_url, "");
        assert!(!settings.app_insights.is_configured());
    }

    #[test]
    fn reads_all_variables() {
        let settings = Settings::from_lookup(lookup(&[
            (ENV_ENVIRONMENT, "dev"),
            (ENV_CLIENT_ID, "front-id"),
            (ENV_API_CLIENT_ID, "back-id"),
            (ENV_TENANT_ID, "tenant"),
            (ENV_INSTANCE, "https://login.microsoftonline.com"),
            (ENV_CALLBACK_PATH, "/auth"),
            (ENV_SCOPES, "email  api://back-id/access_as_user"),
            (ENV_ORIGIN, "http://localhost:5173"),
            (ENV_WEB_API_BASE_URL, "https://api.example.com"),
            (ENV_APPINSIGHTS_CONNECTION_STRING, "InstrumentationKey=1"),
        ]));

        assert_eq!(settings.environment, "dev");
        assert_eq!(settings.azure_ad.client_id, "front-id");
        assert_eq!(settings.azure_ad.api_client_id, "back-id");
        assert_eq!(
            settings.azure_ad.scopes,
            vec!["email", "api://back-id/access_as_user"]
        );
        assert_eq!(settings.azure_ad.redirect_uri(), "http://localhost:5173/auth");
        assert_eq!(settings.web_api.base_url, "https://api.example.com");
        assert!(settings.app_insights.is_configured());
    }

    #[test]
    fn values_are_trimmed() {
        let settings = Settings::from_lookup(lookup(&[
            (ENV_CLIENT_ID, "  front-id \n"),
            (ENV_SCOPES, "   "),
        ]));

        assert_eq!(settings.azure_ad.client_id, "front-id");
        assert!(settings.azure_ad.scopes.is_empty());
    }

    #[test]
    #[serial(env)]
    fn from_env_reads_process_environment() {
        let _base = EnvGuard::set(ENV_WEB_API_BASE_URL, "https://env.example.com");
        let _tenant = EnvGuard::remove(ENV_TENANT_ID);

        let settings = Settings::from_env();
        assert_eq!(settings.web_api.base_url, "https://env.example.com");
        assert_eq!(settings.azure_ad.tenant_id, "");
    }
}
