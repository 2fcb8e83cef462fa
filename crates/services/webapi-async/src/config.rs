use crate::error::ResponseError;
use portal_settings::WebApiSettings;
use portal_settings::loader::ENV_WEB_API_BASE_URL;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};

/// Configuration for the web API client
#[derive(Clone, Debug, Default)]
pub struct WebApiConfig {
    api_base: String,
    prefix: String,
}

impl WebApiConfig {
    #[must_use]
    pub fn from_settings(settings: &WebApiSettings) -> Self {
        Self {
            api_base: settings.base_url.trim().to_string(),
            prefix: String::new(),
        }
    }

    /// Sets the API base URL
    #[must_use]
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    /// Path prepended to every service path, e.g. `/api/users`.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn api_base(&self) -> &str {
        &self.api_base
    }
}

/// Configuration trait for the client
pub trait Config: Send + Sync {
    /// Static headers sent with every request.
    fn headers(&self) -> Result<HeaderMap, ResponseError>;

    /// Full URL for a service path.
    fn url(&self, service: &str) -> String;

    /// Fails when the client cannot address any endpoint.
    fn validate(&self) -> Result<(), ResponseError>;
}

impl Config for WebApiConfig {
    fn headers(&self) -> Result<HeaderMap, ResponseError> {
        let mut h = HeaderMap::new();
        h.insert(ACCEPT, HeaderValue::from_static("application/json, */*"));
        Ok(h)
    }

    fn url(&self, service: &str) -> String {
        let base = self.api_base.trim_end_matches('/');
        let prefix = self.prefix.trim_matches('/');
        let service = service.trim_start_matches('/');
        match (prefix.is_empty(), service.is_empty()) {
            (true, _) => format!("{base}/{service}"),
            (false, true) => format!("{base}/{prefix}"),
            (false, false) => format!("{base}/{prefix}/{service}"),
        }
    }

    fn validate(&self) -> Result<(), ResponseError> {
        if self.api_base.trim().is_empty() {
            return Err(ResponseError::Config(format!(
                "web API base URL is not configured: set {ENV_WEB_API_BASE_URL}"
            )));
        }
        Ok(())
    }
}
