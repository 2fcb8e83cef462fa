//! Typed settings for the portal client.
//!
//! Settings are read once from the process environment at startup and passed
//! to the identity client and the web API client by value. A variable that is
//! not set becomes an empty string; nothing here fails at runtime.
//!
//! # Environment Variables
//! - `APP_ENV`: Deployment environment name
//! - `APP_AZURE_AD_CLIENT_ID`: Public client (front-end) application id
//! - `APP_AZURE_AD_API_CLIENT_ID`: Web API (back-end) application id
//! - `APP_AZURE_AD_TENANT_ID`: Directory tenant id
//! - `APP_AZURE_AD_INSTANCE`: Authority instance URL
//! - `APP_AZURE_AD_CALLBACK_PATH`: Redirect callback path
//! - `APP_AZURE_AD_SCOPES`: Requested scopes, space-separated
//! - `APP_ORIGIN`: Application origin the callback path is appended to
//! - `APP_WEB_API_BASE_URL`: Web API base URL
//! - `APP_APPINSIGHTS_CONNECTION_STRING`: Telemetry connection string

pub mod loader;
#[doc(hidden)]
pub mod test_support;
pub mod types;
pub mod validation;

pub use types::{AppInsightsSettings, AzureAdSettings, Settings, WebApiSettings};
pub use validation::AdvisoryWarning;
