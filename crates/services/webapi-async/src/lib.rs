//! Async client for the portal web API.
//!
//! Every request passes through the same interceptor chain: a bearer token is
//! fetched from the [`TokenProvider`] before dispatch, JSON error bodies are
//! normalized even when a binary body was requested, and a 401 primes the
//! provider's token cache before the error is returned.

/// HTTP client implementation
pub mod client;
/// Base URL and static header configuration
pub mod config;
/// Error types
pub mod error;
/// Request and response interceptors
pub mod interceptors;
/// Retry logic utilities
pub mod retry;
/// Test support utilities (for use in tests)
#[doc(hidden)]
pub mod test_support;

pub use crate::client::{Client, Download};
pub use crate::config::{Config, WebApiConfig};
pub use crate::error::{ErrorData, ResponseError, WebApiError};
pub use portal_identity::TokenProvider;
