//! Redirect-based sign-in and token acquisition for the portal client.
//!
//! - [`IdentitySdk`]: the narrow SDK interface the application depends on
//! - [`PublicClientApplication`]: OIDC authorization-code + PKCE binding
//! - [`IdentityClient`]: login and token policies on top of the SDK
//! - [`SessionStore`]: the `is_authenticated` view over the active account
//! - [`bootstrap`]: start-up sequence run before routing

pub mod bootstrap;
pub mod cache;
pub mod client;
pub mod error;
pub mod oidc;
pub mod pkce;
pub mod provider;
pub mod sdk;
pub mod session;
#[doc(hidden)]
pub mod test_support;
pub mod types;

pub use bootstrap::bootstrap;
pub use cache::{CacheStore, FileCacheStore, MemoryCacheStore};
pub use client::IdentityClient;
pub use error::IdentityError;
pub use oidc::{AuthorityConfig, ConsoleNavigator, Navigator, PublicClientApplication};
pub use provider::TokenProvider;
pub use sdk::IdentitySdk;
pub use session::SessionStore;
pub use types::{Account, AuthenticationResult, TokenRequest};
