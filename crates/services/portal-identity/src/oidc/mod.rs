//! OAuth2/OIDC public-client binding for [`crate::sdk::IdentitySdk`].
//!
//! Authorization code flow with PKCE, driven through full redirects. The
//! [`Navigator`] performs the redirects and reports the location the client
//! was loaded at; the [`crate::cache::CacheStore`] keeps accounts and tokens
//! between loads.

mod application;
mod authority;
mod id_token;
mod navigator;
mod token_exchange;

pub use application::PublicClientApplication;
pub use authority::AuthorityConfig;
pub use id_token::{IdTokenClaims, decode_id_token};
pub use navigator::{ConsoleNavigator, Navigator};
pub use token_exchange::TokenResponse;
