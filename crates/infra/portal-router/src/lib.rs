//! Routing for the portal client.
//!
//! A static [`RouteTable`] maps paths to routes, the [`NavigationGuard`]
//! forces sign-in before protected routes are entered, and the [`Router`]
//! runs one guarded navigation at a time.

pub mod error;
pub mod guard;
pub mod router;
pub mod routes;

pub use error::RouterError;
pub use guard::{GuardOutcome, GuardScope, GuardState, NavigationGuard};
pub use router::{Navigation, Router};
pub use routes::{PathPattern, ResolvedRoute, Route, RouteKind, RouteTable, names};
