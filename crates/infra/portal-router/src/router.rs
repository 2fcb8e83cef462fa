use crate::error::RouterError;
use crate::guard::{GuardState, NavigationGuard};
use crate::routes::{ResolvedRoute, RouteTable, names};
use parking_lot::RwLock;
use tokio::sync::Mutex;

/// A committed navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    /// Path the caller asked for.
    pub requested: String,
    /// Route that was committed.
    pub route: ResolvedRoute,
    /// Final guard state, when the guard ran.
    pub guard: Option<GuardState>,
}

impl Navigation {
    /// `true` when the guard turned the navigation away.
    #[must_use]
    pub fn denied(&self) -> bool {
        self.guard == Some(GuardState::Denied)
    }
}

/// Runs guarded navigations one at a time.
#[derive(Debug)]
pub struct Router {
    routes: RouteTable,
    guard: NavigationGuard,
    current: RwLock<Option<Navigation>>,
    turn: Mutex<()>,
}

impl Router {
    #[must_use]
    pub fn new(routes: RouteTable, guard: NavigationGuard) -> Self {
        Self {
            routes,
            guard,
            current: RwLock::new(None),
            turn: Mutex::new(()),
        }
    }

    #[must_use]
    pub const fn routes(&self) -> &RouteTable {
        &self.routes
    }

    #[must_use]
    pub const fn guard(&self) -> &NavigationGuard {
        &self.guard
    }

    /// Resolves `path`, runs the guard when it applies and commits the result.
    ///
    /// A denied navigation commits the unauthorized route instead; that route
    /// is not guarded again.
    pub async fn navigate(&self, path: &str) -> Result<Navigation, RouterError> {
        let _turn = self.turn.lock().await;

        let target = self.routes.resolve(path)?;
        let mut guard_state = None;
        let route = if self.guard.applies_to(&target) {
            let outcome = self.guard.check().await;
            guard_state = Some(outcome.state());
            if outcome.allowed() {
                target
            } else {
                tracing::info!(path = %target.path, "navigation denied");
                self.routes.resolve_name(names::UNAUTHORIZED)?
            }
        } else {
            target
        };

        let navigation = Navigation {
            requested: path.to_string(),
            route,
            guard: guard_state,
        };
        tracing::debug!(location = %navigation.route.path, "navigation committed");
        *self.current.write() = Some(navigation.clone());
        Ok(navigation)
    }

    /// Last committed navigation.
    pub fn current(&self) -> Option<Navigation> {
        self.current.read().clone()
    }
}
