use crate::error::RouterError;

/// Route names used by the default table.
pub mod names {
    pub const HOME: &str = "home";
    pub const UNAUTHORIZED: &str = "unauthorized";
    pub const NOT_FOUND: &str = "not-found";
}

/// Redirect chains longer than this are treated as loops.
const MAX_REDIRECTS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    /// Matches one normalized path.
    Exact(String),
    /// Matches anything; consulted only when nothing else does.
    CatchAll,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteKind {
    View,
    /// Alias for another path.
    Redirect(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub pattern: PathPattern,
    pub name: Option<String>,
    pub kind: RouteKind,
    pub requires_auth: bool,
}

impl Route {
    #[must_use]
    pub fn view(path: &str, name: &str) -> Self {
        Self {
            pattern: PathPattern::Exact(normalize(path)),
            name: Some(name.to_string()),
            kind: RouteKind::View,
            requires_auth: false,
        }
    }

    #[must_use]
    pub fn redirect(path: &str, to: &str) -> Self {
        Self {
            pattern: PathPattern::Exact(normalize(path)),
            name: None,
            kind: RouteKind::Redirect(to.to_string()),
            requires_auth: false,
        }
    }

    #[must_use]
    pub fn catch_all(name: &str) -> Self {
        Self {
            pattern: PathPattern::CatchAll,
            name: Some(name.to_string()),
            kind: RouteKind::View,
            requires_auth: false,
        }
    }

    /// Marks the route as requiring a signed-in user.
    #[must_use]
    pub const fn protected(mut self) -> Self {
        self.requires_auth = true;
        self
    }
}

/// Outcome of [`RouteTable::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    /// Normalized path after following redirects.
    pub path: String,
    pub name: Option<String>,
    pub requires_auth: bool,
    /// Paths of redirect aliases followed on the way, in order.
    pub redirected_from: Vec<String>,
}

/// Static route table, fixed at construction.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    #[must_use]
    pub const fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// Home (protected), `/auth` alias for home, the unauthorized page and a
    /// catch-all not-found page.
    #[must_use]
    pub fn portal_default() -> Self {
        Self::new(vec![
            Route::view("/", names::HOME).protected(),
            Route::redirect("/auth", "/"),
            Route::view("/unauthorized", names::UNAUTHORIZED),
            Route::catch_all(names::NOT_FOUND),
        ])
    }

    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Resolves `path`, ignoring any query or fragment.
    pub fn resolve(&self, path: &str) -> Result<ResolvedRoute, RouterError> {
        let mut current = normalize(path);
        let mut redirected_from = Vec::new();

        loop {
            let route = self
                .find(&current)
                .ok_or_else(|| RouterError::NoRoute(current.clone()))?;

            match &route.kind {
                RouteKind::View => {
                    return Ok(ResolvedRoute {
                        path: current,
                        name: route.name.clone(),
                        requires_auth: route.requires_auth,
                        redirected_from,
                    });
                }
                RouteKind::Redirect(to) => {
                    let next = normalize(to);
                    if redirected_from.len() >= MAX_REDIRECTS
                        || next == current
                        || redirected_from.contains(&next)
                    {
                        return Err(RouterError::RedirectLoop(normalize(path)));
                    }
                    tracing::trace!(from = %current, to = %next, "following route alias");
                    redirected_from.push(std::mem::replace(&mut current, next));
                }
            }
        }
    }

    /// Resolves the route registered under `name`.
    pub fn resolve_name(&self, name: &str) -> Result<ResolvedRoute, RouterError> {
        let route = self
            .routes
            .iter()
            .find(|r| r.name.as_deref() == Some(name))
            .ok_or_else(|| RouterError::UnknownName(name.to_string()))?;
        match &route.pattern {
            PathPattern::Exact(path) => self.resolve(path),
            PathPattern::CatchAll => Ok(ResolvedRoute {
                path: "/".into(),
                name: route.name.clone(),
                requires_auth: route.requires_auth,
                redirected_from: Vec::new(),
            }),
        }
    }

    fn find(&self, path: &str) -> Option<&Route> {
        self.routes
            .iter()
            .find(|r| matches!(&r.pattern, PathPattern::Exact(p) if p == path))
            .or_else(|| {
                self.routes
                    .iter()
                    .find(|r| r.pattern == PathPattern::CatchAll)
            })
    }
}

/// Drops query and fragment, ensures a leading `/` and no trailing `/`.
fn normalize(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default().trim();
    let trimmed = path.trim_matches('/');
    format!("/{trimmed}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_paths() {
        assert_eq!(normalize(""), "/");
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize("unauthorized/"), "/unauthorized");
        assert_eq!(normalize("/auth?code=1&state=2#frag"), "/auth");
    }

    #[test]
    fn default_home_is_protected() {
        let table = RouteTable::portal_default();
        let home = table.resolve("/").unwrap();
        assert_eq!(home.name.as_deref(), Some(names::HOME));
        assert!(home.requires_auth);
        assert!(home.redirected_from.is_empty());
    }

    #[test]
    fn auth_callback_redirects_to_home() {
        let table = RouteTable::portal_default();
        let resolved = table.resolve("/auth?code=abc&state=xyz").unwrap();
        assert_eq!(resolved.path, "/");
        assert!(resolved.requires_auth);
        assert_eq!(resolved.redirected_from, vec!["/auth".to_string()]);
    }

    #[test]
    fn unknown_path_falls_back_to_catch_all() {
        let table = RouteTable::portal_default();
        let resolved = table.resolve("/does/not/exist").unwrap();
        assert_eq!(resolved.name.as_deref(), Some(names::NOT_FOUND));
        assert_eq!(resolved.path, "/does/not/exist");
        assert!(!resolved.requires_auth);

        let unauthorized = table.resolve("/unauthorized").unwrap();
        assert!(!unauthorized.requires_auth);
    }

    #[test]
    fn redirect_loop_is_an_error() {
        let table = RouteTable::new(vec![Route::redirect("/a", "/b"), Route::redirect("/b", "/a")]);
        assert_eq!(
            table.resolve("/a"),
            Err(RouterError::RedirectLoop("/a".into()))
        );

        let table = RouteTable::new(vec![Route::redirect("/self", "/self/")]);
        assert!(matches!(table.resolve("/self"), Err(RouterError::RedirectLoop(_))));
    }

    #[test]
    fn missing_route_without_catch_all() {
        let table = RouteTable::new(vec![Route::view("/", names::HOME)]);
        assert_eq!(
            table.resolve("/nope"),
            Err(RouterError::NoRoute("/nope".into()))
        );
    }

    #[test]
    fn resolves_by_name() {
        let table = RouteTable::portal_default();
        assert_eq!(
            table.resolve_name(names::UNAUTHORIZED).unwrap().path,
            "/unauthorized"
        );
        assert_eq!(
            table.resolve_name("missing"),
            Err(RouterError::UnknownName("missing".into()))
        );
    }
}
