/// Errors raised while resolving or committing a navigation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// No route matches and the table has no catch-all.
    #[error("no route matches '{0}'")]
    NoRoute(String),

    /// Redirect aliases point back at each other.
    #[error("redirect loop while resolving '{0}'")]
    RedirectLoop(String),

    /// A route referenced by name is missing from the table.
    #[error("no route named '{0}'")]
    UnknownName(String),
}
