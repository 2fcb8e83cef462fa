use crate::error::{IdentityError, Result};
use parking_lot::RwLock;
use url::Url;

/// Page navigation as seen by the SDK.
pub trait Navigator: Send + Sync {
    /// Leaves the application for `url`. Control returns on the next load.
    fn navigate(&self, url: &Url) -> Result<()>;

    /// Location the application was loaded at; carries the redirect callback.
    fn current_location(&self) -> Option<Url>;
}

/// Navigator for terminal use.
///
/// Redirects are printed (and optionally opened in the system browser). The
/// callback location is whatever URL the user pastes back through
/// [`ConsoleNavigator::set_location`].
#[derive(Debug, Default)]
pub struct ConsoleNavigator {
    open_browser: bool,
    location: RwLock<Option<Url>>,
}

impl ConsoleNavigator {
    #[must_use]
    pub fn new(open_browser: bool) -> Self {
        Self {
            open_browser,
            location: RwLock::new(None),
        }
    }

    pub fn set_location(&self, location: Url) {
        *self.location.write() = Some(location);
    }
}

impl Navigator for ConsoleNavigator {
    fn navigate(&self, url: &Url) -> Result<()> {
        eprintln!("Continue sign-in in your browser:\n  {url}");
        if self.open_browser {
            tracing::info!("opening browser for redirect");
            open::that(url.as_str())
                .map_err(|e| IdentityError::Navigation(format!("failed to open browser: {e}")))?;
        }
        Ok(())
    }

    fn current_location(&self) -> Option<Url> {
        self.location.read().clone()
    }
}
