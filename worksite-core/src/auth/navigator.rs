//! Navigation side effects (OAuth redirects)

use std::sync::RwLock;

use tracing::info;
use url::Url;

/// Performs full-page navigation on behalf of the client layer
pub trait Navigator: Send + Sync {
    /// Path (plus query) the user is currently on
    fn current_path(&self) -> String;

    /// Leave the current view for `url`
    fn navigate(&self, url: &Url);
}

/// Terminal result of a navigation. The caller must not act further.
#[must_use = "a redirect ends the current flow; return it to the caller"]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub location: Url,
}

/// Navigator that logs and records targets instead of driving a browser.
///
/// Embedders hosting a real view layer supply their own [`Navigator`].
pub struct LogNavigator {
    current_path: RwLock<String>,
    history: RwLock<Vec<Url>>,
}

impl LogNavigator {
    pub fn new(current_path: impl Into<String>) -> Self {
        Self {
            current_path: RwLock::new(current_path.into()),
            history: RwLock::new(Vec::new()),
        }
    }

    /// Update the path reported by [`Navigator::current_path`]
    pub fn set_current_path(&self, path: impl Into<String>) {
        *self.current_path.write().unwrap_or_else(|e| e.into_inner()) = path.into();
    }

    /// Every URL navigated to, oldest first
    pub fn history(&self) -> Vec<Url> {
        self.history.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Default for LogNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for LogNavigator {
    fn current_path(&self) -> String {
        self.current_path
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn navigate(&self, url: &Url) {
        info!("Navigating to {}", url);
        self.history
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(url.clone());
    }
}
