//! Engine trait and the values that cross it.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use common::ShellResult;

/// Back/forward availability reported by an engine view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NavigationState {
    /// The view has an entry behind the current one.
    pub can_go_back: bool,
    /// The view has an entry ahead of the current one.
    pub can_go_forward: bool,
}

/// Notification emitted by an engine view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineEvent {
    /// The committed URL changed.
    UrlChanged(String),
    /// The document title changed.
    TitleChanged(String),
    /// A load started.
    LoadStarted,
    /// Load progress in percent (0-100).
    LoadProgress(u8),
    /// A load finished.
    LoadFinished { success: bool },
}

/// Where an engine view keeps cookies, cache and site data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageConfig {
    /// Directory handed to the engine as its data path.
    pub data_dir: PathBuf,
    /// Whether the storage is thrown away when the session ends.
    pub off_the_record: bool,
}

impl StorageConfig {
    /// Persistent storage rooted at `data_dir`.
    pub fn persistent(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            off_the_record: false,
        }
    }

    /// Throwaway storage rooted at `data_dir`.
    pub fn ephemeral(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            off_the_record: true,
        }
    }

    /// Get the data directory.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

/// A single engine view (one per tab).
pub trait WebEngine {
    /// Start loading `url`.
    fn load(&mut self, url: &str) -> ShellResult<()>;

    /// Go back one history entry.
    fn go_back(&mut self);

    /// Go forward one history entry.
    fn go_forward(&mut self);

    /// Reload the current page.
    fn reload(&mut self);

    /// Current back/forward availability.
    fn navigation_state(&self) -> NavigationState;

    /// URL of the current page, if any.
    fn current_url(&self) -> Option<String>;

    /// Title of the current page.
    fn current_title(&self) -> String;

    /// Drain queued notifications.
    ///
    /// Engines that deliver notifications through their own event loop
    /// return an empty list.
    fn take_events(&mut self) -> Vec<EngineEvent> {
        Vec::new()
    }

    /// Show or hide the view.
    fn set_visible(&mut self, _visible: bool) {}
}

/// Creates engine views bound to a storage location.
pub trait EngineFactory {
    /// Create a new view using `storage` for its profile data.
    ///
    /// `view_id` is unique per window and tags the view's notifications.
    fn create(&self, view_id: u64, storage: &StorageConfig) -> ShellResult<Box<dyn WebEngine>>;
}

impl<F: EngineFactory + ?Sized> EngineFactory for Rc<F> {
    fn create(&self, view_id: u64, storage: &StorageConfig) -> ShellResult<Box<dyn WebEngine>> {
        (**self).create(view_id, storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_config() {
        let persistent = StorageConfig::persistent("/tmp/p/storage");
        assert!(!persistent.off_the_record);
        assert_eq!(persistent.data_dir(), Path::new("/tmp/p/storage"));

        let guest = StorageConfig::ephemeral("/tmp/g");
        assert!(guest.off_the_record);
    }

    #[test]
    fn test_default_navigation_state() {
        let state = NavigationState::default();
        assert!(!state.can_go_back);
        assert!(!state.can_go_forward);
    }
}
