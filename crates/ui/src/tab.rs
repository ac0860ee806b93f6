//! Browser tab.

use common::ShellResult;
use web_engine::{EngineEvent, NavigationState, WebEngine};

/// Title shown until the engine reports one.
pub const NEW_TAB_TITLE: &str = "New Tab";

/// Tab identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TabId(pub u64);

/// Browser tab backed by one engine view.
pub struct Tab {
    /// Tab ID.
    id: TabId,
    /// Engine view.
    view: Box<dyn WebEngine>,
    /// Last URL reported by the view.
    url: String,
    /// Page title.
    title: String,
    /// Loading state.
    loading: bool,
    /// Load progress (0 - 100).
    progress: u8,
}

impl Tab {
    /// Create a new tab around an engine view.
    pub fn new(id: TabId, view: Box<dyn WebEngine>) -> Self {
        Self {
            id,
            view,
            url: String::new(),
            title: NEW_TAB_TITLE.to_string(),
            loading: false,
            progress: 0,
        }
    }

    /// Get the tab ID.
    pub fn id(&self) -> TabId {
        self.id
    }

    /// Get the current URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get the page title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Check if loading.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Get load progress.
    pub fn progress(&self) -> u8 {
        self.progress
    }

    /// Navigate to a URL.
    pub fn navigate(&mut self, url: &str) -> ShellResult<()> {
        self.view.load(url)
    }

    /// Reload the page.
    pub fn reload(&mut self) {
        self.view.reload();
    }

    /// Go back in history.
    pub fn go_back(&mut self) {
        self.view.go_back();
    }

    /// Go forward in history.
    pub fn go_forward(&mut self) {
        self.view.go_forward();
    }

    /// Back/forward availability from the view.
    pub fn navigation_state(&self) -> NavigationState {
        self.view.navigation_state()
    }

    /// Show or hide the view.
    pub fn set_visible(&mut self, visible: bool) {
        self.view.set_visible(visible);
    }

    /// Drain pending engine notifications.
    pub fn take_events(&mut self) -> Vec<EngineEvent> {
        self.view.take_events()
    }

    /// Re-read URL and title from the view.
    pub fn sync_from_view(&mut self) {
        if let Some(url) = self.view.current_url() {
            self.url = url;
        }
        let title = self.view.current_title();
        if !title.is_empty() {
            self.title = title;
        }
    }

    /// Apply an engine notification to the mirrored state.
    pub fn apply(&mut self, event: &EngineEvent) {
        match event {
            EngineEvent::UrlChanged(url) => self.url = url.clone(),
            EngineEvent::TitleChanged(title) => {
                if !title.is_empty() {
                    self.title = title.clone();
                }
            }
            EngineEvent::LoadStarted => {
                self.loading = true;
                self.progress = 0;
            }
            EngineEvent::LoadProgress(progress) => self.progress = (*progress).min(100),
            EngineEvent::LoadFinished { success } => {
                self.loading = false;
                if *success {
                    self.progress = 100;
                }
            }
        }
    }
}
