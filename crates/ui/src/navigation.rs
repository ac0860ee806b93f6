//! Navigation bar component.

use web_engine::NavigationState;

/// Navigation bar button state.
pub struct NavigationBar {
    /// Back enabled.
    back: bool,
    /// Forward enabled.
    forward: bool,
    /// Reload enabled.
    reload: bool,
    /// Home enabled.
    home: bool,
    /// Is loading.
    loading: bool,
}

impl NavigationBar {
    /// Create a new navigation bar with no view attached.
    pub fn new() -> Self {
        Self {
            back: false,
            forward: false,
            reload: false,
            home: false,
            loading: false,
        }
    }

    /// Recompute button states for the current view.
    ///
    /// `view` is the current view's navigation state and URL, `None` when
    /// the window has no tab. Back stays disabled on the home page.
    pub fn update(&mut self, view: Option<(NavigationState, &str)>, home_page: &str) {
        match view {
            Some((state, url)) => {
                self.back = state.can_go_back && !same_page(url, home_page);
                self.forward = state.can_go_forward;
                self.reload = true;
                self.home = true;
            }
            None => {
                self.back = false;
                self.forward = false;
                self.reload = false;
                self.home = false;
                self.loading = false;
            }
        }
    }

    /// Check if an action is enabled.
    pub fn is_enabled(&self, action: NavigationAction) -> bool {
        match action {
            NavigationAction::Back => self.back,
            NavigationAction::Forward => self.forward,
            NavigationAction::Reload => self.reload,
            NavigationAction::Home => self.home,
            NavigationAction::NewTab => true,
        }
    }

    /// Set loading state.
    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Check if loading.
    pub fn is_loading(&self) -> bool {
        self.loading
    }
}

impl Default for NavigationBar {
    fn default() -> Self {
        Self::new()
    }
}

/// Compare URLs ignoring a trailing slash, as engines normalize one in.
fn same_page(a: &str, b: &str) -> bool {
    a.trim_end_matches('/') == b.trim_end_matches('/')
}

/// Navigation action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavigationAction {
    Back,
    Forward,
    Reload,
    Home,
    NewTab,
}

impl NavigationAction {
    /// All toolbar actions, in toolbar order.
    pub const ALL: [NavigationAction; 5] = [
        NavigationAction::Back,
        NavigationAction::Forward,
        NavigationAction::Reload,
        NavigationAction::Home,
        NavigationAction::NewTab,
    ];
}
