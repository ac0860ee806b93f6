//! Tab bar component.

use crate::tab::TabId;

/// Tab bar.
pub struct TabBar {
    /// Tab entries, in strip order.
    tabs: Vec<TabEntry>,
    /// Active tab.
    active: Option<TabId>,
}

impl TabBar {
    /// Create a new tab bar.
    pub fn new() -> Self {
        Self {
            tabs: Vec::new(),
            active: None,
        }
    }

    /// Append a tab and return its index.
    pub fn add_tab(&mut self, id: TabId, title: String) -> usize {
        self.tabs.push(TabEntry {
            id,
            title,
            loading: false,
        });
        self.tabs.len() - 1
    }

    /// Remove a tab.
    pub fn remove_tab(&mut self, id: TabId) {
        self.tabs.retain(|t| t.id != id);
        if self.active == Some(id) {
            self.active = None;
        }
    }

    /// Set the active tab.
    pub fn set_active(&mut self, id: TabId) {
        if self.index_of(id).is_some() {
            self.active = Some(id);
        }
    }

    /// Get the active tab.
    pub fn active(&self) -> Option<TabId> {
        self.active
    }

    /// Get the active index.
    pub fn active_index(&self) -> Option<usize> {
        self.active.and_then(|id| self.index_of(id))
    }

    /// Position of a tab in the strip.
    pub fn index_of(&self, id: TabId) -> Option<usize> {
        self.tabs.iter().position(|t| t.id == id)
    }

    /// Tab at a strip position.
    pub fn id_at(&self, index: usize) -> Option<TabId> {
        self.tabs.get(index).map(|t| t.id)
    }

    /// Set tab title.
    pub fn set_tab_title(&mut self, id: TabId, title: String) {
        if let Some(tab) = self.tabs.iter_mut().find(|t| t.id == id) {
            tab.title = title;
        }
    }

    /// Set tab loading state.
    pub fn set_tab_loading(&mut self, id: TabId, loading: bool) {
        if let Some(tab) = self.tabs.iter_mut().find(|t| t.id == id) {
            tab.loading = loading;
        }
    }

    /// Get tabs.
    pub fn tabs(&self) -> &[TabEntry] {
        &self.tabs
    }

    /// Get tab count.
    pub fn count(&self) -> usize {
        self.tabs.len()
    }

    /// Handle a double click on the strip; `None` is the empty area.
    pub fn on_double_click(&self, index: Option<usize>) -> Option<TabBarAction> {
        match index {
            None => Some(TabBarAction::NewTab),
            Some(_) => None,
        }
    }

    /// Neighbour to activate when `id` closes: the next tab, else the previous.
    pub fn successor(&self, id: TabId) -> Option<TabId> {
        let index = self.index_of(id)?;
        self.tabs
            .get(index + 1)
            .or_else(|| index.checked_sub(1).and_then(|i| self.tabs.get(i)))
            .map(|t| t.id)
    }
}

impl Default for TabBar {
    fn default() -> Self {
        Self::new()
    }
}

/// Tab entry in the tab bar.
#[derive(Clone, Debug)]
pub struct TabEntry {
    /// Tab ID.
    pub id: TabId,
    /// Title.
    pub title: String,
    /// Is loading.
    pub loading: bool,
}

/// Tab bar action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TabBarAction {
    NewTab,
}
