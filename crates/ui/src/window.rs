//! Browser window.

use std::collections::HashMap;

use common::ShellResult;
use tracing::{debug, warn};
use web_engine::{EngineEvent, EngineFactory, StorageConfig};

use crate::address_bar::{AddressBar, Destination};
use crate::navigation::{NavigationAction, NavigationBar};
use crate::settings::ShellSettings;
use crate::tab::{Tab, TabId, NEW_TAB_TITLE};
use crate::tab_bar::{TabBar, TabBarAction};

/// Browser window: toolbar, tab strip and one engine view per tab.
pub struct BrowserWindow {
    /// Tab bar.
    tab_bar: TabBar,
    /// Navigation bar.
    navigation_bar: NavigationBar,
    /// Address bar.
    address_bar: AddressBar,
    /// Tabs.
    tabs: HashMap<TabId, Tab>,
    /// Active tab ID.
    active_tab: Option<TabId>,
    /// Tab ID counter.
    tab_counter: u64,
    /// Creates the engine views.
    factory: Box<dyn EngineFactory>,
    /// Profile storage handed to every view.
    storage: StorageConfig,
    /// Profile label for the title bar.
    profile_label: String,
    /// Shell settings.
    settings: ShellSettings,
}

impl BrowserWindow {
    /// Create a window without tabs.
    pub fn new(
        factory: Box<dyn EngineFactory>,
        storage: StorageConfig,
        profile_label: impl Into<String>,
        settings: ShellSettings,
    ) -> Self {
        let mut window = Self {
            tab_bar: TabBar::new(),
            navigation_bar: NavigationBar::new(),
            address_bar: AddressBar::new(),
            tabs: HashMap::new(),
            active_tab: None,
            tab_counter: 0,
            factory,
            storage,
            profile_label: profile_label.into(),
            settings,
        };
        window.refresh_controls();
        window
    }

    /// Create a new tab loading `url`, or the home page.
    pub fn new_tab(&mut self, url: Option<&str>) -> ShellResult<TabId> {
        let id = TabId(self.tab_counter + 1);
        let view = self.factory.create(id.0, &self.storage)?;
        self.tab_counter = id.0;

        let mut tab = Tab::new(id, view);
        let url = url.unwrap_or(&self.settings.home_page).to_string();
        if let Err(e) = tab.navigate(&url) {
            warn!(url = %url, error = %e, "new tab failed to load");
        }

        self.tabs.insert(id, tab);
        self.tab_bar.add_tab(id, NEW_TAB_TITLE.to_string());
        debug!(tab = id.0, url = %url, "opened tab");

        self.set_active_tab(id);
        Ok(id)
    }

    /// Close a tab.
    pub fn close_tab(&mut self, id: TabId) -> ShellResult<()> {
        let successor = self.tab_bar.successor(id);
        if self.tabs.remove(&id).is_none() {
            return Ok(());
        }
        self.tab_bar.remove_tab(id);
        debug!(tab = id.0, "closed tab");

        if self.active_tab == Some(id) {
            self.active_tab = None;
            if let Some(next) = successor {
                self.set_active_tab(next);
            }
        }

        if self.tabs.is_empty() {
            if self.settings.keep_one_tab {
                self.new_tab(None)?;
            } else {
                self.address_bar.set_url("");
                self.refresh_controls();
            }
        }
        Ok(())
    }

    /// Close every tab, releasing the engine views.
    pub fn close_all(&mut self) {
        self.tabs.clear();
        self.tab_bar = TabBar::new();
        self.active_tab = None;
        self.address_bar.set_url("");
        self.refresh_controls();
    }

    /// Get a tab.
    pub fn tab(&self, id: TabId) -> Option<&Tab> {
        self.tabs.get(&id)
    }

    /// Get the active tab.
    pub fn active_tab(&self) -> Option<&Tab> {
        self.active_tab.and_then(|id| self.tabs.get(&id))
    }

    /// Get the active tab mutably.
    pub fn active_tab_mut(&mut self) -> Option<&mut Tab> {
        self.active_tab.and_then(|id| self.tabs.get_mut(&id))
    }

    /// Get the active tab ID.
    pub fn active_tab_id(&self) -> Option<TabId> {
        self.active_tab
    }

    /// Set the active tab.
    pub fn set_active_tab(&mut self, id: TabId) {
        if !self.tabs.contains_key(&id) {
            return;
        }

        self.active_tab = Some(id);
        self.tab_bar.set_active(id);
        for (tab_id, tab) in self.tabs.iter_mut() {
            tab.set_visible(*tab_id == id);
        }

        if let Some(tab) = self.tabs.get(&id) {
            self.address_bar.set_url(tab.url());
        }
        self.refresh_controls();
    }

    /// Activate the tab at a strip position.
    pub fn set_active_index(&mut self, index: usize) {
        if let Some(id) = self.tab_bar.id_at(index) {
            self.set_active_tab(id);
        }
    }

    /// Get the tab count.
    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    /// Get the tab bar.
    pub fn tab_bar(&self) -> &TabBar {
        &self.tab_bar
    }

    /// Get the address bar.
    pub fn address_bar(&self) -> &AddressBar {
        &self.address_bar
    }

    /// Get the navigation bar.
    pub fn navigation_bar(&self) -> &NavigationBar {
        &self.navigation_bar
    }

    /// Get the settings.
    pub fn settings(&self) -> &ShellSettings {
        &self.settings
    }

    /// Get the storage handed to engine views.
    pub fn storage(&self) -> &StorageConfig {
        &self.storage
    }

    /// Handle address bar submission.
    ///
    /// Returns where the input led, or `None` when nothing was loaded. A
    /// load the engine rejects leaves the tab on its current page.
    pub fn submit_address(&mut self, input: &str) -> Option<Destination> {
        self.address_bar.edit(input);
        let destination = self.address_bar.submit(&self.settings.search_engine);
        let url = destination.url()?.to_string();
        let tab = self.active_tab_mut()?;

        if let Err(e) = tab.navigate(&url) {
            warn!(url = %url, error = %e, "address failed to load");
            return None;
        }
        self.refresh_controls();
        Some(destination)
    }

    /// Start editing the address.
    pub fn focus_address_bar(&mut self) {
        self.address_bar.focus();
    }

    /// Abandon the address edit.
    pub fn revert_address(&mut self) {
        self.address_bar.revert();
    }

    /// Run a toolbar action if its button is enabled.
    pub fn perform(&mut self, action: NavigationAction) -> ShellResult<bool> {
        if !self.navigation_bar.is_enabled(action) {
            return Ok(false);
        }

        match action {
            NavigationAction::NewTab => {
                self.new_tab(None)?;
                return Ok(true);
            }
            NavigationAction::Home => {
                let home = self.settings.home_page.clone();
                if let Some(tab) = self.active_tab_mut() {
                    tab.navigate(&home)?;
                }
            }
            NavigationAction::Back => {
                if let Some(tab) = self.active_tab_mut() {
                    tab.go_back();
                }
            }
            NavigationAction::Forward => {
                if let Some(tab) = self.active_tab_mut() {
                    tab.go_forward();
                }
            }
            NavigationAction::Reload => {
                if let Some(tab) = self.active_tab_mut() {
                    tab.reload();
                }
            }
        }

        self.refresh_controls();
        Ok(true)
    }

    pub fn on_back(&mut self) -> ShellResult<bool> {
        self.perform(NavigationAction::Back)
    }

    pub fn on_forward(&mut self) -> ShellResult<bool> {
        self.perform(NavigationAction::Forward)
    }

    pub fn on_reload(&mut self) -> ShellResult<bool> {
        self.perform(NavigationAction::Reload)
    }

    pub fn on_home(&mut self) -> ShellResult<bool> {
        self.perform(NavigationAction::Home)
    }

    /// Handle a double click on the tab strip.
    pub fn on_tab_bar_double_click(&mut self, index: Option<usize>) -> ShellResult<Option<TabId>> {
        match self.tab_bar.on_double_click(index) {
            Some(TabBarAction::NewTab) => self.new_tab(None).map(Some),
            None => Ok(None),
        }
    }

    /// Drain and apply queued engine notifications from every tab.
    pub fn pump_events(&mut self) -> usize {
        let order: Vec<TabId> = self.tab_bar.tabs().iter().map(|t| t.id).collect();
        let mut handled = 0;

        for id in order {
            let events = match self.tabs.get_mut(&id) {
                Some(tab) => tab.take_events(),
                None => continue,
            };
            for event in events {
                self.handle_engine_event(id, event);
                handled += 1;
            }
        }
        handled
    }

    /// Apply one engine notification from tab `id`.
    pub fn handle_engine_event(&mut self, id: TabId, event: EngineEvent) {
        let Some(tab) = self.tabs.get_mut(&id) else {
            return;
        };
        tab.apply(&event);
        let is_active = self.active_tab == Some(id);

        match &event {
            EngineEvent::UrlChanged(url) => {
                if is_active {
                    self.address_bar.set_url(url);
                }
            }
            EngineEvent::TitleChanged(_) => {
                let title = tab.title().to_string();
                self.tab_bar.set_tab_title(id, title);
            }
            EngineEvent::LoadStarted => self.tab_bar.set_tab_loading(id, true),
            EngineEvent::LoadFinished { .. } => self.tab_bar.set_tab_loading(id, false),
            EngineEvent::LoadProgress(_) => {}
        }

        if is_active {
            self.refresh_controls();
        }
    }

    /// Recompute toolbar state from the active tab.
    pub fn refresh_controls(&mut self) {
        let home = self.settings.home_page.clone();
        match self.active_tab.and_then(|id| self.tabs.get(&id)) {
            Some(tab) => {
                self.navigation_bar
                    .update(Some((tab.navigation_state(), tab.url())), &home);
                self.navigation_bar.set_loading(tab.is_loading());
            }
            None => self.navigation_bar.update(None, &home),
        }
    }

    /// Title for the native window.
    pub fn window_title(&self) -> String {
        let app = &self.settings.app_name;
        let base = match self.active_tab() {
            Some(tab) if tab.title() != NEW_TAB_TITLE => format!("{} - {}", tab.title(), app),
            _ => app.clone(),
        };

        if self.storage.off_the_record {
            format!("{} (Guest)", base)
        } else {
            format!("{} [{}]", base, self.profile_label)
        }
    }
}
