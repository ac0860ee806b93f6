//! In-process engine without a window.

use std::cell::RefCell;
use std::collections::VecDeque;

use common::ShellResult;
use url::Url;

use crate::engine::{EngineEvent, EngineFactory, NavigationState, StorageConfig, WebEngine};

/// Headless engine view.
///
/// Keeps its own back/forward list and reports every load as an immediate
/// success. The page title is the URL's host.
pub struct HeadlessEngine {
    /// Storage the view was created with.
    storage: StorageConfig,
    /// Back/forward list.
    history: NavigationHistory,
    /// Pending notifications.
    events: VecDeque<EngineEvent>,
}

impl HeadlessEngine {
    /// Create a new headless view.
    pub fn new(storage: StorageConfig) -> Self {
        Self {
            storage,
            history: NavigationHistory::new(),
            events: VecDeque::new(),
        }
    }

    /// Get the storage configuration.
    pub fn storage(&self) -> &StorageConfig {
        &self.storage
    }

    fn commit(&mut self, url: &str) {
        self.events.push_back(EngineEvent::LoadStarted);
        self.events.push_back(EngineEvent::UrlChanged(url.to_string()));
        self.events.push_back(EngineEvent::LoadProgress(100));
        self.events.push_back(EngineEvent::LoadFinished { success: true });
        self.events.push_back(EngineEvent::TitleChanged(title_for(url)));
    }
}

impl WebEngine for HeadlessEngine {
    fn load(&mut self, url: &str) -> ShellResult<()> {
        let parsed = Url::parse(url)?;
        let url = parsed.to_string();
        tracing::debug!(url = %url, "headless load");

        self.history.push(url.clone());
        self.commit(&url);
        Ok(())
    }

    fn go_back(&mut self) {
        if let Some(url) = self.history.go_back().cloned() {
            self.commit(&url);
        }
    }

    fn go_forward(&mut self) {
        if let Some(url) = self.history.go_forward().cloned() {
            self.commit(&url);
        }
    }

    fn reload(&mut self) {
        if let Some(url) = self.history.current().cloned() {
            self.commit(&url);
        }
    }

    fn navigation_state(&self) -> NavigationState {
        NavigationState {
            can_go_back: self.history.can_go_back(),
            can_go_forward: self.history.can_go_forward(),
        }
    }

    fn current_url(&self) -> Option<String> {
        self.history.current().cloned()
    }

    fn current_title(&self) -> String {
        self.history.current().map(|u| title_for(u)).unwrap_or_default()
    }

    fn take_events(&mut self) -> Vec<EngineEvent> {
        self.events.drain(..).collect()
    }

    fn set_visible(&mut self, visible: bool) {
        tracing::trace!(visible, "headless visibility");
    }
}

fn title_for(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| url.to_string())
}

/// Factory for [`HeadlessEngine`] views.
#[derive(Default)]
pub struct HeadlessEngineFactory {
    storages: RefCell<Vec<StorageConfig>>,
}

impl HeadlessEngineFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of views created so far.
    pub fn created(&self) -> usize {
        self.storages.borrow().len()
    }

    /// Storage handed to each view, in creation order.
    pub fn storages(&self) -> Vec<StorageConfig> {
        self.storages.borrow().clone()
    }
}

impl EngineFactory for HeadlessEngineFactory {
    fn create(&self, _view_id: u64, storage: &StorageConfig) -> ShellResult<Box<dyn WebEngine>> {
        self.storages.borrow_mut().push(storage.clone());
        Ok(Box::new(HeadlessEngine::new(storage.clone())))
    }
}

/// Back/forward list.
pub struct NavigationHistory {
    /// History entries.
    entries: Vec<String>,
    /// Current index.
    current: Option<usize>,
    /// Maximum history size.
    max_size: usize,
}

impl NavigationHistory {
    /// Create a new navigation history.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            current: None,
            max_size: 50,
        }
    }

    /// Push a new entry, dropping any forward entries.
    pub fn push(&mut self, url: String) {
        if let Some(current) = self.current {
            self.entries.truncate(current + 1);
        }

        self.entries.push(url);

        // Enforce max size
        if self.entries.len() > self.max_size {
            self.entries.remove(0);
        }
        self.current = Some(self.entries.len() - 1);
    }

    /// Record a URL committed by the engine itself.
    ///
    /// Commits of the current entry (reloads, or the target of a back or
    /// forward step) leave the list alone.
    pub fn record(&mut self, url: &str) {
        if self.current().map(String::as_str) != Some(url) {
            self.push(url.to_string());
        }
    }

    /// Go back and return the URL.
    pub fn go_back(&mut self) -> Option<&String> {
        match self.current {
            Some(current) if current > 0 => {
                self.current = Some(current - 1);
                self.entries.get(current - 1)
            }
            _ => None,
        }
    }

    /// Go forward and return the URL.
    pub fn go_forward(&mut self) -> Option<&String> {
        match self.current {
            Some(current) if current + 1 < self.entries.len() => {
                self.current = Some(current + 1);
                self.entries.get(current + 1)
            }
            _ => None,
        }
    }

    pub fn can_go_back(&self) -> bool {
        matches!(self.current, Some(current) if current > 0)
    }

    pub fn can_go_forward(&self) -> bool {
        matches!(self.current, Some(current) if current + 1 < self.entries.len())
    }

    /// Get the current entry.
    pub fn current(&self) -> Option<&String> {
        self.current.and_then(|i| self.entries.get(i))
    }

    /// Get all entries.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

impl Default for NavigationHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> HeadlessEngine {
        HeadlessEngine::new(StorageConfig::persistent("/tmp/wayfarer-test"))
    }

    #[test]
    fn test_load_emits_events() {
        let mut engine = engine();
        engine.load("https://example.com/").unwrap();

        let events = engine.take_events();
        assert_eq!(events.first(), Some(&EngineEvent::LoadStarted));
        assert!(events.contains(&EngineEvent::UrlChanged("https://example.com/".into())));
        assert!(events.contains(&EngineEvent::LoadFinished { success: true }));
        assert!(events.contains(&EngineEvent::TitleChanged("example.com".into())));
        assert!(engine.take_events().is_empty());
    }

    #[test]
    fn test_load_rejects_garbage() {
        let mut engine = engine();
        assert!(engine.load("not a url").is_err());
        assert_eq!(engine.current_url(), None);
        assert!(engine.take_events().is_empty());
    }

    #[test]
    fn test_back_and_forward() {
        let mut engine = engine();
        engine.load("https://page1.com/").unwrap();
        engine.load("https://page2.com/").unwrap();

        assert_eq!(
            engine.navigation_state(),
            NavigationState { can_go_back: true, can_go_forward: false }
        );

        engine.go_back();
        assert_eq!(engine.current_url().as_deref(), Some("https://page1.com/"));
        assert!(engine.navigation_state().can_go_forward);

        engine.go_forward();
        assert_eq!(engine.current_title(), "page2.com");
    }

    #[test]
    fn test_boundaries_are_quiet() {
        let mut engine = engine();
        engine.go_back();
        engine.go_forward();
        engine.reload();
        assert!(engine.take_events().is_empty());

        engine.load("https://page1.com/").unwrap();
        engine.take_events();
        engine.go_back();
        assert!(engine.take_events().is_empty());
    }

    #[test]
    fn test_history_truncation() {
        let mut history = NavigationHistory::new();

        history.push("https://page1.com".to_string());
        history.push("https://page2.com".to_string());
        history.push("https://page3.com".to_string());

        history.go_back();
        history.push("https://page4.com".to_string());

        assert!(!history.can_go_forward());
        assert_eq!(history.entries().len(), 3);
        assert_eq!(history.current().map(String::as_str), Some("https://page4.com"));
    }

    #[test]
    fn test_history_record() {
        let mut history = NavigationHistory::new();
        history.record("https://page1.com");
        history.record("https://page2.com");
        history.go_back();
        history.record("https://page1.com");

        assert_eq!(history.entries().len(), 2);
        assert!(history.can_go_forward());

        history.record("https://page3.com");
        assert!(!history.can_go_forward());
        assert_eq!(history.entries().len(), 2);
    }

    #[test]
    fn test_history_max_size() {
        let mut history = NavigationHistory::new();
        for i in 0..60 {
            history.push(format!("https://page{}.com", i));
        }

        assert_eq!(history.entries().len(), 50);
        assert_eq!(history.current().map(String::as_str), Some("https://page59.com"));
        assert_eq!(history.entries()[0], "https://page10.com");
    }

    #[test]
    fn test_factory_binds_storage() {
        let factory = HeadlessEngineFactory::new();
        let storage = StorageConfig::ephemeral("/tmp/guest");
        let mut view = factory.create(1, &storage).unwrap();
        view.load("https://example.com").unwrap();
        factory.create(2, &StorageConfig::persistent("/tmp/work")).unwrap();

        assert_eq!(factory.created(), 2);
        assert_eq!(factory.storages()[0], storage);
        assert!(!factory.storages()[1].off_the_record);
        assert_eq!(view.current_url().as_deref(), Some("https://example.com/"));
    }

    #[test]
    fn test_engine_keeps_storage() {
        let engine = HeadlessEngine::new(StorageConfig::ephemeral("/tmp/guest/storage"));
        assert!(engine.storage().off_the_record);
        assert_eq!(engine.storage().data_dir(), std::path::Path::new("/tmp/guest/storage"));
    }
}
