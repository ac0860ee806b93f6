//! Browser session: one window bound to one profile.

use std::path::Path;

use common::ShellResult;
use profiles::{CleanupPolicy, CleanupReport, GuestSession, Profile, ProfileStore};
use tokio::task::JoinHandle;
use tracing::info;
use web_engine::EngineFactory;

use crate::profile_dialog::ProfileChoice;
use crate::settings::ShellSettings;
use crate::window::BrowserWindow;

/// Browser session.
pub struct Browser {
    /// Profile in use.
    profile: Profile,
    /// Guest storage, when running as guest.
    guest: Option<GuestSession>,
    /// The browser window.
    window: BrowserWindow,
}

impl Browser {
    /// Resolve the chosen profile and open the window with one tab.
    ///
    /// `start_url` defaults to the home page. Guest storage is created
    /// under `guest_parent`.
    pub fn launch(
        store: &ProfileStore,
        choice: &ProfileChoice,
        factory: Box<dyn EngineFactory>,
        settings: ShellSettings,
        guest_parent: &Path,
        start_url: Option<&str>,
    ) -> ShellResult<Self> {
        let (profile, guest) = match choice {
            ProfileChoice::Existing(name) => (store.open_profile(name)?, None),
            ProfileChoice::Guest => {
                let session = GuestSession::start(guest_parent)?;
                (session.profile().clone(), Some(session))
            }
        };

        info!(profile = %profile.name(), guest = profile.is_guest(), "launching session");

        let mut window =
            BrowserWindow::new(factory, profile.storage_config(), profile.name(), settings);
        window.new_tab(start_url)?;

        Ok(Self {
            profile,
            guest,
            window,
        })
    }

    /// Get the profile in use.
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Get the window.
    pub fn window(&self) -> &BrowserWindow {
        &self.window
    }

    /// Get the window mutably.
    pub fn window_mut(&mut self) -> &mut BrowserWindow {
        &mut self.window
    }

    /// Close the window and schedule guest storage removal.
    ///
    /// The window and its engine factory are dropped before cleanup starts.
    /// Returns the cleanup task for guest sessions.
    pub fn shutdown(self, policy: CleanupPolicy) -> ShellResult<Option<JoinHandle<CleanupReport>>> {
        let Browser {
            profile,
            guest,
            mut window,
        } = self;
        window.close_all();
        drop(window);
        info!(profile = %profile.name(), "session closed");

        match guest {
            Some(session) => session.finish(policy).map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use profiles::CleanupOutcome;
    use std::rc::Rc;
    use std::time::Duration;
    use tempfile::TempDir;
    use web_engine::HeadlessEngineFactory;

    fn setup() -> (TempDir, ProfileStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = ProfileStore::open(temp_dir.path().join("data")).unwrap();
        store.ensure_default().unwrap();
        (temp_dir, store)
    }

    #[test]
    fn test_launch_named_profile() {
        let (temp_dir, store) = setup();
        let factory = Rc::new(HeadlessEngineFactory::new());

        let mut browser = Browser::launch(
            &store,
            &ProfileChoice::Existing("default".into()),
            Box::new(factory.clone()),
            ShellSettings::default(),
            temp_dir.path(),
            Some("https://example.com"),
        )
        .unwrap();
        browser.window_mut().pump_events();

        assert_eq!(browser.profile().name(), "default");
        assert_eq!(factory.created(), 1);
        assert_eq!(browser.window().address_bar().url(), "https://example.com/");
        assert_eq!(
            browser.window().storage().data_dir,
            browser.profile().storage_dir()
        );

        let storages = factory.storages();
        assert!(!storages[0].off_the_record);
        assert_eq!(storages[0].data_dir(), store.directory().join("default").join("storage"));
    }

    #[test]
    fn test_launch_missing_profile_fails() {
        let (temp_dir, store) = setup();
        let result = Browser::launch(
            &store,
            &ProfileChoice::Existing("missing".into()),
            Box::new(HeadlessEngineFactory::new()),
            ShellSettings::default(),
            temp_dir.path(),
            None,
        );
        assert!(matches!(result, Err(e) if e.is_not_found()));
    }

    #[tokio::test]
    async fn test_guest_session_cleanup() {
        let (temp_dir, store) = setup();
        let guest_parent = temp_dir.path().join("tmp");
        let factory = Rc::new(HeadlessEngineFactory::new());

        let mut browser = Browser::launch(
            &store,
            &ProfileChoice::Guest,
            Box::new(factory.clone()),
            ShellSettings::default(),
            &guest_parent,
            None,
        )
        .unwrap();

        let guest_root = browser.profile().root().to_path_buf();
        assert!(browser.profile().is_guest());
        assert!(browser.window().storage().off_the_record);
        assert!(guest_root.exists());

        browser.window_mut().new_tab(Some("https://example.org")).unwrap();
        let storages = factory.storages();
        assert_eq!(storages.len(), 2);
        for storage in &storages {
            assert!(storage.off_the_record);
            assert_eq!(storage.data_dir(), browser.profile().storage_dir());
            assert!(storage.data_dir().starts_with(&guest_parent));
        }

        let handle = browser
            .shutdown(CleanupPolicy::new(3, Duration::from_millis(1)))
            .unwrap()
            .unwrap();
        // The boxed factory went down with the window.
        assert_eq!(Rc::strong_count(&factory), 1);
        let report = handle.await.unwrap();

        assert_eq!(report.outcome, CleanupOutcome::Removed);
        assert!(!guest_root.exists());
        // Named profiles are untouched.
        assert!(store.exists("default").unwrap());
    }

    #[test]
    fn test_named_shutdown_keeps_storage() {
        let (temp_dir, store) = setup();
        let browser = Browser::launch(
            &store,
            &ProfileChoice::Existing("default".into()),
            Box::new(HeadlessEngineFactory::new()),
            ShellSettings::default(),
            temp_dir.path(),
            None,
        )
        .unwrap();
        let root = browser.profile().root().to_path_buf();

        assert!(browser.shutdown(CleanupPolicy::default()).unwrap().is_none());
        assert!(root.exists());
    }
}
