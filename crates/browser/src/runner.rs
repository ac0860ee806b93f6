//! Headless session runner and the pieces shared with the windowed one.

use anyhow::{Context, Result};
use profiles::cleanup::sweep_stale_guests;
use profiles::{CleanupReport, ProfileStore};
use tracing::{info, warn};
use ui::{classify_input, Browser, ProfileChoice, SearchEngine};
use web_engine::{HeadlessEngineFactory, NavigationState};

use crate::config::ShellConfig;

/// What a finished session looked like.
#[derive(Clone, Debug)]
pub struct SessionSummary {
    /// Profile name.
    pub profile: String,
    /// Whether the session was a guest session.
    pub guest: bool,
    /// URL of the active tab when the session closed.
    pub url: String,
    /// Title of the active tab.
    pub title: String,
    /// Window title.
    pub window_title: String,
    /// Back/forward state of the active tab.
    pub navigation: NavigationState,
    /// Guest storage cleanup, for guest sessions.
    pub cleanup: Option<CleanupReport>,
}

/// Turn a command-line start argument into a URL.
///
/// Bare hosts get a scheme and anything else becomes a search.
pub fn resolve_start_url(input: Option<&str>, search: &SearchEngine) -> Option<String> {
    input.and_then(|text| classify_input(text, search).url().map(str::to_string))
}

/// Remove guest storage abandoned by earlier runs before a guest session
/// starts. Directories of guest sessions still running are kept.
pub async fn sweep_stale_guest_storage(config: &ShellConfig) -> Vec<CleanupReport> {
    let stale = sweep_stale_guests(&config.guest_parent(), config.cleanup_policy()).await;
    if !stale.is_empty() {
        info!(count = stale.len(), "removed stale guest storage");
    }
    stale
}

/// Run one session against the headless engine.
pub async fn run_headless(
    config: &ShellConfig,
    store: &ProfileStore,
    choice: &ProfileChoice,
    start_url: Option<&str>,
) -> Result<SessionSummary> {
    let policy = config.cleanup_policy();
    let guest_parent = config.guest_parent();

    if matches!(choice, ProfileChoice::Guest) {
        sweep_stale_guest_storage(config).await;
    }

    let settings = config.settings();
    let start_url = resolve_start_url(start_url, &settings.search_engine);

    let mut browser = Browser::launch(
        store,
        choice,
        Box::new(HeadlessEngineFactory::new()),
        settings,
        &guest_parent,
        start_url.as_deref(),
    )
    .context("launching session")?;

    let handled = browser.window_mut().pump_events();
    let window = browser.window();

    let (url, title, navigation) = match window.active_tab() {
        Some(tab) => (
            tab.url().to_string(),
            tab.title().to_string(),
            tab.navigation_state(),
        ),
        None => (String::new(), String::new(), NavigationState::default()),
    };

    info!(
        events = handled,
        url = %url,
        title = %title,
        can_go_back = navigation.can_go_back,
        can_go_forward = navigation.can_go_forward,
        "{}",
        window.window_title()
    );

    let window_title = window.window_title();
    let profile = browser.profile().name().to_string();
    let guest = browser.profile().is_guest();

    let cleanup = match browser.shutdown(policy)? {
        Some(handle) => {
            let report = handle.await.context("guest cleanup task")?;
            if !report.is_clean() {
                warn!(dir = %report.path.display(), "guest storage left behind");
            }
            Some(report)
        }
        None => None,
    };

    Ok(SessionSummary {
        profile,
        guest,
        url,
        title,
        window_title,
        navigation,
        cleanup,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use profiles::CleanupOutcome;
    use tempfile::TempDir;

    fn setup() -> (TempDir, ShellConfig, ProfileStore) {
        let temp_dir = TempDir::new().unwrap();
        let config = ShellConfig::new()
            .with_data_dir(temp_dir.path().join("data"))
            .with_guest_dir(temp_dir.path().join("tmp"));
        let store = ProfileStore::open(config.data_root().unwrap()).unwrap();
        store.ensure_default().unwrap();
        (temp_dir, config, store)
    }

    #[test]
    fn test_resolve_start_url() {
        let search = SearchEngine::default();
        assert_eq!(resolve_start_url(None, &search), None);
        assert_eq!(resolve_start_url(Some("  "), &search), None);
        assert_eq!(
            resolve_start_url(Some("example.com"), &search).as_deref(),
            Some("https://example.com")
        );
        assert_eq!(
            resolve_start_url(Some("rust books"), &search).as_deref(),
            Some("https://www.google.com/search?q=rust%20books")
        );
    }

    #[tokio::test]
    async fn test_named_session() {
        let (_dir, config, store) = setup();
        let choice = ProfileChoice::Existing("default".into());

        let summary = run_headless(&config, &store, &choice, Some("example.com"))
            .await
            .unwrap();

        assert_eq!(summary.profile, "default");
        assert!(!summary.guest);
        assert_eq!(summary.url, "https://example.com/");
        assert_eq!(summary.title, "example.com");
        assert_eq!(summary.window_title, "example.com - Wayfarer [default]");
        assert!(!summary.navigation.can_go_back);
        assert!(summary.cleanup.is_none());
    }

    #[tokio::test]
    async fn test_guest_session_is_removed() {
        let (dir, config, store) = setup();
        let guest_parent = dir.path().join("tmp");
        abandon_guest_dir(&guest_parent, "stale");

        let summary = run_headless(&config, &store, &ProfileChoice::Guest, None)
            .await
            .unwrap();

        assert!(summary.guest);
        assert_eq!(summary.url, "https://www.google.com/");
        let report = summary.cleanup.unwrap();
        assert_eq!(report.outcome, CleanupOutcome::Removed);
        assert!(!report.path.exists());
        assert_eq!(std::fs::read_dir(&guest_parent).unwrap().count(), 0);
    }

    fn abandon_guest_dir(parent: &std::path::Path, name: &str) -> std::path::PathBuf {
        let dir = parent.join(format!("{}{}", profiles::guest::GUEST_PREFIX, name));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(profiles::guest::LOCK_FILE), "4000000000").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_sweep_spares_running_guest() {
        let (_dir, config, _store) = setup();
        let guest_parent = config.guest_parent();
        let stale = abandon_guest_dir(&guest_parent, "stale");
        let running = profiles::GuestSession::start(&guest_parent).unwrap();

        let reports = sweep_stale_guest_storage(&config).await;

        assert_eq!(reports.len(), 1);
        assert!(!stale.exists());
        assert!(running.root().exists());
    }

    #[tokio::test]
    async fn test_missing_profile_fails() {
        let (_dir, config, store) = setup();
        let choice = ProfileChoice::Existing("nobody".into());
        assert!(run_headless(&config, &store, &choice, None).await.is_err());
    }
}
