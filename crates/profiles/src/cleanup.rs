//! Best-effort removal of guest storage.
//!
//! The engine can keep files open for a moment after its last view is gone,
//! so removal is retried a bounded number of times before giving up.

use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tracing::{debug, info, warn};

use crate::guest::{self, Owner, GUEST_PREFIX};

/// Age after which a guest directory with no lock file counts as abandoned.
pub const UNMARKED_GRACE: Duration = Duration::from_secs(60);

/// Retry policy for guest cleanup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CleanupPolicy {
    /// Total removal attempts, including the first one.
    pub max_attempts: u32,
    /// Wait between attempts.
    pub retry_delay: Duration,
}

impl CleanupPolicy {
    pub fn new(max_attempts: u32, retry_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            retry_delay,
        }
    }
}

impl Default for CleanupPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            retry_delay: Duration::from_millis(500),
        }
    }
}

/// How a cleanup ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CleanupOutcome {
    /// The directory was removed.
    Removed,
    /// The directory did not exist.
    AlreadyGone,
    /// Every attempt failed; holds the last error.
    GaveUp(String),
}

/// Result of a cleanup run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CleanupReport {
    /// Directory that was targeted.
    pub path: PathBuf,
    /// Attempts made.
    pub attempts: u32,
    /// Final outcome.
    pub outcome: CleanupOutcome,
}

impl CleanupReport {
    /// Whether the directory no longer exists.
    pub fn is_clean(&self) -> bool {
        !matches!(self.outcome, CleanupOutcome::GaveUp(_))
    }
}

/// Remove `path` recursively, retrying per `policy`.
pub async fn remove_with_retries(path: PathBuf, policy: CleanupPolicy) -> CleanupReport {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempts = 0;
    let mut last_error = String::new();

    while attempts < max_attempts {
        attempts += 1;

        match tokio::fs::remove_dir_all(&path).await {
            Ok(()) => {
                info!(dir = %path.display(), attempts, "guest storage removed");
                return CleanupReport {
                    path,
                    attempts,
                    outcome: CleanupOutcome::Removed,
                };
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(dir = %path.display(), "guest storage already gone");
                return CleanupReport {
                    path,
                    attempts,
                    outcome: CleanupOutcome::AlreadyGone,
                };
            }
            Err(e) => {
                debug!(dir = %path.display(), attempt = attempts, error = %e, "guest cleanup attempt failed");
                last_error = e.to_string();
            }
        }

        if attempts < max_attempts {
            tokio::time::sleep(policy.retry_delay).await;
        }
    }

    warn!(
        dir = %path.display(),
        attempts,
        error = %last_error,
        "giving up on guest storage cleanup"
    );
    CleanupReport {
        path,
        attempts,
        outcome: CleanupOutcome::GaveUp(last_error),
    }
}

/// Remove guest directories left behind by earlier sessions.
///
/// A directory whose lock file names a running process belongs to a live
/// session and is kept. Directories without a lock file are kept until they
/// are older than [`UNMARKED_GRACE`], since a session writes its lock just
/// after creating the directory.
pub async fn sweep_stale_guests(parent: &Path, policy: CleanupPolicy) -> Vec<CleanupReport> {
    sweep(parent, policy, UNMARKED_GRACE).await
}

async fn sweep(parent: &Path, policy: CleanupPolicy, grace: Duration) -> Vec<CleanupReport> {
    let mut stale = Vec::new();

    let mut entries = match tokio::fs::read_dir(parent).await {
        Ok(entries) => entries,
        Err(e) => {
            debug!(dir = %parent.display(), error = %e, "cannot scan for stale guest storage");
            return Vec::new();
        }
    };

    loop {
        match entries.next_entry().await {
            Ok(Some(entry)) => {
                let is_guest = entry
                    .file_name()
                    .to_str()
                    .map_or(false, |name| name.starts_with(GUEST_PREFIX));
                let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
                if is_guest && is_dir && is_abandoned(&entry.path(), grace).await {
                    stale.push(entry.path());
                }
            }
            Ok(None) => break,
            Err(e) => {
                debug!(dir = %parent.display(), error = %e, "stale guest scan interrupted");
                break;
            }
        }
    }

    let mut reports = Vec::with_capacity(stale.len());
    for path in stale {
        info!(dir = %path.display(), "removing stale guest storage");
        reports.push(remove_with_retries(path, policy).await);
    }
    reports
}

async fn is_abandoned(dir: &Path, grace: Duration) -> bool {
    match guest::owner(dir) {
        Owner::Alive => {
            debug!(dir = %dir.display(), "guest storage in use");
            false
        }
        Owner::Dead => true,
        Owner::Unknown => {
            let age = tokio::fs::metadata(dir)
                .await
                .and_then(|m| m.modified())
                .ok()
                .and_then(|t| SystemTime::now().duration_since(t).ok());
            matches!(age, Some(age) if age >= grace)
        }
    }
}

/// Single blocking removal attempt, used when no runtime is available.
pub(crate) fn remove_once(path: &Path) -> io::Result<()> {
    match std::fs::remove_dir_all(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn quick() -> CleanupPolicy {
        CleanupPolicy::new(3, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_removes_directory() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("wayfarer-guest-x");
        std::fs::create_dir_all(target.join("storage/Cache")).unwrap();
        std::fs::write(target.join("storage/Cookies"), b"c").unwrap();

        let report = remove_with_retries(target.clone(), quick()).await;

        assert_eq!(report.outcome, CleanupOutcome::Removed);
        assert_eq!(report.attempts, 1);
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn test_missing_directory_is_clean() {
        let temp_dir = TempDir::new().unwrap();
        let report = remove_with_retries(temp_dir.path().join("nope"), quick()).await;

        assert_eq!(report.outcome, CleanupOutcome::AlreadyGone);
        assert!(report.is_clean());
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let temp_dir = TempDir::new().unwrap();
        // A regular file makes remove_dir_all fail on every attempt.
        let target = temp_dir.path().join("not-a-dir");
        std::fs::write(&target, b"x").unwrap();

        let report = remove_with_retries(target.clone(), quick()).await;

        assert_eq!(report.attempts, 3);
        assert!(matches!(report.outcome, CleanupOutcome::GaveUp(_)));
        assert!(!report.is_clean());
        assert!(target.exists());
    }

    #[tokio::test]
    async fn test_recovers_when_removal_starts_working() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("wayfarer-guest-busy");
        // Fails while the path is a regular file, succeeds once it is a dir.
        std::fs::write(&target, b"x").unwrap();

        let swap = target.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            std::fs::remove_file(&swap).unwrap();
            std::fs::create_dir(&swap).unwrap();
        });

        let policy = CleanupPolicy::new(50, Duration::from_millis(20));
        let report = remove_with_retries(target.clone(), policy).await;

        assert_eq!(report.outcome, CleanupOutcome::Removed);
        assert!(report.attempts > 1);
        assert!(report.attempts < 50);
        assert!(!target.exists());
    }

    fn abandoned(parent: &Path, name: &str) -> PathBuf {
        let dir = parent.join(format!("{}{}", GUEST_PREFIX, name));
        std::fs::create_dir(&dir).unwrap();
        std::fs::write(dir.join(crate::guest::LOCK_FILE), "4000000000").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_sweep_only_touches_guest_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let stale = abandoned(temp_dir.path(), "old");
        let other = temp_dir.path().join("keep-me");
        std::fs::create_dir(&other).unwrap();

        let reports = sweep_stale_guests(temp_dir.path(), quick()).await;

        assert_eq!(reports.len(), 1);
        assert!(!stale.exists());
        assert!(other.exists());
    }

    #[tokio::test]
    async fn test_sweep_keeps_live_session() {
        let temp_dir = TempDir::new().unwrap();
        let live = crate::GuestSession::start(temp_dir.path()).unwrap();
        let stale = abandoned(temp_dir.path(), "old");

        let reports = sweep_stale_guests(temp_dir.path(), quick()).await;

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].path, stale);
        assert!(live.root().exists());
        assert!(live.profile().storage_dir().is_dir());
    }

    #[tokio::test]
    async fn test_sweep_waits_out_unmarked_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let fresh = temp_dir.path().join(format!("{}fresh", GUEST_PREFIX));
        std::fs::create_dir(&fresh).unwrap();

        assert!(sweep_stale_guests(temp_dir.path(), quick()).await.is_empty());
        assert!(fresh.exists());

        let reports = sweep(temp_dir.path(), quick(), Duration::ZERO).await;
        assert_eq!(reports.len(), 1);
        assert!(!fresh.exists());
    }

    #[test]
    fn test_policy_needs_one_attempt() {
        let policy = CleanupPolicy::new(0, Duration::ZERO);
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(CleanupPolicy::default().max_attempts, 5);
    }
}
