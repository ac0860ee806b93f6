//! Ephemeral guest sessions.

use std::fs;
use std::path::{Path, PathBuf};

use common::{ShellError, ShellResult};
use sysinfo::{Pid, ProcessesToUpdate, System};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cleanup::{self, CleanupPolicy, CleanupReport};
use crate::profile::Profile;

/// Name prefix of guest directories.
pub const GUEST_PREFIX: &str = "wayfarer-guest-";

/// File in a guest directory holding the owning process id.
pub const LOCK_FILE: &str = "session.lock";

/// Who holds a guest directory, according to its lock file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Owner {
    /// The recorded process is running.
    Alive,
    /// The recorded process has exited.
    Dead,
    /// No readable lock file.
    Unknown,
}

/// Look up the process that owns the guest directory at `root`.
pub fn owner(root: &Path) -> Owner {
    let pid = match fs::read_to_string(root.join(LOCK_FILE)) {
        Ok(text) => match text.trim().parse::<u32>() {
            Ok(pid) => pid,
            Err(_) => return Owner::Unknown,
        },
        Err(_) => return Owner::Unknown,
    };

    if pid == std::process::id() {
        return Owner::Alive;
    }

    let pid = Pid::from_u32(pid);
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
    if system.process(pid).is_some() {
        Owner::Alive
    } else {
        debug!(dir = %root.display(), %pid, "guest owner has exited");
        Owner::Dead
    }
}

/// A guest profile backed by a temporary directory.
///
/// The directory is removed by [`GuestSession::finish`], or synchronously
/// on drop if the session was never finished.
pub struct GuestSession {
    profile: Profile,
    root: Option<PathBuf>,
}

impl GuestSession {
    /// Start a guest session in the system temp directory.
    pub fn start_in_temp() -> ShellResult<Self> {
        Self::start(&std::env::temp_dir())
    }

    /// Start a guest session with its storage under `parent`.
    pub fn start(parent: &Path) -> ShellResult<Self> {
        fs::create_dir_all(parent)?;
        let temp = tempfile::Builder::new()
            .prefix(GUEST_PREFIX)
            .tempdir_in(parent)?;
        // Removal is handled here, with retries, not by TempDir's drop.
        let root = temp.into_path();

        fs::write(root.join(LOCK_FILE), std::process::id().to_string())?;

        let profile = Profile::guest(root.clone());
        fs::create_dir_all(profile.storage_dir())?;

        info!(dir = %root.display(), "guest session started");
        Ok(Self {
            profile,
            root: Some(root),
        })
    }

    /// Get the guest profile.
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Get the session directory.
    pub fn root(&self) -> &Path {
        self.profile.root()
    }

    /// Schedule asynchronous removal of the session storage.
    ///
    /// Must be called from within a tokio runtime. Engine views using the
    /// storage should be dropped first.
    pub fn finish(mut self, policy: CleanupPolicy) -> ShellResult<JoinHandle<CleanupReport>> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|_| ShellError::invalid("guest cleanup needs a tokio runtime"))?;

        let root = self
            .root
            .take()
            .ok_or_else(|| ShellError::invalid("guest session already finished"))?;

        info!(dir = %root.display(), "scheduling guest storage cleanup");
        Ok(runtime.spawn(cleanup::remove_with_retries(root, policy)))
    }
}

impl Drop for GuestSession {
    fn drop(&mut self) {
        if let Some(root) = self.root.take() {
            if let Err(e) = cleanup::remove_once(&root) {
                warn!(dir = %root.display(), error = %e, "guest storage left behind");
            }
        }
    }
}
