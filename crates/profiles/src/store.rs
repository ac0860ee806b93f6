//! Named profile directories.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use common::{ShellError, ShellResult};
use tracing::{debug, info, warn};

use crate::profile::{Profile, ProfileInfo, ProfileMetadata, METADATA_FILE, STORAGE_DIR};
use crate::APP_DIR_NAME;

/// Name of the profile used when none is chosen.
pub const DEFAULT_PROFILE: &str = "default";

/// Name reserved for the guest session.
const RESERVED_GUEST: &str = "guest";

/// Longest accepted profile name, in characters.
const MAX_NAME_LEN: usize = 64;

/// Per-user application data directory.
pub fn default_root() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join(APP_DIR_NAME))
}

/// Store of named profiles under `<root>/profiles`.
pub struct ProfileStore {
    directory: PathBuf,
}

impl ProfileStore {
    /// Open the store, creating its directory if needed.
    pub fn open(root: impl AsRef<Path>) -> ShellResult<Self> {
        let directory = root.as_ref().join("profiles");
        fs::create_dir_all(&directory)?;
        debug!(dir = %directory.display(), "profile store opened");
        Ok(Self { directory })
    }

    /// Directory holding the profiles.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// List stored profiles, sorted by name ignoring case.
    pub fn list(&self) -> ShellResult<Vec<ProfileInfo>> {
        let mut profiles = Vec::new();

        for entry in fs::read_dir(&self.directory)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }

            let root = entry.path();
            let dir_name = entry.file_name().to_string_lossy().into_owned();
            let created = match read_metadata(&root) {
                Ok(metadata) => Some(metadata.created),
                Err(e) => {
                    debug!(profile = %dir_name, error = %e, "unreadable profile metadata");
                    None
                }
            };

            profiles.push(ProfileInfo {
                name: dir_name,
                root,
                created,
            });
        }

        profiles.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(profiles)
    }

    /// Check whether a profile exists (ignoring case).
    pub fn exists(&self, name: &str) -> ShellResult<bool> {
        Ok(self.find(name)?.is_some())
    }

    /// Create a new profile.
    pub fn create(&self, name: &str) -> ShellResult<Profile> {
        let name = validate_name(name)?;

        if let Some(existing) = self.find(name)? {
            return Err(ShellError::already_exists(format!(
                "profile '{}' already exists",
                existing.name
            )));
        }

        let root = self.directory.join(name);
        fs::create_dir_all(root.join(STORAGE_DIR))?;
        write_metadata(
            &root,
            &ProfileMetadata {
                name: name.to_string(),
                created: SystemTime::now(),
            },
        )?;

        info!(profile = %name, "created profile");
        Ok(Profile::named(name, root))
    }

    /// Open an existing profile.
    pub fn open_profile(&self, name: &str) -> ShellResult<Profile> {
        let info = self
            .find(name)?
            .ok_or_else(|| ShellError::not_found(format!("profile '{}'", name)))?;

        // Older profiles may predate the storage directory.
        let profile = Profile::named(info.name, info.root);
        fs::create_dir_all(profile.storage_dir())?;
        Ok(profile)
    }

    /// Open a profile, creating it if it does not exist.
    pub fn open_or_create(&self, name: &str) -> ShellResult<Profile> {
        if self.exists(name)? {
            self.open_profile(name)
        } else {
            self.create(name)
        }
    }

    /// Make sure the default profile exists.
    pub fn ensure_default(&self) -> ShellResult<Profile> {
        self.open_or_create(DEFAULT_PROFILE)
    }

    /// Delete a profile and all of its data.
    pub fn delete(&self, name: &str) -> ShellResult<()> {
        if name.trim().eq_ignore_ascii_case(DEFAULT_PROFILE) {
            return Err(ShellError::invalid("the default profile cannot be deleted"));
        }

        let info = self
            .find(name)?
            .ok_or_else(|| ShellError::not_found(format!("profile '{}'", name)))?;

        fs::remove_dir_all(&info.root)?;
        info!(profile = %info.name, "deleted profile");
        Ok(())
    }

    fn find(&self, name: &str) -> ShellResult<Option<ProfileInfo>> {
        let wanted = name.trim().to_lowercase();
        Ok(self
            .list()?
            .into_iter()
            .find(|p| p.name.to_lowercase() == wanted))
    }
}

/// Validate a profile name, returning it trimmed.
pub fn validate_name(name: &str) -> ShellResult<&str> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ShellError::invalid_name("name is empty"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ShellError::invalid_name(format!(
            "name is longer than {} characters",
            MAX_NAME_LEN
        )));
    }
    if name == "." || name == ".." {
        return Err(ShellError::invalid_name(format!("'{}' is not allowed", name)));
    }
    if name.chars().any(|c| matches!(c, '/' | '\\' | '\0')) {
        return Err(ShellError::invalid_name(format!(
            "'{}' contains a path separator",
            name
        )));
    }
    if name.eq_ignore_ascii_case(RESERVED_GUEST) {
        return Err(ShellError::invalid_name("'guest' is reserved"));
    }

    Ok(name)
}

fn read_metadata(root: &Path) -> ShellResult<ProfileMetadata> {
    let data = fs::read_to_string(root.join(METADATA_FILE))?;
    Ok(serde_json::from_str(&data)?)
}

fn write_metadata(root: &Path, metadata: &ProfileMetadata) -> ShellResult<()> {
    let data = serde_json::to_string_pretty(metadata)?;
    if let Err(e) = fs::write(root.join(METADATA_FILE), data) {
        warn!(dir = %root.display(), error = %e, "failed to write profile metadata");
        return Err(e.into());
    }
    Ok(())
}
