//! Profile handles and on-disk metadata.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use web_engine::StorageConfig;

/// Metadata file name inside a profile directory.
pub const METADATA_FILE: &str = "profile.json";

/// Engine data directory inside a profile directory.
pub const STORAGE_DIR: &str = "storage";

/// Kind of profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProfileKind {
    /// A named profile that persists between runs.
    Named,
    /// The ephemeral guest profile.
    Guest,
}

/// An opened profile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Profile {
    /// Profile name.
    name: String,
    /// Profile kind.
    kind: ProfileKind,
    /// Profile directory.
    root: PathBuf,
}

impl Profile {
    pub(crate) fn named(name: impl Into<String>, root: PathBuf) -> Self {
        Self {
            name: name.into(),
            kind: ProfileKind::Named,
            root,
        }
    }

    pub(crate) fn guest(root: PathBuf) -> Self {
        Self {
            name: "Guest".to_string(),
            kind: ProfileKind::Guest,
            root,
        }
    }

    /// Get the profile name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the profile kind.
    pub fn kind(&self) -> ProfileKind {
        self.kind
    }

    /// Check if this is the guest profile.
    pub fn is_guest(&self) -> bool {
        self.kind == ProfileKind::Guest
    }

    /// Get the profile directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory the engine stores data in.
    pub fn storage_dir(&self) -> PathBuf {
        self.root.join(STORAGE_DIR)
    }

    /// Storage configuration for engine views of this profile.
    pub fn storage_config(&self) -> StorageConfig {
        match self.kind {
            ProfileKind::Named => StorageConfig::persistent(self.storage_dir()),
            ProfileKind::Guest => StorageConfig::ephemeral(self.storage_dir()),
        }
    }
}

/// Listing entry for a stored profile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProfileInfo {
    /// Profile name.
    pub name: String,
    /// Profile directory.
    pub root: PathBuf,
    /// Creation time, if the metadata is readable.
    pub created: Option<SystemTime>,
}

/// Contents of `profile.json`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub(crate) struct ProfileMetadata {
    pub name: String,
    #[serde(with = "system_time_serde")]
    pub created: SystemTime,
}

mod system_time_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    pub fn serialize<S>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let duration = time.duration_since(UNIX_EPOCH).unwrap_or(Duration::ZERO);
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<SystemTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(UNIX_EPOCH + Duration::from_secs(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    #[test]
    fn test_named_storage_is_persistent() {
        let profile = Profile::named("work", PathBuf::from("/data/profiles/work"));
        let storage = profile.storage_config();

        assert!(!profile.is_guest());
        assert!(!storage.off_the_record);
        assert_eq!(storage.data_dir, PathBuf::from("/data/profiles/work/storage"));
    }

    #[test]
    fn test_guest_storage_is_ephemeral() {
        let profile = Profile::guest(PathBuf::from("/tmp/wayfarer-guest-abc"));
        assert!(profile.is_guest());
        assert_eq!(profile.name(), "Guest");
        assert!(profile.storage_config().off_the_record);
    }

    #[test]
    fn test_metadata_format() {
        let metadata = ProfileMetadata {
            name: "work".to_string(),
            created: UNIX_EPOCH + Duration::from_secs(1_700_000_000),
        };
        let json = serde_json::to_string(&metadata).unwrap();
        assert_eq!(json, r#"{"name":"work","created":1700000000}"#);
    }
}
