//! Profile storage for the browser shell.
//!
//! A profile is a directory the engine keeps its cookies, cache and site data
//! in. Named profiles live under the per-user data directory; a guest session
//! gets a throwaway directory in the temp dir that is removed, with retries,
//! once the window is gone.

pub mod cleanup;
pub mod guest;
pub mod profile;
pub mod store;

pub use cleanup::{CleanupOutcome, CleanupPolicy, CleanupReport};
pub use guest::{GuestSession, Owner};
pub use profile::{Profile, ProfileInfo, ProfileKind};
pub use store::{default_root, ProfileStore, DEFAULT_PROFILE};

/// Application directory name under the platform data directory.
pub const APP_DIR_NAME: &str = "wayfarer";
