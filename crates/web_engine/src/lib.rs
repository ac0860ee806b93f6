//! Embedded browser engine seam.
//!
//! The shell never renders, fetches or executes anything itself. Every page
//! lives inside an engine view reached through [`WebEngine`]:
//! - loading and history navigation
//! - navigation state for the toolbar buttons
//! - load / URL / title notifications
//! - per-profile storage location
//!
//! [`HeadlessEngine`] is an in-process engine used for headless runs and
//! tests; windowed backends live in the application crate.

pub mod engine;
pub mod headless;

pub use engine::{EngineEvent, EngineFactory, NavigationState, StorageConfig, WebEngine};
pub use headless::{HeadlessEngine, HeadlessEngineFactory, NavigationHistory};
