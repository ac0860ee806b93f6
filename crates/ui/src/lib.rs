//! Browser UI shell.
//!
//! This crate models the shell around the engine views:
//! - Window and tab strip
//! - Address bar and input classification
//! - Navigation buttons
//! - Profile dialog
//! - Session lifecycle

pub mod address_bar;
pub mod browser;
pub mod navigation;
pub mod profile_dialog;
pub mod settings;
pub mod tab;
pub mod tab_bar;
pub mod window;

pub use address_bar::{classify_input, Destination};
pub use browser::Browser;
pub use navigation::NavigationAction;
pub use profile_dialog::{DialogCommand, ProfileChoice, ProfileDialog};
pub use settings::{SearchEngine, ShellSettings};
pub use tab::{Tab, TabId};
pub use window::BrowserWindow;
