//! Theme Switcher — toggle and watch the Windows light/dark appearance setting.

pub mod appearance;
pub mod config;
pub mod error;
#[cfg(windows)]
pub mod registry;
pub mod store;
pub mod stub;
pub mod ui;
pub mod watcher;

pub use appearance::ThemeMode;
pub use error::ThemeswitchError;
