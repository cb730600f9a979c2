//! Unified error type for the themeswitch-lib crate.
//!
//! [`ThemeswitchError`] covers the three failure kinds of the appearance
//! store and watcher plus the startup-registration and I/O errors raised by
//! the binaries. `From<std::io::Error>` lets `?` propagate path lookups.

use std::fmt;

/// Unified error type for themeswitch operations.
#[derive(Debug)]
pub enum ThemeswitchError {
    /// The appearance key cannot be opened or the flag is missing/unreadable.
    ConfigUnavailable(String),
    /// One of the paired flag writes failed. The flags may have diverged.
    ConfigWriteFailed(String),
    /// The registry change notification could not be acquired or re-armed.
    WatchUnavailable(String),
    /// Run-at-login registration failed.
    Autostart(String),
    /// Standard I/O error (executable path, log file).
    Io(std::io::Error),
}

impl fmt::Display for ThemeswitchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThemeswitchError::ConfigUnavailable(e) => {
                write!(f, "Appearance setting unavailable: {e}")
            }
            ThemeswitchError::ConfigWriteFailed(e) => {
                write!(f, "Could not write appearance setting: {e}")
            }
            ThemeswitchError::WatchUnavailable(e) => write!(f, "Change watch unavailable: {e}"),
            ThemeswitchError::Autostart(e) => write!(f, "Autostart error: {e}"),
            ThemeswitchError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for ThemeswitchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ThemeswitchError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ThemeswitchError {
    fn from(e: std::io::Error) -> Self {
        ThemeswitchError::Io(e)
    }
}

/// Crate-level Result alias using [`ThemeswitchError`].
pub type Result<T> = std::result::Result<T, ThemeswitchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let e: ThemeswitchError = io_err.into();
        assert!(matches!(e, ThemeswitchError::Io(_)));
    }

    #[test]
    fn display_config_unavailable() {
        let e = ThemeswitchError::ConfigUnavailable("key not found".into());
        assert_eq!(
            e.to_string(),
            "Appearance setting unavailable: key not found"
        );
    }

    #[test]
    fn display_config_write_failed() {
        let e = ThemeswitchError::ConfigWriteFailed("AppsUseLightTheme: denied".into());
        assert_eq!(
            e.to_string(),
            "Could not write appearance setting: AppsUseLightTheme: denied"
        );
    }

    #[test]
    fn display_watch_unavailable() {
        let e = ThemeswitchError::WatchUnavailable("no event".into());
        assert_eq!(e.to_string(), "Change watch unavailable: no event");
    }

    #[test]
    fn display_autostart_error() {
        let e = ThemeswitchError::Autostart("access denied".into());
        assert_eq!(e.to_string(), "Autostart error: access denied");
    }

    #[test]
    fn source_chains_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let e = ThemeswitchError::Io(io_err);
        let source = std::error::Error::source(&e).unwrap();
        assert!(source.to_string().contains("denied"));
    }

    #[test]
    fn source_none_for_string_variants() {
        let e = ThemeswitchError::WatchUnavailable("test".into());
        assert!(std::error::Error::source(&e).is_none());
    }

    #[test]
    fn question_mark_propagation_io() {
        fn inner() -> std::io::Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "nope"))
        }
        fn outer() -> Result<()> {
            inner()?;
            Ok(())
        }
        let err = outer().unwrap_err();
        assert!(matches!(err, ThemeswitchError::Io(_)));
    }
}
