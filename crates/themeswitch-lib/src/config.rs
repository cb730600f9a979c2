//! Compiled-in tunables and platform paths. There is no configuration file.

use std::path::PathBuf;
use std::time::Duration;

/// Watcher loop settings.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Longest single wait on the notification source. A stop request is
    /// observed within one interval.
    pub poll_interval: Duration,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(250),
        }
    }
}

/// Per-user application data directory.
pub fn app_dir() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        dirs::data_local_dir().map(|p| p.join("ThemeSwitcher"))
    }
    #[cfg(not(windows))]
    {
        dirs::data_local_dir().map(|p| p.join("themeswitch"))
    }
}

/// Full path to the log file (tray app).
pub fn log_path() -> Option<PathBuf> {
    app_dir().map(|d| d.join("themeswitch.log"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_poll_interval() {
        let config = WatchConfig::default();
        assert_eq!(config.poll_interval, Duration::from_millis(250));
    }

    #[test]
    fn log_path_is_inside_app_dir() {
        if let (Some(dir), Some(log)) = (app_dir(), log_path()) {
            assert_eq!(log.parent(), Some(dir.as_path()));
            assert_eq!(log.file_name().unwrap(), "themeswitch.log");
        }
    }
}
