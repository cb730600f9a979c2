//! CLI subcommands — read, set, toggle and watch the appearance setting.

mod autostart;
mod set;
mod status;
mod watch;

use std::sync::Arc;

use clap::Subcommand;
use serde::Serialize;

pub(super) use themeswitch_lib::ThemeMode;
pub(super) use themeswitch_lib::config::WatchConfig;
pub(super) use themeswitch_lib::error::Result;
pub(super) use themeswitch_lib::store::{SettingsBackend, ThemeStore};
pub(super) use themeswitch_lib::watcher::ChangeSource;

const PADDING: usize = 2;

/// Compute alignment width for a command's key-value output: the longest key
/// plus PADDING spaces.
pub(super) fn kv_width(keys: &[&str]) -> usize {
    keys.iter()
        .map(|k| k.len() + PADDING)
        .max()
        .unwrap_or(0)
}

pub(super) fn format_kv(key: &str, value: impl std::fmt::Display, w: usize) -> String {
    format!("{key:<width$}{value}", width = w)
}

pub(super) fn kv(key: &str, value: impl std::fmt::Display, w: usize) {
    println!("{}", format_kv(key, value, w));
}

/// Pretty-print a JSON value to stdout.
pub(super) fn print_json(value: &impl Serialize) -> Result<()> {
    let json_str = serde_json::to_string_pretty(value).map_err(std::io::Error::from)?;
    println!("{json_str}");
    Ok(())
}

// ── JSON output structs ──

#[derive(Serialize)]
pub(super) struct StatusOutput {
    pub version: String,
    pub mode: String,
    pub is_dark: bool,
    pub autostart: Option<bool>,
}

#[derive(Serialize)]
pub(super) struct ModeOutput {
    pub mode: String,
    pub is_dark: bool,
}

impl From<ThemeMode> for ModeOutput {
    fn from(mode: ThemeMode) -> Self {
        Self {
            mode: mode.to_string(),
            is_dark: mode.is_dark(),
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the current appearance and autostart registration
    Status,

    /// Switch to dark mode
    Dark,

    /// Switch to light mode
    Light,

    /// Switch to the opposite mode
    Toggle,

    /// Print every appearance change until Ctrl+C
    Watch,

    /// Start the tray app at login
    Autostart {
        /// Remove the login entry instead
        #[arg(long)]
        disable: bool,
    },
}

/// Warn if `--json` was passed to a command that doesn't support it.
fn warn_json_unsupported(cmd_name: &str) {
    log::warn!("--json is not supported for `{cmd_name}` (ignored)");
}

pub fn run(cmd: Command, json: bool) -> Result<()> {
    #[cfg(windows)]
    {
        use themeswitch_lib::registry::{RegistryBackend, RegistryNotifier};

        let store = Arc::new(ThemeStore::new(RegistryBackend::new()));
        dispatch(cmd, store, RegistryNotifier::open, json)
    }

    #[cfg(not(windows))]
    {
        let _ = (cmd, json);
        Err(themeswitch_lib::error::ThemeswitchError::ConfigUnavailable(
            "the appearance setting requires Windows".into(),
        ))
    }
}

/// Run `cmd` against `store`. `open_source` is only called by `watch`.
fn dispatch<B, S>(
    cmd: Command,
    store: Arc<ThemeStore<B>>,
    open_source: impl FnOnce() -> Result<S>,
    json: bool,
) -> Result<()>
where
    B: SettingsBackend + Send + Sync + 'static,
    S: ChangeSource + Send + 'static,
{
    match cmd {
        Command::Status => status::cmd_status(&store, json),
        Command::Dark => set::cmd_set(&store, ThemeMode::Dark, json),
        Command::Light => set::cmd_set(&store, ThemeMode::Light, json),
        Command::Toggle => set::cmd_toggle(&store, json),
        Command::Watch => watch::cmd_watch(
            store,
            open_source()?,
            WatchConfig::default(),
            &crate::RUNNING,
            json,
        ),
        Command::Autostart { disable } => {
            if json {
                warn_json_unsupported("autostart");
            }
            autostart::cmd_autostart(!disable)
        }
    }
}


#[cfg(test)]
mod json_struct_tests {
    use super::*;

    #[test]
    fn status_output_has_expected_fields() {
        let output = StatusOutput {
            version: "0.1.0".into(),
            mode: "dark".into(),
            is_dark: true,
            autostart: None,
        };
        let json = serde_json::to_value(&output).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 4, "StatusOutput should have 4 fields");
        assert!(obj["autostart"].is_null());
    }

    #[test]
    fn mode_output_from_mode() {
        let json = serde_json::to_value(ModeOutput::from(ThemeMode::Light)).unwrap();
        assert_eq!(json["mode"], "light");
        assert_eq!(json["is_dark"], false);
    }
}
