//! `status` subcommand — show the current appearance and autostart entry.

use super::{ModeOutput, Result, SettingsBackend, StatusOutput, ThemeStore, kv, kv_width, print_json};
use crate::startup;

/// Gather status. `autostart` is `None` when the entry could not be queried.
fn collect_status<B: SettingsBackend>(
    store: &ThemeStore<B>,
    autostart: Option<bool>,
) -> Result<StatusOutput> {
    let ModeOutput { mode, is_dark } = store.mode()?.into();
    Ok(StatusOutput {
        version: env!("CARGO_PKG_VERSION").to_string(),
        mode,
        is_dark,
        autostart,
    })
}

fn print_status(status: &StatusOutput, json: bool) -> Result<()> {
    if json {
        return print_json(status);
    }

    let autostart = match status.autostart {
        Some(true) => "enabled",
        Some(false) => "disabled",
        None => "unknown",
    };
    let w = kv_width(&["Version:", "Mode:", "Autostart:"]);
    kv("Version:", &status.version, w);
    kv("Mode:", &status.mode, w);
    kv("Autostart:", autostart, w);
    Ok(())
}

pub(super) fn cmd_status<B: SettingsBackend>(store: &ThemeStore<B>, json: bool) -> Result<()> {
    let autostart = match startup::is_registered() {
        Ok(registered) => Some(registered),
        Err(e) => {
            log::warn!("[autostart] {e}");
            None
        }
    };
    let status = collect_status(store, autostart)?;
    print_status(&status, json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use themeswitch_lib::ThemeMode;
    use themeswitch_lib::error::ThemeswitchError;
    use themeswitch_lib::stub::MemorySettings;

    #[test]
    fn collect_reports_dark() {
        let store = ThemeStore::new(MemorySettings::new(ThemeMode::Dark));
        let status = collect_status(&store, Some(true)).unwrap();
        assert_eq!(status.mode, "dark");
        assert!(status.is_dark);
        assert_eq!(status.autostart, Some(true));
        assert_eq!(status.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn collect_uses_system_flag() {
        let settings = MemorySettings::new(ThemeMode::Dark);
        settings.set_flags(1, 0);
        let store = ThemeStore::new(settings);
        let status = collect_status(&store, None).unwrap();
        assert_eq!(status.mode, "light");
    }

    #[test]
    fn collect_fails_on_missing_key() {
        let store = ThemeStore::new(MemorySettings::missing());
        assert!(matches!(
            collect_status(&store, None),
            Err(ThemeswitchError::ConfigUnavailable(_))
        ));
    }

    #[test]
    fn print_status_both_formats() {
        let store = ThemeStore::new(MemorySettings::new(ThemeMode::Light));
        let status = collect_status(&store, None).unwrap();
        print_status(&status, false).unwrap();
        print_status(&status, true).unwrap();
    }
}
