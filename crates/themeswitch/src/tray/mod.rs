//! System tray — single-instance guard, menu, and the Win32 event loop.

mod menu;
mod windows;

use themeswitch_lib::error::{Result, ThemeswitchError};

const INSTANCE_NAME: &str = "themeswitch";

pub fn run() -> Result<()> {
    let instance = single_instance::SingleInstance::new(INSTANCE_NAME).map_err(|e| {
        ThemeswitchError::Io(std::io::Error::other(format!(
            "Failed to create instance lock: {e}"
        )))
    })?;

    if !instance.is_single() {
        log::warn!("Another instance of Theme Switcher is already running.");
        let mut n = notify_rust::Notification::new();
        n.summary("Theme Switcher");
        n.body("Another instance is already running.");
        let _ = n.show();
        return Ok(());
    }

    // `instance` stays alive for the duration of run(), holding the lock.
    windows::run()
}
