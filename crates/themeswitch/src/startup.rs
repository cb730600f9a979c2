//! Run-at-login registration — a per-user autostart entry pointing at the
//! resolved executable.

use std::path::{Path, PathBuf};

use auto_launch::{AutoLaunch, AutoLaunchBuilder};
use themeswitch_lib::error::{Result, ThemeswitchError};

/// Name of the autostart entry.
pub const APP_NAME: &str = "Windows Theme Switcher";

/// File name of the tray executable the entry launches.
const TRAY_EXE: &str = if cfg!(windows) {
    "themeswitch.exe"
} else {
    "themeswitch"
};

/// Current executable with symlinks resolved.
pub fn resolve_exe_path() -> Result<PathBuf> {
    let exe = std::env::current_exe()?;
    let resolved = std::fs::canonicalize(&exe)?;
    Ok(strip_verbatim(&resolved))
}

/// Drop the `\\?\` prefix `canonicalize` adds on Windows so the entry holds a
/// plain drive path. `\\?\UNC\` paths have no plain equivalent and are kept.
fn strip_verbatim(path: &Path) -> PathBuf {
    match path.to_str().and_then(|s| s.strip_prefix(r"\\?\")) {
        Some(rest) if !rest.starts_with(r"UNC\") => PathBuf::from(rest),
        _ => path.to_path_buf(),
    }
}

/// The tray executable: this binary, or its sibling when run from the CLI.
pub fn tray_exe_path() -> Result<PathBuf> {
    let exe = resolve_exe_path()?;
    Ok(tray_sibling(&exe))
}

fn tray_sibling(exe: &Path) -> PathBuf {
    if exe.file_name().is_some_and(|n| n == TRAY_EXE) {
        exe.to_path_buf()
    } else {
        exe.with_file_name(TRAY_EXE)
    }
}

fn auto_launch() -> Result<AutoLaunch> {
    let exe = tray_exe_path()?;
    let path = exe.to_str().ok_or_else(|| {
        ThemeswitchError::Autostart(format!("executable path is not UTF-8: {}", exe.display()))
    })?;
    AutoLaunchBuilder::new()
        .set_app_name(APP_NAME)
        .set_app_path(path)
        .build()
        .map_err(|e| ThemeswitchError::Autostart(e.to_string()))
}

// themeswitch-cli only
#[allow(dead_code)]
pub fn is_registered() -> Result<bool> {
    auto_launch()?
        .is_enabled()
        .map_err(|e| ThemeswitchError::Autostart(e.to_string()))
}

/// Create the entry if it does not exist. Returns `true` if it was created.
// Tray only
#[allow(dead_code)]
pub fn ensure_registered() -> Result<bool> {
    let al = auto_launch()?;
    let enabled = al
        .is_enabled()
        .map_err(|e| ThemeswitchError::Autostart(e.to_string()))?;
    if enabled {
        return Ok(false);
    }
    al.enable()
        .map_err(|e| ThemeswitchError::Autostart(e.to_string()))?;
    log::info!("[autostart] registered \"{APP_NAME}\"");
    Ok(true)
}

/// Add or remove the entry.
// themeswitch-cli only
#[allow(dead_code)]
pub fn set_registered(enabled: bool) -> Result<()> {
    let al = auto_launch()?;
    let result = if enabled { al.enable() } else { al.disable() };
    result.map_err(|e| ThemeswitchError::Autostart(e.to_string()))?;
    log::info!(
        "[autostart] {} \"{APP_NAME}\"",
        if enabled { "registered" } else { "removed" }
    );
    Ok(())
}
