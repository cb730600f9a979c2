//! Appearance state and the registry location that persists it.

use std::fmt;

/// Per-user key holding both appearance flags (under `HKEY_CURRENT_USER`).
pub const PERSONALIZE_KEY: &str = r"Software\Microsoft\Windows\CurrentVersion\Themes\Personalize";

/// Flag for the taskbar and other system surfaces. This is the one `read` consults.
pub const SYSTEM_LIGHT_THEME: &str = "SystemUsesLightTheme";

/// Flag for application windows.
pub const APPS_LIGHT_THEME: &str = "AppsUseLightTheme";

/// `WM_SETTINGCHANGE` parameter announcing a color-scheme change.
pub const BROADCAST_PARAM: &str = "ImmersiveColorSet";

/// Light or dark appearance, with the flag value the registry stores for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ThemeMode {
    Dark = 0,
    Light = 1,
}

impl ThemeMode {
    /// Interpret a stored flag. Only `0` is dark.
    pub fn from_flag(flag: u32) -> Self {
        if flag == 0 {
            ThemeMode::Dark
        } else {
            ThemeMode::Light
        }
    }

    pub fn from_is_dark(is_dark: bool) -> Self {
        if is_dark {
            ThemeMode::Dark
        } else {
            ThemeMode::Light
        }
    }

    /// Value written to both flags.
    pub fn flag(self) -> u32 {
        self as u32
    }

    pub fn is_dark(self) -> bool {
        self == ThemeMode::Dark
    }

    pub fn opposite(self) -> Self {
        match self {
            ThemeMode::Dark => ThemeMode::Light,
            ThemeMode::Light => ThemeMode::Dark,
        }
    }

    /// Capitalized name for user-facing text.
    pub fn label(self) -> &'static str {
        match self {
            ThemeMode::Dark => "Dark",
            ThemeMode::Light => "Light",
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThemeMode::Dark => write!(f, "dark"),
            ThemeMode::Light => write!(f, "light"),
        }
    }
}
