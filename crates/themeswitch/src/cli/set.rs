//! `dark` / `light` / `toggle` subcommands — write the appearance setting.

use super::{ModeOutput, Result, SettingsBackend, ThemeMode, ThemeStore, print_json};

fn print_mode(mode: ThemeMode, json: bool) -> Result<()> {
    if json {
        return print_json(&ModeOutput::from(mode));
    }
    println!("Theme: {mode}");
    Ok(())
}

/// Write `mode` and broadcast, even if the system is already in that mode.
pub(super) fn cmd_set<B: SettingsBackend>(
    store: &ThemeStore<B>,
    mode: ThemeMode,
    json: bool,
) -> Result<()> {
    store.write(mode)?;
    print_mode(mode, json)
}

pub(super) fn cmd_toggle<B: SettingsBackend>(store: &ThemeStore<B>, json: bool) -> Result<()> {
    let mode = store.toggle()?;
    print_mode(mode, json)
}
