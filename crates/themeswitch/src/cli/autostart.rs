//! `autostart` subcommand — add or remove the login entry for the tray app.

use super::Result;
use crate::startup;

pub(super) fn cmd_autostart(enable: bool) -> Result<()> {
    startup::set_registered(enable)?;
    println!(
        "Autostart: {} (\"{}\")",
        if enable { "enabled" } else { "disabled" },
        startup::APP_NAME
    );
    Ok(())
}
