//! Theme Switcher — one-click light/dark toggle in the Windows system tray.
//!
//! GUI subsystem: double-click from Explorer launches the system tray.
//! If run from a terminal with arguments, redirects the user to themeswitch-cli.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

#[cfg_attr(not(windows), allow(dead_code))]
mod icon;
#[cfg_attr(not(windows), allow(dead_code))]
mod startup;
#[cfg(windows)]
mod tray;

/// Check if we were launched from an interactive console (PowerShell, cmd, etc.).
#[cfg(windows)]
fn has_parent_console() -> bool {
    use windows::Win32::System::Console::{ATTACH_PARENT_PROCESS, AttachConsole, FreeConsole};

    unsafe {
        if AttachConsole(ATTACH_PARENT_PROCESS).is_ok() {
            // Detach immediately, this is the tray binary
            let _ = FreeConsole();
            true
        } else {
            false
        }
    }
}

/// Initialize the tray app logger, directing output to a log file.
///
/// Falls back to stderr if the log file can't be opened.
fn init_tray_logger() {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    builder.format_target(false);

    if let Some(log_path) = themeswitch_lib::config::log_path() {
        if let Some(dir) = log_path.parent() {
            let _ = std::fs::create_dir_all(dir);
        }
        if let Ok(file) = std::fs::File::create(&log_path) {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
    }

    builder.init();
}

fn main() {
    init_tray_logger();

    #[cfg(not(windows))]
    {
        eprintln!("The tray app is only available on Windows.");
        eprintln!("Use themeswitch-cli for command-line usage.");
        std::process::exit(1);
    }

    #[cfg(windows)]
    {
        let args: Vec<String> = std::env::args().collect();

        // If launched with CLI arguments from a terminal, redirect to themeswitch-cli
        if args.len() > 1 && has_parent_console() {
            eprintln!("Hint: Use themeswitch-cli.exe for command-line usage.");
            eprintln!("  Example: themeswitch-cli.exe {}", args[1..].join(" "));
            return;
        }

        if let Err(e) = tray::run() {
            let msg = format!("Error: {e}");
            log::error!("{msg}");
            eprintln!("{msg}");
            show_fatal_error(&msg);
            std::process::exit(1);
        }
    }
}

/// Show a fatal error in a MessageBox, since the tray binary has no console.
#[cfg(windows)]
fn show_fatal_error(msg: &str) {
    use windows::Win32::UI::WindowsAndMessaging::{MB_ICONERROR, MB_OK, MessageBoxW};
    use windows::core::PCWSTR;

    let wide_msg: Vec<u16> = msg.encode_utf16().chain(std::iter::once(0)).collect();
    let title: Vec<u16> = "Theme Switcher"
        .encode_utf16()
        .chain(std::iter::once(0))
        .collect();
    unsafe {
        let _ = MessageBoxW(
            None,
            PCWSTR(wide_msg.as_ptr()),
            PCWSTR(title.as_ptr()),
            MB_ICONERROR | MB_OK,
        );
    }
}
