//! `themeswitch-cli`: query or flip the light/dark appearance from a terminal,
//! or stream changes to stdout.

use std::sync::atomic::AtomicBool;
#[cfg(windows)]
use std::sync::atomic::Ordering;

use clap::Parser;

#[cfg_attr(not(windows), allow(dead_code))]
mod cli;
#[cfg_attr(not(windows), allow(dead_code))]
mod startup;

/// Cleared by the console control handler; `watch` polls it between waits.
pub static RUNNING: AtomicBool = AtomicBool::new(true);

#[derive(Parser)]
#[command(
    name = "themeswitch-cli",
    version,
    about = "Read, set, toggle and watch the Windows light/dark appearance"
)]
struct Args {
    /// Print machine-readable JSON instead of aligned text
    #[arg(long, global = true)]
    json: bool,

    /// Log at debug level to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: cli::Command,
}

fn init_cli_logger(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

#[cfg(windows)]
unsafe extern "system" fn on_console_ctrl(_event: u32) -> windows::core::BOOL {
    RUNNING.store(false, Ordering::SeqCst);
    windows::core::BOOL(1)
}

/// Route Ctrl+C and Ctrl+Break to `RUNNING` so `watch` can stop its watcher.
fn install_ctrl_handler() {
    #[cfg(windows)]
    unsafe {
        if windows::Win32::System::Console::SetConsoleCtrlHandler(Some(on_console_ctrl), true)
            .is_err()
        {
            log::debug!("[cli] console control handler not installed");
        }
    }
}

fn main() {
    let args = Args::parse();
    init_cli_logger(args.verbose);
    install_ctrl_handler();

    if let Err(e) = cli::run(args.command, args.json) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
