//! `watch` subcommand — print appearance changes until interrupted.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use themeswitch_lib::watcher::{ChangeFilter, ChangeWatcher};

use super::{
    ChangeSource, ModeOutput, Result, SettingsBackend, ThemeMode, ThemeStore, WatchConfig,
};

/// How often the loop checks `running` while no change arrives.
const STOP_CHECK: Duration = Duration::from_millis(250);

fn print_change(mode: ThemeMode, json: bool) -> Result<()> {
    if json {
        let line = serde_json::to_string(&ModeOutput::from(mode)).map_err(std::io::Error::from)?;
        println!("{line}");
    } else {
        println!("  {mode}");
    }
    Ok(())
}

/// Watch until `running` clears or the watcher fails.
pub(super) fn cmd_watch<B, S>(
    store: Arc<ThemeStore<B>>,
    source: S,
    config: WatchConfig,
    running: &AtomicBool,
    json: bool,
) -> Result<()>
where
    B: SettingsBackend + Send + Sync + 'static,
    S: ChangeSource + Send + 'static,
{
    let initial = store.mode()?;
    if !json {
        println!("Watching for appearance changes (Ctrl+C to stop)");
    }
    print_change(initial, json)?;

    // The watcher reports its first reading regardless of the previous
    // value; seed a second filter so only real changes are printed.
    let mut shown = ChangeFilter::new();
    shown.observe(initial.is_dark());

    let (tx, rx) = mpsc::channel();
    let handle = ChangeWatcher::start(store, source, config, move |is_dark| {
        let _ = tx.send(is_dark);
    })?;

    while running.load(Ordering::SeqCst) {
        match rx.recv_timeout(STOP_CHECK) {
            Ok(is_dark) => {
                if let Some(is_dark) = shown.observe(is_dark) {
                    print_change(ThemeMode::from_is_dark(is_dark), json)?;
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            // The callback was dropped: the watcher thread has ended
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    handle.stop()
}
