//! Windows system tray — Win32 message loop and registry change watching.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};

use muda::MenuEvent;
use tray_icon::{TrayIcon, TrayIconEvent};

use themeswitch_lib::ThemeMode;
use themeswitch_lib::config::WatchConfig;
use themeswitch_lib::error::{Result, ThemeswitchError};
use themeswitch_lib::registry::{RegistryBackend, RegistryNotifier};
use themeswitch_lib::store::ThemeStore;
use themeswitch_lib::ui::{self, Flow, UiEvent};
use themeswitch_lib::watcher::{ChangeWatcher, WatchHandle};

use windows::Win32::UI::WindowsAndMessaging::{
    DispatchMessageW, MSG, MsgWaitForMultipleObjects, PM_REMOVE, PeekMessageW, QS_ALLINPUT,
    TranslateMessage, WM_QUIT,
};

use super::menu::{self, TrayMenu, TrayPresenter};
use crate::startup;

// ── Messages from the watcher thread ──

enum Msg {
    ThemeChanged(bool),
}

fn is_quit(message: u32) -> bool {
    message == WM_QUIT
}

/// Pump all pending Win32 messages. Required for tray-icon to receive its
/// internal window messages. Returns `false` once `WM_QUIT` is pulled.
fn pump_messages() -> bool {
    unsafe {
        let mut msg: MSG = std::mem::zeroed();
        while PeekMessageW(&mut msg, None, 0, 0, PM_REMOVE).as_bool() {
            if is_quit(msg.message) {
                return false;
            }
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }
    true
}

fn wait_for_events() {
    unsafe {
        MsgWaitForMultipleObjects(None, false, 50, QS_ALLINPUT);
    }
}

/// Everything the tray owns for its lifetime. Dropping it removes the icon.
struct TrayApp {
    store: Arc<ThemeStore<RegistryBackend>>,
    tray: TrayIcon,
    menu: TrayMenu,
    watcher: Option<WatchHandle>,
    rx: Receiver<Msg>,
}

impl TrayApp {
    fn presenter(&self) -> TrayPresenter<'_> {
        TrayPresenter {
            tray: &self.tray,
            menu: &self.menu,
        }
    }

    /// Drain watcher, menu and icon events until exit or a fatal error.
    fn event_loop(&mut self) -> Result<()> {
        let menu_rx = MenuEvent::receiver();
        let icon_rx = TrayIconEvent::receiver();

        loop {
            // 1. Platform event pump
            if !pump_messages() {
                return Ok(());
            }

            // 2. Changes reported by the watcher (including our own writes)
            while let Ok(Msg::ThemeChanged(is_dark)) = self.rx.try_recv() {
                ui::present(&self.presenter(), is_dark);
            }

            // 3. Menu and icon events, mapped once to UiEvent
            let mut events: Vec<UiEvent> = Vec::new();
            while let Ok(event) = menu_rx.try_recv() {
                events.extend(menu::map_menu_event(&event, &self.menu));
            }
            while let Ok(event) = icon_rx.try_recv() {
                events.extend(menu::map_icon_event(&event));
            }
            for event in events {
                log::debug!("[tray] {event:?}");
                if ui::handle_event(event, &self.store, &self.presenter())? == Flow::Exit {
                    return Ok(());
                }
            }

            // 4. A watcher that stopped on its own is fatal
            if self.watcher.as_ref().is_some_and(WatchHandle::is_finished) {
                return Err(match self.watcher.take().map(WatchHandle::stop) {
                    Some(Err(e)) => e,
                    _ => ThemeswitchError::WatchUnavailable("watcher stopped unexpectedly".into()),
                });
            }

            // 5. Block until the next message or 50 ms
            wait_for_events();
        }
    }

    fn stop_watcher(&mut self) -> Result<()> {
        match self.watcher.take() {
            Some(handle) => handle.stop(),
            None => Ok(()),
        }
    }
}

pub fn run() -> Result<()> {
    let store = Arc::new(ThemeStore::new(RegistryBackend::new()));
    let is_dark = store.read()?;
    let mode = ThemeMode::from_is_dark(is_dark);
    println!("Current theme: {mode}");
    log::info!("[tray] current mode: {mode}");

    match startup::ensure_registered() {
        Ok(true) => {}
        Ok(false) => log::debug!("[autostart] already registered"),
        Err(e) => log::warn!("[autostart] {e}"),
    }

    let (menu, tray_menu) = menu::build_tray_menu(is_dark);
    let tray = menu::build_tray_icon(is_dark, menu)?;

    // Channel for watcher → main thread communication
    let (tx, rx) = mpsc::channel();
    let watcher = ChangeWatcher::start(
        Arc::clone(&store),
        RegistryNotifier::open()?,
        WatchConfig::default(),
        move |is_dark| {
            let _ = tx.send(Msg::ThemeChanged(is_dark));
        },
    )?;

    let mut app = TrayApp {
        store,
        tray,
        menu: tray_menu,
        watcher: Some(watcher),
        rx,
    };

    let result = app.event_loop();
    let stopped = app.stop_watcher();
    drop(app);
    log::info!("[tray] exiting");
    result.and(stopped)
}
