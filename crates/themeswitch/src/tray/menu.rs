//! Tray menu and icon construction, and the mapping from tray/menu events to
//! [`UiEvent`].

use muda::{Menu, MenuEvent, MenuItem, PredefinedMenuItem};
use tray_icon::{Icon, MouseButton, MouseButtonState, TrayIcon, TrayIconEvent};

use themeswitch_lib::error::{Result, ThemeswitchError};
use themeswitch_lib::ui::{self, IconVariant, Presenter, UiEvent};

use crate::icon;

/// All menu items the tray uses, returned from `build_tray_menu`.
pub struct TrayMenu {
    pub status_item: MenuItem,
    pub toggle_item: MenuItem,
    pub exit_item: MenuItem,
}

fn status_text(is_dark: bool) -> &'static str {
    if is_dark { "Dark mode" } else { "Light mode" }
}

/// Build the tray context menu.
pub fn build_tray_menu(is_dark: bool) -> (Menu, TrayMenu) {
    let menu = Menu::new();
    let status_item = MenuItem::new(status_text(is_dark), false, None);
    let toggle_item = MenuItem::new("Toggle theme", true, None);
    let exit_item = MenuItem::new("Exit", true, None);

    let _ = menu.append(&status_item);
    let _ = menu.append(&toggle_item);
    let _ = menu.append(&PredefinedMenuItem::separator());
    let _ = menu.append(&exit_item);

    (
        menu,
        TrayMenu {
            status_item,
            toggle_item,
            exit_item,
        },
    )
}

fn tray_icon_image(variant: IconVariant) -> Result<Icon> {
    let px = icon::pixels(variant);
    Icon::from_rgba(px.rgba.clone(), px.width, px.height)
        .map_err(|e| ThemeswitchError::Io(std::io::Error::other(format!("tray icon: {e}"))))
}

/// Build the tray icon for the initial state. The menu opens on right-click
/// only; left-click is reserved for toggling.
pub fn build_tray_icon(is_dark: bool, menu: Menu) -> Result<TrayIcon> {
    tray_icon::TrayIconBuilder::new()
        .with_tooltip(ui::tooltip_for(is_dark))
        .with_icon(tray_icon_image(ui::icon_for(is_dark))?)
        .with_menu(Box::new(menu))
        .with_menu_on_left_click(false)
        .build()
        .map_err(|e| {
            ThemeswitchError::Io(std::io::Error::other(format!(
                "Failed to create tray icon: {e}"
            )))
        })
}

// ── Event mapping ──

pub fn map_menu_event(event: &MenuEvent, menu: &TrayMenu) -> Option<UiEvent> {
    if event.id() == menu.toggle_item.id() {
        Some(UiEvent::MenuToggle)
    } else if event.id() == menu.exit_item.id() {
        Some(UiEvent::MenuExit)
    } else {
        None
    }
}

/// Only the release of a left click counts, so one click toggles once.
pub fn map_icon_event(event: &TrayIconEvent) -> Option<UiEvent> {
    match event {
        TrayIconEvent::Click {
            button: MouseButton::Left,
            button_state: MouseButtonState::Up,
            ..
        } => Some(UiEvent::IconLeftClick),
        _ => None,
    }
}

// ── Presenter ──

/// Pushes icon, tooltip and status line updates to the live tray.
pub struct TrayPresenter<'a> {
    pub tray: &'a TrayIcon,
    pub menu: &'a TrayMenu,
}

impl Presenter for TrayPresenter<'_> {
    fn set_icon(&self, variant: IconVariant) {
        match tray_icon_image(variant) {
            Ok(img) => {
                if let Err(e) = self.tray.set_icon(Some(img)) {
                    log::warn!("[tray] set icon: {e}");
                }
            }
            Err(e) => log::warn!("[tray] {e}"),
        }
        // The sun is offered while dark
        self.menu
            .status_item
            .set_text(status_text(variant == IconVariant::Sun));
    }

    fn set_tooltip(&self, text: &str) {
        if let Err(e) = self.tray.set_tooltip(Some(text)) {
            log::warn!("[tray] set tooltip: {e}");
        }
    }
}
