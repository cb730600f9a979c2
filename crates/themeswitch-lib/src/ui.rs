//! Presentation contract — the UI events the tray recognizes and what it
//! shows for each appearance state. Platform code maps raw tray and menu
//! events to [`UiEvent`] once and implements [`Presenter`].

use crate::error::Result;
use crate::store::{SettingsBackend, ThemeStore};

/// Tray interactions the app reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    IconLeftClick,
    MenuToggle,
    MenuExit,
}

/// What the tray loop should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Tray glyph. The icon shows the mode a click switches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconVariant {
    Sun,
    Moon,
}

/// Sink for icon and tooltip updates.
pub trait Presenter {
    fn set_icon(&self, variant: IconVariant);
    fn set_tooltip(&self, text: &str);
}

pub fn icon_for(is_dark: bool) -> IconVariant {
    if is_dark {
        IconVariant::Sun
    } else {
        IconVariant::Moon
    }
}

pub fn tooltip_for(is_dark: bool) -> &'static str {
    if is_dark {
        "Theme Switcher - Click to switch to Light mode"
    } else {
        "Theme Switcher - Click to switch to Dark mode"
    }
}

/// Push icon and tooltip for the given state.
pub fn present(presenter: &impl Presenter, is_dark: bool) {
    presenter.set_icon(icon_for(is_dark));
    presenter.set_tooltip(tooltip_for(is_dark));
}

/// Apply a UI event. Toggles refresh the presenter from a fresh read rather
/// than from the written value.
pub fn handle_event<B: SettingsBackend>(
    event: UiEvent,
    store: &ThemeStore<B>,
    presenter: &impl Presenter,
) -> Result<Flow> {
    match event {
        UiEvent::IconLeftClick | UiEvent::MenuToggle => {
            store.toggle()?;
            present(presenter, store.read()?);
            Ok(Flow::Continue)
        }
        UiEvent::MenuExit => Ok(Flow::Exit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appearance::ThemeMode;
    use crate::error::ThemeswitchError;
    use crate::stub::MemorySettings;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingPresenter {
        icons: RefCell<Vec<IconVariant>>,
        tooltips: RefCell<Vec<String>>,
    }

    impl Presenter for RecordingPresenter {
        fn set_icon(&self, variant: IconVariant) {
            self.icons.borrow_mut().push(variant);
        }
        fn set_tooltip(&self, text: &str) {
            self.tooltips.borrow_mut().push(text.to_string());
        }
    }

    #[test]
    fn dark_mode_offers_light() {
        assert_eq!(icon_for(true), IconVariant::Sun);
        assert!(tooltip_for(true).ends_with("Light mode"));
    }

    #[test]
    fn light_mode_offers_dark() {
        assert_eq!(icon_for(false), IconVariant::Moon);
        assert!(tooltip_for(false).ends_with("Dark mode"));
    }

    #[test]
    fn present_sets_icon_and_tooltip() {
        let p = RecordingPresenter::default();
        present(&p, true);
        assert_eq!(*p.icons.borrow(), vec![IconVariant::Sun]);
        assert_eq!(
            *p.tooltips.borrow(),
            vec!["Theme Switcher - Click to switch to Light mode".to_string()]
        );
    }

    #[test]
    fn left_click_toggles_and_refreshes() {
        let store = ThemeStore::new(MemorySettings::new(ThemeMode::Light));
        let p = RecordingPresenter::default();

        let flow = handle_event(UiEvent::IconLeftClick, &store, &p).unwrap();
        assert_eq!(flow, Flow::Continue);
        assert!(store.read().unwrap());
        assert_eq!(*p.icons.borrow(), vec![IconVariant::Sun]);
    }

    #[test]
    fn menu_toggle_behaves_like_click() {
        let store = ThemeStore::new(MemorySettings::new(ThemeMode::Dark));
        let p = RecordingPresenter::default();

        handle_event(UiEvent::MenuToggle, &store, &p).unwrap();
        assert!(!store.read().unwrap());
        assert_eq!(*p.icons.borrow(), vec![IconVariant::Moon]);
        assert_eq!(store.backend().broadcast_count(), 1);
    }

    #[test]
    fn exit_touches_nothing() {
        let store = ThemeStore::new(MemorySettings::new(ThemeMode::Dark));
        let p = RecordingPresenter::default();

        let flow = handle_event(UiEvent::MenuExit, &store, &p).unwrap();
        assert_eq!(flow, Flow::Exit);
        assert!(store.read().unwrap());
        assert!(p.icons.borrow().is_empty());
        assert_eq!(store.backend().broadcast_count(), 0);
    }

    #[test]
    fn failed_toggle_surfaces_error_without_refresh() {
        let settings = MemorySettings::new(ThemeMode::Light);
        settings.set_fail_apps_write(true);
        let store = ThemeStore::new(settings);
        let p = RecordingPresenter::default();

        let err = handle_event(UiEvent::IconLeftClick, &store, &p).unwrap_err();
        assert!(matches!(err, ThemeswitchError::ConfigWriteFailed(_)));
        assert!(p.icons.borrow().is_empty());
    }
}
