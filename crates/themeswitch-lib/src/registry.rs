//! Windows registry backend — `HKCU\...\Themes\Personalize` flags,
//! `WM_SETTINGCHANGE` broadcast, and `RegNotifyChangeKeyValue` watching.

use std::time::Duration;

use windows::Win32::Foundation::{CloseHandle, HANDLE, LPARAM, WAIT_OBJECT_0, WAIT_TIMEOUT, WPARAM};
use windows::Win32::System::LibraryLoader::{GetModuleHandleW, GetProcAddress};
use windows::Win32::System::Registry::{
    HKEY, REG_NOTIFY_CHANGE_LAST_SET, REG_NOTIFY_CHANGE_NAME, RegNotifyChangeKeyValue,
};
use windows::Win32::System::Threading::{CreateEventW, WaitForSingleObject};
use windows::Win32::UI::WindowsAndMessaging::{
    HWND_BROADCAST, SMTO_ABORTIFHUNG, SendMessageTimeoutW, WM_SETTINGCHANGE,
};
use windows::core::{HSTRING, s, w};
use winreg::RegKey;
use winreg::enums::{HKEY_CURRENT_USER, KEY_NOTIFY, KEY_QUERY_VALUE, KEY_SET_VALUE};

use crate::appearance::{APPS_LIGHT_THEME, BROADCAST_PARAM, PERSONALIZE_KEY, SYSTEM_LIGHT_THEME};
use crate::error::{Result, ThemeswitchError};
use crate::store::SettingsBackend;
use crate::watcher::{ChangeSource, Wakeup};

/// How long a single window may take to process the broadcast.
const BROADCAST_TIMEOUT_MS: u32 = 5000;

fn open_personalize(flags: u32) -> Result<RegKey> {
    RegKey::predef(HKEY_CURRENT_USER)
        .open_subkey_with_flags(PERSONALIZE_KEY, flags)
        .map_err(|e| ThemeswitchError::ConfigUnavailable(format!("{PERSONALIZE_KEY}: {e}")))
}

/// Appearance flags in the current user's registry hive.
///
/// Stateless: every call opens and closes its own key handle.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegistryBackend;

impl RegistryBackend {
    pub fn new() -> Self {
        RegistryBackend
    }
}

impl SettingsBackend for RegistryBackend {
    fn read_flag(&self) -> Result<u32> {
        let key = open_personalize(KEY_QUERY_VALUE)?;
        key.get_value::<u32, _>(SYSTEM_LIGHT_THEME)
            .map_err(|e| ThemeswitchError::ConfigUnavailable(format!("{SYSTEM_LIGHT_THEME}: {e}")))
    }

    fn write_flags(&self, flag: u32) -> Result<()> {
        let key = open_personalize(KEY_QUERY_VALUE | KEY_SET_VALUE)?;
        for name in [SYSTEM_LIGHT_THEME, APPS_LIGHT_THEME] {
            key.set_value(name, &flag)
                .map_err(|e| ThemeswitchError::ConfigWriteFailed(format!("{name}: {e}")))?;
        }
        // `key` closes on drop, before the broadcast goes out
        Ok(())
    }

    fn broadcast(&self) {
        let param = HSTRING::from(BROADCAST_PARAM);
        let mut result = 0usize;
        unsafe {
            let sent = SendMessageTimeoutW(
                HWND_BROADCAST,
                WM_SETTINGCHANGE,
                WPARAM(0),
                LPARAM(param.as_ptr() as isize),
                SMTO_ABORTIFHUNG,
                BROADCAST_TIMEOUT_MS,
                Some(&mut result as *mut usize),
            );
            if sent.0 == 0 {
                log::debug!("[broadcast] WM_SETTINGCHANGE timed out for some windows");
            }
        }
        refresh_user_parameters();
    }
}

type UpdatePerUserSystemParameters = unsafe extern "system" fn(u32, i32) -> i32;

/// `UpdatePerUserSystemParameters` from the already-loaded user32 module.
///
/// The export is not declared in the SDK headers, so it is resolved at
/// runtime. user32 is mapped for the life of any process that broadcasts, and
/// `GetModuleHandleW` takes no reference, so nothing needs freeing.
fn update_per_user_parameters() -> Option<UpdatePerUserSystemParameters> {
    unsafe {
        let user32 = GetModuleHandleW(w!("user32.dll")).ok()?;
        let proc = GetProcAddress(user32, s!("UpdatePerUserSystemParameters"))?;
        Some(std::mem::transmute::<
            unsafe extern "system" fn() -> isize,
            UpdatePerUserSystemParameters,
        >(proc))
    }
}

/// Ask the shell to reload cached per-user UI parameters. A missing export is
/// logged and ignored.
fn refresh_user_parameters() {
    match update_per_user_parameters() {
        Some(update) => unsafe {
            update(1, 0);
        },
        None => log::warn!("[broadcast] UpdatePerUserSystemParameters not available"),
    }
}

// ── Change notification ──

/// `RegNotifyChangeKeyValue` on the Personalize key, signaled through an
/// auto-reset event.
///
/// An asynchronous registration ends when the registering thread exits, so
/// `arm` must be called on the thread that waits. [`ChangeWatcher`] does this.
///
/// [`ChangeWatcher`]: crate::watcher::ChangeWatcher
pub struct RegistryNotifier {
    key: RegKey,
    event: HANDLE,
}

// SAFETY: the event handle and key handle are process-wide kernel handles.
// The notifier is moved to the watcher thread once and used only there.
unsafe impl Send for RegistryNotifier {}

impl RegistryNotifier {
    /// Open the key for notification and create the wake event.
    pub fn open() -> Result<Self> {
        let key = RegKey::predef(HKEY_CURRENT_USER)
            .open_subkey_with_flags(PERSONALIZE_KEY, KEY_NOTIFY | KEY_QUERY_VALUE)
            .map_err(|e| ThemeswitchError::WatchUnavailable(format!("{PERSONALIZE_KEY}: {e}")))?;
        let event = unsafe { CreateEventW(None, false, false, None) }
            .map_err(|e| ThemeswitchError::WatchUnavailable(format!("CreateEventW: {e}")))?;
        Ok(Self { key, event })
    }

    fn hkey(&self) -> HKEY {
        HKEY(self.key.raw_handle() as *mut core::ffi::c_void)
    }
}

impl ChangeSource for RegistryNotifier {
    fn arm(&mut self) -> Result<()> {
        unsafe {
            RegNotifyChangeKeyValue(
                self.hkey(),
                false,
                REG_NOTIFY_CHANGE_NAME | REG_NOTIFY_CHANGE_LAST_SET,
                Some(self.event),
                true,
            )
        }
        .ok()
        .map_err(|e| ThemeswitchError::WatchUnavailable(format!("RegNotifyChangeKeyValue: {e}")))
    }

    fn wait(&mut self, timeout: Duration) -> Result<Wakeup> {
        let millis = u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX);
        let status = unsafe { WaitForSingleObject(self.event, millis) };
        if status == WAIT_OBJECT_0 {
            Ok(Wakeup::Notified)
        } else if status == WAIT_TIMEOUT {
            Ok(Wakeup::TimedOut)
        } else {
            Err(ThemeswitchError::WatchUnavailable(format!(
                "WaitForSingleObject returned {:#x}",
                status.0
            )))
        }
    }
}

impl Drop for RegistryNotifier {
    fn drop(&mut self) {
        unsafe {
            let _ = CloseHandle(self.event);
        }
    }
}
