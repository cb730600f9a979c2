//! In-memory doubles for unit and integration tests.
//!
//! [`MemorySettings`] is a [`SettingsBackend`] whose writes also signal the
//! [`StubNotifier`] it hands out, the way a registry write fires
//! `RegNotifyChangeKeyValue`. Failure injection covers each error kind.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use crate::appearance::ThemeMode;
use crate::error::{Result, ThemeswitchError};
use crate::store::SettingsBackend;
use crate::watcher::{ChangeSource, Wakeup};

/// Wait on a `(Mutex<bool>, Condvar)` signal pair with a timeout.
///
/// Returns `true` if the signal was raised, `false` on timeout. Resets the
/// flag after reading, so several raises before a wait collapse into one
/// wakeup, like an auto-reset event.
fn wait_on_signal(signal: &(Mutex<bool>, Condvar), timeout: Duration) -> bool {
    let (lock, cvar) = signal;
    if let Ok(mut guard) = lock.lock() {
        if !*guard {
            match cvar.wait_timeout(guard, timeout) {
                Ok((new_guard, _)) => guard = new_guard,
                Err(e) => guard = e.into_inner().0,
            }
        }
        let was_signaled = *guard;
        *guard = false;
        was_signaled
    } else {
        log::warn!("signal mutex poisoned — falling back to sleep");
        std::thread::sleep(timeout);
        false
    }
}

struct Inner {
    /// `(system flag, apps flag)`; `None` when the key does not exist.
    flags: Mutex<Option<(u32, u32)>>,
    signal: (Mutex<bool>, Condvar),
    broadcasts: AtomicUsize,
    arms: AtomicUsize,
    reads: AtomicUsize,
    fail_apps_write: AtomicBool,
    fail_arm: AtomicBool,
}

/// Shared in-memory appearance key. Clones refer to the same key.
#[derive(Clone)]
pub struct MemorySettings {
    inner: Arc<Inner>,
}

impl MemorySettings {
    /// Key present with both flags set for `mode`.
    pub fn new(mode: ThemeMode) -> Self {
        Self::with_flags(Some((mode.flag(), mode.flag())))
    }

    /// Key absent: every read fails with `ConfigUnavailable`.
    pub fn missing() -> Self {
        Self::with_flags(None)
    }

    fn with_flags(flags: Option<(u32, u32)>) -> Self {
        Self {
            inner: Arc::new(Inner {
                flags: Mutex::new(flags),
                signal: (Mutex::new(false), Condvar::new()),
                broadcasts: AtomicUsize::new(0),
                arms: AtomicUsize::new(0),
                reads: AtomicUsize::new(0),
                fail_apps_write: AtomicBool::new(false),
                fail_arm: AtomicBool::new(false),
            }),
        }
    }

    /// Current `(system, apps)` flags.
    pub fn flags(&self) -> Option<(u32, u32)> {
        self.inner.flags.lock().ok().and_then(|f| *f)
    }

    /// Overwrite both flags independently without signaling.
    pub fn set_flags(&self, system: u32, apps: u32) {
        if let Ok(mut f) = self.inner.flags.lock() {
            *f = Some((system, apps));
        }
    }

    /// Simulate another process writing `mode` and firing the notification.
    pub fn external_write(&self, mode: ThemeMode) {
        self.set_flags(mode.flag(), mode.flag());
        self.signal();
    }

    /// Fire the notification without changing either flag, as a write to an
    /// unrelated value under the same key does.
    pub fn notify_unrelated(&self) {
        self.signal();
    }

    /// Delete the key so later reads fail.
    pub fn remove_location(&self) {
        if let Ok(mut f) = self.inner.flags.lock() {
            *f = None;
        }
    }

    /// Make the apps flag write fail after the system flag was written.
    pub fn set_fail_apps_write(&self, fail: bool) {
        self.inner.fail_apps_write.store(fail, Ordering::SeqCst);
    }

    /// Make arming the notifier fail.
    pub fn set_fail_arm(&self, fail: bool) {
        self.inner.fail_arm.store(fail, Ordering::SeqCst);
    }

    pub fn broadcast_count(&self) -> usize {
        self.inner.broadcasts.load(Ordering::SeqCst)
    }

    /// Number of successful `arm` calls across all notifiers.
    pub fn arm_count(&self) -> usize {
        self.inner.arms.load(Ordering::SeqCst)
    }

    /// Number of `read_flag` calls, successful or not.
    pub fn read_count(&self) -> usize {
        self.inner.reads.load(Ordering::SeqCst)
    }

    /// Block until `read_count` exceeds `seen` or `timeout` elapses.
    /// Returns `true` if it did.
    pub fn wait_for_read_after(&self, seen: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.read_count() <= seen {
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        true
    }

    /// Change source bound to this key.
    pub fn notifier(&self) -> StubNotifier {
        StubNotifier {
            inner: Arc::clone(&self.inner),
        }
    }

    fn signal(&self) {
        if let Ok(mut changed) = self.inner.signal.0.lock() {
            *changed = true;
            self.inner.signal.1.notify_all();
        }
    }
}

impl SettingsBackend for MemorySettings {
    fn read_flag(&self) -> Result<u32> {
        self.inner.reads.fetch_add(1, Ordering::SeqCst);
        self.flags()
            .map(|(system, _)| system)
            .ok_or_else(|| ThemeswitchError::ConfigUnavailable("key not found".into()))
    }

    fn write_flags(&self, flag: u32) -> Result<()> {
        {
            let mut guard = self
                .inner
                .flags
                .lock()
                .map_err(|e| ThemeswitchError::ConfigUnavailable(format!("poisoned: {e}")))?;
            let Some(flags) = guard.as_mut() else {
                return Err(ThemeswitchError::ConfigUnavailable("key not found".into()));
            };
            flags.0 = flag;
            if self.inner.fail_apps_write.load(Ordering::SeqCst) {
                drop(guard);
                self.signal();
                return Err(ThemeswitchError::ConfigWriteFailed(
                    "AppsUseLightTheme: injected failure".into(),
                ));
            }
            flags.1 = flag;
        }
        self.signal();
        Ok(())
    }

    fn broadcast(&self) {
        self.inner.broadcasts.fetch_add(1, Ordering::SeqCst);
    }
}

/// [`ChangeSource`] over a [`MemorySettings`] key.
pub struct StubNotifier {
    inner: Arc<Inner>,
}

impl ChangeSource for StubNotifier {
    fn arm(&mut self) -> Result<()> {
        if self.inner.fail_arm.load(Ordering::SeqCst) {
            return Err(ThemeswitchError::WatchUnavailable(
                "injected arm failure".into(),
            ));
        }
        self.inner.arms.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn wait(&mut self, timeout: Duration) -> Result<Wakeup> {
        if wait_on_signal(&self.inner.signal, timeout) {
            Ok(Wakeup::Notified)
        } else {
            Ok(Wakeup::TimedOut)
        }
    }
}
