//! Change watcher — blocks on the OS change notification for the appearance
//! key, re-reads the flag on every firing and reports real transitions.
//!
//! The loop runs on its own thread for the life of the [`WatchHandle`]:
//!
//! 1. arm the notification source (failure here makes [`ChangeWatcher::start`]
//!    return `WatchUnavailable`)
//! 2. wait up to `poll_interval`; a timeout only re-checks the stop token
//! 3. on a firing, re-arm, re-read through [`ThemeStore::read`] and pass the
//!    value through a [`ChangeFilter`]
//! 4. invoke the callback only when the filter reports a new value
//!
//! The registry signals writes to any value under the key, including the
//! sibling flag and unrelated personalization values, so most firings carry
//! no change. The filter drops them.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::config::WatchConfig;
use crate::error::{Result, ThemeswitchError};
use crate::store::{SettingsBackend, ThemeStore};

/// Outcome of one wait on a [`ChangeSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wakeup {
    /// The OS reported a change at the watched location.
    Notified,
    /// The timeout elapsed with no notification. The registration stays armed.
    TimedOut,
}

/// A single-shot OS change notification bound to the appearance key.
///
/// The source is moved onto the watcher thread and both `arm` and `wait` are
/// only ever called there.
pub trait ChangeSource {
    /// Register (or re-register) for the next change.
    fn arm(&mut self) -> Result<()>;

    /// Block until the armed notification fires or `timeout` elapses.
    fn wait(&mut self, timeout: Duration) -> Result<Wakeup>;
}

// ── Dedup filter ──

/// Remembers the last reported value and passes on only differences.
///
/// Starts from an unknown sentinel, so the first observation always passes.
#[derive(Debug, Default)]
pub struct ChangeFilter {
    last: Option<bool>,
}

impl ChangeFilter {
    pub fn new() -> Self {
        Self { last: None }
    }

    /// Feed a freshly read value. Returns `Some(is_dark)` if it differs from
    /// the last observed value, `None` otherwise.
    pub fn observe(&mut self, is_dark: bool) -> Option<bool> {
        if self.last == Some(is_dark) {
            return None;
        }
        self.last = Some(is_dark);
        Some(is_dark)
    }

    /// Last observed value; `None` until the first observation.
    pub fn last(&self) -> Option<bool> {
        self.last
    }
}

// ── Running watcher ──

/// Handle to a running watcher thread.
///
/// [`stop`](WatchHandle::stop) ends the loop and returns how it finished.
/// Dropping the handle also stops and joins the thread.
#[derive(Debug)]
pub struct WatchHandle {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<Result<()>>>,
}

impl WatchHandle {
    /// `true` once the loop has exited, e.g. after a read failure.
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(|h| h.is_finished())
    }

    /// Request shutdown and wait for the thread.
    ///
    /// Returns the error that ended the loop, if it ended on its own.
    pub fn stop(mut self) -> Result<()> {
        self.stop.store(true, Ordering::SeqCst);
        self.join_thread()
    }

    fn join_thread(&mut self) -> Result<()> {
        match self.thread.take() {
            Some(handle) => handle.join().unwrap_or_else(|_| {
                Err(ThemeswitchError::WatchUnavailable(
                    "watcher thread panicked".into(),
                ))
            }),
            None => Ok(()),
        }
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Err(e) = self.join_thread() {
            log::warn!("[watch] watcher ended with error: {e}");
        }
    }
}

/// Entry point for starting the background change loop.
pub struct ChangeWatcher;

impl ChangeWatcher {
    /// Start watching on a new thread.
    ///
    /// Returns once the source is armed. If arming fails the thread exits and
    /// the error (`WatchUnavailable`) is returned here.
    /// `on_change` runs on the watcher thread, never on the caller's.
    pub fn start<B, S, F>(
        store: Arc<ThemeStore<B>>,
        mut source: S,
        config: WatchConfig,
        mut on_change: F,
    ) -> Result<WatchHandle>
    where
        B: SettingsBackend + Send + Sync + 'static,
        S: ChangeSource + Send + 'static,
        F: FnMut(bool) + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<()>>(1);

        let thread = std::thread::Builder::new()
            .name("theme-watch".into())
            .spawn(move || {
                if let Err(e) = source.arm() {
                    let _ = ready_tx.send(Err(e));
                    return Ok(());
                }
                let _ = ready_tx.send(Ok(()));
                drop(ready_tx);

                let result = watch_loop(
                    &store,
                    &mut source,
                    &stop_flag,
                    config.poll_interval,
                    &mut on_change,
                );
                if let Err(ref e) = result {
                    log::error!("[watch] stopped: {e}");
                }
                result
            })
            .map_err(|e| ThemeswitchError::WatchUnavailable(format!("spawn watcher: {e}")))?;

        match ready_rx.recv() {
            Ok(Ok(())) => {
                log::debug!("[watch] watching for appearance changes");
                Ok(WatchHandle {
                    stop,
                    thread: Some(thread),
                })
            }
            Ok(Err(e)) => {
                let _ = thread.join();
                Err(e)
            }
            Err(_) => {
                let _ = thread.join();
                Err(ThemeswitchError::WatchUnavailable(
                    "watcher thread exited during startup".into(),
                ))
            }
        }
    }
}

fn watch_loop<B, S, F>(
    store: &ThemeStore<B>,
    source: &mut S,
    stop: &AtomicBool,
    poll_interval: Duration,
    on_change: &mut F,
) -> Result<()>
where
    B: SettingsBackend,
    S: ChangeSource,
    F: FnMut(bool),
{
    let mut filter = ChangeFilter::new();

    while !stop.load(Ordering::SeqCst) {
        match source.wait(poll_interval)? {
            Wakeup::TimedOut => continue,
            Wakeup::Notified => {
                // Re-arm before reading so a change landing during the read
                // fires the next wait.
                source.arm()?;
                let is_dark = store.read()?;
                match filter.observe(is_dark) {
                    Some(is_dark) => {
                        log::info!(
                            "[watch] appearance changed: {}",
                            if is_dark { "dark" } else { "light" }
                        );
                        on_change(is_dark);
                    }
                    None => log::debug!("[watch] notification without change"),
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appearance::ThemeMode;
    use crate::stub::MemorySettings;
    use std::sync::mpsc::RecvTimeoutError;
    use std::time::Instant;

    const RECV_TIMEOUT: Duration = Duration::from_secs(5);
    /// Long enough for a callback that follows a completed read to land.
    const QUIET: Duration = Duration::from_millis(100);

    fn fast_config() -> WatchConfig {
        WatchConfig {
            poll_interval: Duration::from_millis(10),
        }
    }

    /// Start a watcher over `settings` that forwards callbacks to a channel.
    fn start_forwarding(settings: &MemorySettings) -> (WatchHandle, mpsc::Receiver<bool>) {
        let store = Arc::new(ThemeStore::new(settings.clone()));
        let (tx, rx) = mpsc::channel();
        let handle = ChangeWatcher::start(store, settings.notifier(), fast_config(), move |d| {
            let _ = tx.send(d);
        })
        .unwrap();
        (handle, rx)
    }

    // ── ChangeFilter ──

    #[test]
    fn filter_first_observation_passes() {
        let mut f = ChangeFilter::new();
        assert_eq!(f.last(), None);
        assert_eq!(f.observe(true), Some(true));
        assert_eq!(f.last(), Some(true));
    }

    #[test]
    fn filter_first_light_observation_passes() {
        let mut f = ChangeFilter::new();
        assert_eq!(f.observe(false), Some(false));
    }

    #[test]
    fn filter_repeats_are_dropped() {
        let mut f = ChangeFilter::new();
        assert_eq!(f.observe(true), Some(true));
        assert_eq!(f.observe(true), None);
        assert_eq!(f.observe(true), None);
    }

    #[test]
    fn filter_reports_each_transition() {
        let mut f = ChangeFilter::new();
        assert_eq!(f.observe(false), Some(false));
        assert_eq!(f.observe(true), Some(true));
        assert_eq!(f.observe(false), Some(false));
        assert_eq!(f.last(), Some(false));
    }

    #[test]
    fn filter_fires_once_per_run_boundary() {
        let sequence = [true, true, false, false, false, true, false, false];
        let mut f = ChangeFilter::new();
        let fired: Vec<bool> = sequence.iter().filter_map(|&v| f.observe(v)).collect();
        // Runs: [t,t] [f,f,f] [t] [f,f]
        assert_eq!(fired, vec![true, false, true, false]);
    }

    // ── ChangeWatcher ──

    #[test]
    fn first_external_change_fires_once() {
        let settings = MemorySettings::new(ThemeMode::Light);
        let (handle, rx) = start_forwarding(&settings);

        settings.external_write(ThemeMode::Dark);
        assert_eq!(rx.recv_timeout(RECV_TIMEOUT), Ok(true));

        handle.stop().unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn unrelated_notification_after_change_is_dropped() {
        let settings = MemorySettings::new(ThemeMode::Light);
        let (handle, rx) = start_forwarding(&settings);

        settings.external_write(ThemeMode::Dark);
        assert_eq!(rx.recv_timeout(RECV_TIMEOUT), Ok(true));

        // Let the watcher consume the unrelated wakeup on its own
        let seen = settings.read_count();
        settings.notify_unrelated();
        assert!(settings.wait_for_read_after(seen, RECV_TIMEOUT));
        assert_eq!(rx.recv_timeout(QUIET), Err(RecvTimeoutError::Timeout));

        settings.external_write(ThemeMode::Light);
        assert_eq!(rx.recv_timeout(RECV_TIMEOUT), Ok(false));

        handle.stop().unwrap();
    }

    #[test]
    fn same_value_rewrite_is_read_but_not_reported() {
        let settings = MemorySettings::new(ThemeMode::Light);
        let (handle, rx) = start_forwarding(&settings);

        settings.external_write(ThemeMode::Dark);
        assert_eq!(rx.recv_timeout(RECV_TIMEOUT), Ok(true));

        let seen = settings.read_count();
        settings.external_write(ThemeMode::Dark);
        assert!(settings.wait_for_read_after(seen, RECV_TIMEOUT));
        assert_eq!(rx.recv_timeout(QUIET), Err(RecvTimeoutError::Timeout));

        handle.stop().unwrap();
    }

    #[test]
    fn own_writes_are_reported_like_external_ones() {
        let settings = MemorySettings::new(ThemeMode::Light);
        let store = Arc::new(ThemeStore::new(settings.clone()));
        let (tx, rx) = mpsc::channel();
        let handle = ChangeWatcher::start(
            Arc::clone(&store),
            settings.notifier(),
            fast_config(),
            move |d| {
                let _ = tx.send(d);
            },
        )
        .unwrap();

        store.toggle().unwrap();
        assert_eq!(rx.recv_timeout(RECV_TIMEOUT), Ok(true));

        handle.stop().unwrap();
    }

    #[test]
    fn start_fails_when_arm_fails() {
        let settings = MemorySettings::new(ThemeMode::Light);
        settings.set_fail_arm(true);
        let store = Arc::new(ThemeStore::new(settings.clone()));

        let err = ChangeWatcher::start(store, settings.notifier(), fast_config(), |_| {})
            .unwrap_err();
        assert!(matches!(err, ThemeswitchError::WatchUnavailable(_)));
    }

    #[test]
    fn rearms_after_every_firing() {
        let settings = MemorySettings::new(ThemeMode::Light);
        let (handle, rx) = start_forwarding(&settings);
        assert_eq!(settings.arm_count(), 1);

        settings.external_write(ThemeMode::Dark);
        assert_eq!(rx.recv_timeout(RECV_TIMEOUT), Ok(true));
        settings.external_write(ThemeMode::Light);
        assert_eq!(rx.recv_timeout(RECV_TIMEOUT), Ok(false));

        handle.stop().unwrap();
        assert!(settings.arm_count() >= 3);
    }

    #[test]
    fn stop_ends_idle_loop() {
        let settings = MemorySettings::new(ThemeMode::Dark);
        let (handle, rx) = start_forwarding(&settings);
        assert!(!handle.is_finished());

        let started = Instant::now();
        handle.stop().unwrap();
        assert!(started.elapsed() < fast_config().poll_interval * 20);
        // No change ever happened, so nothing was reported
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn stop_returns_within_a_few_default_intervals() {
        let settings = MemorySettings::new(ThemeMode::Light);
        let store = Arc::new(ThemeStore::new(settings.clone()));
        let config = WatchConfig::default();
        let handle =
            ChangeWatcher::start(store, settings.notifier(), config.clone(), |_| {}).unwrap();

        let started = Instant::now();
        handle.stop().unwrap();
        assert!(started.elapsed() < config.poll_interval * 3);
    }

    #[test]
    fn read_failure_ends_loop_with_config_unavailable() {
        let settings = MemorySettings::new(ThemeMode::Light);
        let (handle, _rx) = start_forwarding(&settings);

        settings.remove_location();
        settings.notify_unrelated();

        let deadline = std::time::Instant::now() + RECV_TIMEOUT;
        while !handle.is_finished() && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(handle.is_finished());
        let err = handle.stop().unwrap_err();
        assert!(matches!(err, ThemeswitchError::ConfigUnavailable(_)));
    }

    #[test]
    fn drop_stops_thread() {
        let settings = MemorySettings::new(ThemeMode::Light);
        let (handle, rx) = start_forwarding(&settings);
        drop(handle);

        // Sender lives in the closure owned by the joined thread
        assert_eq!(
            rx.recv_timeout(Duration::from_millis(100)),
            Err(mpsc::RecvTimeoutError::Disconnected)
        );
    }
}
