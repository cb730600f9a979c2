//! Appearance store — paired flag read/write plus the change broadcast.

use crate::appearance::ThemeMode;
use crate::error::Result;

/// Storage behind [`ThemeStore`]: the registry on Windows, memory in tests.
pub trait SettingsBackend {
    /// Read the flag that decides the current mode.
    ///
    /// Fails with `ConfigUnavailable` when the location cannot be opened or
    /// the value is missing.
    fn read_flag(&self) -> Result<u32>;

    /// Set both appearance flags to `flag`. Fails with `ConfigUnavailable`
    /// if the location cannot be opened and `ConfigWriteFailed` if either
    /// write fails. There is no rollback of a first successful write.
    fn write_flags(&self, flag: u32) -> Result<()>;

    /// Tell other processes the setting changed. Best effort.
    fn broadcast(&self);
}

/// Authoritative read/write of the appearance state.
#[derive(Debug)]
pub struct ThemeStore<B> {
    backend: B,
}

impl<B: SettingsBackend> ThemeStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// `true` when the system is in dark mode.
    pub fn read(&self) -> Result<bool> {
        Ok(self.mode()?.is_dark())
    }

    pub fn mode(&self) -> Result<ThemeMode> {
        self.backend.read_flag().map(ThemeMode::from_flag)
    }

    /// Write both flags, then broadcast.
    pub fn write(&self, mode: ThemeMode) -> Result<()> {
        self.backend.write_flags(mode.flag())?;
        log::debug!("[theme] wrote {mode}");
        self.broadcast();
        Ok(())
    }

    pub fn broadcast(&self) {
        self.backend.broadcast();
    }

    /// Write the opposite of the current mode and return it.
    ///
    /// Not atomic: an external write landing between the read and the write
    /// is overwritten, and the result may match what the other writer set.
    pub fn toggle(&self) -> Result<ThemeMode> {
        let target = self.mode()?.opposite();
        log::info!("[theme] switching to {target} mode");
        self.write(target)?;
        Ok(target)
    }
}
