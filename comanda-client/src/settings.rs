//! Device settings persistence
//!
//! The preference store belongs to the host application; this module defines
//! the contract plus a JSON file store and an in-memory store.

use crate::error::SettingsError;
use shared::models::DeviceSettings;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Durable key/value settings for this device
pub trait SettingsStore: Send + Sync {
    fn load(&self) -> Result<DeviceSettings, SettingsError>;

    fn save(&self, settings: &DeviceSettings) -> Result<(), SettingsError>;

    /// Load, modify and save. Implementations hold their lock throughout so
    /// concurrent updates do not drop each other's fields.
    fn update(&self, apply: &mut dyn FnMut(&mut DeviceSettings)) -> Result<DeviceSettings, SettingsError> {
        let mut settings = self.load()?;
        apply(&mut settings);
        self.save(&settings)?;
        Ok(settings)
    }
}

/// Settings stored as a pretty-printed JSON file
#[derive(Debug)]
pub struct JsonSettingsStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_dir(&self) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Caller holds `write_lock`
    fn write(&self, settings: &DeviceSettings) -> Result<(), SettingsError> {
        self.ensure_dir()?;
        let json = serde_json::to_string_pretty(settings)?;
        // write-then-rename: readers never see a partial file
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl SettingsStore for JsonSettingsStore {
    /// Missing file means defaults
    fn load(&self) -> Result<DeviceSettings, SettingsError> {
        if !self.path.exists() {
            return Ok(DeviceSettings::default());
        }
        let json = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&json)?)
    }

    fn save(&self, settings: &DeviceSettings) -> Result<(), SettingsError> {
        let _guard = self.lock();
        self.write(settings)
    }

    fn update(&self, apply: &mut dyn FnMut(&mut DeviceSettings)) -> Result<DeviceSettings, SettingsError> {
        let _guard = self.lock();
        let mut settings = self.load()?;
        apply(&mut settings);
        self.write(&settings)?;
        Ok(settings)
    }
}

/// In-memory settings
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    inner: Mutex<DeviceSettings>,
}

impl MemorySettingsStore {
    pub fn new(settings: DeviceSettings) -> Self {
        Self {
            inner: Mutex::new(settings),
        }
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Result<DeviceSettings, SettingsError> {
        Ok(self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone())
    }

    fn save(&self, settings: &DeviceSettings) -> Result<(), SettingsError> {
        *self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = settings.clone();
        Ok(())
    }

    fn update(&self, apply: &mut dyn FnMut(&mut DeviceSettings)) -> Result<DeviceSettings, SettingsError> {
        let mut guard = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        apply(&mut guard);
        Ok(guard.clone())
    }
}
