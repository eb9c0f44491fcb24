//! The tunable configuration record and its durable store.
//!
//! The record is persisted as a flat JSON object:
//!
//! ```json
//! {
//!   "modulation": "FM",
//!   "frequency": "88.0",
//!   "blue-led-intensity": 127,
//!   "blue-led-pulse-rate": 0,
//!   "red-led": false
//! }
//! ```

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// The authoritative tunable state of one unit.
///
/// `modulation` and `frequency` are kept exactly as entered; the LED values
/// are stored as bytes and capped at 127 by validation, not by the type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Configuration {
    pub modulation: String,
    pub frequency: String,
    pub blue_led_intensity: u8,
    pub blue_led_pulse_rate: u8,
    pub red_led: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            modulation: "FM".to_string(),
            frequency: "88.0".to_string(),
            blue_led_intensity: 127,
            blue_led_pulse_rate: 0,
            red_led: false,
        }
    }
}

/// A partial configuration. Present fields replace the base, absent ones keep it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ConfigurationPatch {
    pub modulation: Option<String>,
    pub frequency: Option<String>,
    pub blue_led_intensity: Option<u8>,
    pub blue_led_pulse_rate: Option<u8>,
    pub red_led: Option<bool>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    #[error("invalid value '{value}' for field '{field}': {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("unknown field '{0}'")]
    UnknownField(String),
}

impl ConfigurationPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overlay the present fields on `base`.
    pub fn overlay(&self, base: &Configuration) -> Configuration {
        Configuration {
            modulation: self
                .modulation
                .clone()
                .unwrap_or_else(|| base.modulation.clone()),
            frequency: self
                .frequency
                .clone()
                .unwrap_or_else(|| base.frequency.clone()),
            blue_led_intensity: self.blue_led_intensity.unwrap_or(base.blue_led_intensity),
            blue_led_pulse_rate: self.blue_led_pulse_rate.unwrap_or(base.blue_led_pulse_rate),
            red_led: self.red_led.unwrap_or(base.red_led),
        }
    }

    /// Set one field from its textual form-field value.
    ///
    /// Field names are the persisted record's keys.
    pub fn set_field(&mut self, name: &str, value: &str) -> Result<(), PatchError> {
        match name {
            "modulation" => self.modulation = Some(value.to_string()),
            "frequency" => self.frequency = Some(value.to_string()),
            "blue-led-intensity" => self.blue_led_intensity = Some(parse_byte(name, value)?),
            "blue-led-pulse-rate" => self.blue_led_pulse_rate = Some(parse_byte(name, value)?),
            "red-led" => self.red_led = Some(parse_switch(name, value)?),
            other => return Err(PatchError::UnknownField(other.to_string())),
        }
        Ok(())
    }
}

fn parse_byte(field: &str, value: &str) -> Result<u8, PatchError> {
    value
        .trim()
        .parse::<u8>()
        .map_err(|e| PatchError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        })
}

fn parse_switch(field: &str, value: &str) -> Result<bool, PatchError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "1" => Ok(true),
        "false" | "off" | "0" => Ok(false),
        _ => Err(PatchError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "expected true/false, on/off or 1/0".to_string(),
        }),
    }
}

/// Failures reading or writing the persisted record.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize config: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to write config file {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Durable storage for the applied configuration.
pub trait ConfigStore: Send + Sync {
    /// Read the stored record. `Ok(None)` when nothing has been stored yet.
    fn load(&self) -> Result<Option<Configuration>, PersistenceError>;

    fn save(&self, config: &Configuration) -> Result<(), PersistenceError>;

    /// Human-readable location, for logs.
    fn location(&self) -> String;
}

/// Load the stored configuration, falling back to the default.
///
/// An absent or undecodable record yields [`Configuration::default`]; any
/// other read failure is returned.
pub fn load_or_default(store: &dyn ConfigStore) -> Result<Configuration, PersistenceError> {
    match store.load() {
        Ok(Some(config)) => {
            debug!(location = %store.location(), "Loaded configuration");
            Ok(config)
        }
        Ok(None) => {
            info!(location = %store.location(), "No stored configuration, using defaults");
            Ok(Configuration::default())
        }
        Err(e @ PersistenceError::Decode { .. }) => {
            warn!("{}; using defaults", e);
            Ok(Configuration::default())
        }
        Err(e) => Err(e),
    }
}

/// A JSON file on disk, replaced atomically on save.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Prefix of the staging file written next to the record before it
    /// replaces it.
    fn staging_prefix(&self) -> String {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "rsharkd.conf".to_string());
        format!(".{name}.")
    }
}

impl ConfigStore for JsonFileStore {
    fn load(&self) -> Result<Option<Configuration>, PersistenceError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(PersistenceError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| PersistenceError::Decode {
                path: self.path.clone(),
                source,
            })
    }

    fn save(&self, config: &Configuration) -> Result<(), PersistenceError> {
        let mut content = serde_json::to_string_pretty(config).map_err(PersistenceError::Encode)?;
        content.push('\n');

        let write_err = |source| PersistenceError::Write {
            path: self.path.clone(),
            source,
        };

        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent).map_err(write_err)?;

        // The staging file is removed when dropped, so a failed write or
        // rename leaves nothing behind.
        let mut staging = tempfile::Builder::new()
            .prefix(&self.staging_prefix())
            .suffix(".tmp")
            .tempfile_in(parent)
            .map_err(write_err)?;
        staging.write_all(content.as_bytes()).map_err(write_err)?;
        staging
            .persist(&self.path)
            .map_err(|e| write_err(e.error))?;

        debug!(path = ?self.path, "Saved configuration");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory store for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    record: Mutex<Option<Configuration>>,
    saves: Mutex<usize>,
    fail_saves: Mutex<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(config: Configuration) -> Self {
        let store = Self::default();
        *store.record.lock() = Some(config);
        store
    }

    pub fn record(&self) -> Option<Configuration> {
        self.record.lock().clone()
    }

    pub fn save_count(&self) -> usize {
        *self.saves.lock()
    }

    /// Make every later `save` fail with a write error.
    pub fn set_fail_saves(&self, fail: bool) {
        *self.fail_saves.lock() = fail;
    }
}

impl ConfigStore for MemoryStore {
    fn load(&self) -> Result<Option<Configuration>, PersistenceError> {
        Ok(self.record.lock().clone())
    }

    fn save(&self, config: &Configuration) -> Result<(), PersistenceError> {
        if *self.fail_saves.lock() {
            return Err(PersistenceError::Write {
                path: PathBuf::from("<memory>"),
                source: io::Error::other("injected save failure"),
            });
        }
        *self.record.lock() = Some(config.clone());
        *self.saves.lock() += 1;
        Ok(())
    }

    fn location(&self) -> String {
        "<memory>".to_string()
    }
}

impl<T: ConfigStore + ?Sized> ConfigStore for std::sync::Arc<T> {
    fn load(&self) -> Result<Option<Configuration>, PersistenceError> {
        (**self).load()
    }

    fn save(&self, config: &Configuration) -> Result<(), PersistenceError> {
        (**self).save(config)
    }

    fn location(&self) -> String {
        (**self).location()
    }
}
