use directories::ProjectDirs;
use measure_core::frame::{DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH};
use measure_core::{ShapeHint, Unit};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const SETTINGS_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("unable to resolve local data directory")]
    NoDataDirectory,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("invalid setting: {0}")]
    InvalidSetting(String),
}

/// User defaults applied to every new measuring workspace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub unit: Unit,
    pub known_reference_length: f64,
    pub volume_depth: f64,
    pub shape_hint: ShapeHint,
    pub canvas_max_width: f64,
    pub canvas_max_height: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            unit: Unit::Centimeter,
            known_reference_length: 10.0,
            volume_depth: 0.0,
            shape_hint: ShapeHint::Circular,
            canvas_max_width: DEFAULT_CANVAS_WIDTH,
            canvas_max_height: DEFAULT_CANVAS_HEIGHT,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), StorageError> {
        if !(self.known_reference_length.is_finite() && self.known_reference_length > 0.0) {
            return Err(StorageError::InvalidSetting(format!(
                "known_reference_length must be greater than zero (got {})",
                self.known_reference_length
            )));
        }

        if !(self.volume_depth.is_finite() && self.volume_depth >= 0.0) {
            return Err(StorageError::InvalidSetting(format!(
                "volume_depth must be zero or greater (got {})",
                self.volume_depth
            )));
        }

        let canvas_ok = [self.canvas_max_width, self.canvas_max_height]
            .iter()
            .all(|side| side.is_finite() && *side > 0.0);
        if !canvas_ok {
            return Err(StorageError::InvalidSetting(format!(
                "canvas must be positive (got {}x{})",
                self.canvas_max_width, self.canvas_max_height
            )));
        }

        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SettingsEnvelope {
    version: u32,
    settings: Settings,
}

impl Storage {
    pub fn from_default_project() -> Result<Self, StorageError> {
        let dirs = ProjectDirs::from("dev", "PotholeMeasure", "PotholeMeasure")
            .ok_or(StorageError::NoDataDirectory)?;

        Ok(Self { root: dirs.data_local_dir().to_path_buf() })
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn load_settings(&self) -> Result<Settings, StorageError> {
        let path = self.settings_path();
        if !path.exists() {
            log::debug!("no settings at {}, using defaults", path.display());
            return Ok(Settings::default());
        }

        let bytes = fs::read(&path)?;
        let envelope: SettingsEnvelope = serde_json::from_slice(&bytes)?;

        if envelope.version > SETTINGS_SCHEMA_VERSION {
            return Err(StorageError::InvalidSetting(format!(
                "settings schema version {} is newer than supported version {}",
                envelope.version, SETTINGS_SCHEMA_VERSION
            )));
        }

        envelope.settings.validate()?;
        Ok(envelope.settings)
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<(), StorageError> {
        settings.validate()?;
        fs::create_dir_all(&self.root)?;

        let envelope =
            SettingsEnvelope { version: SETTINGS_SCHEMA_VERSION, settings: settings.clone() };

        let bytes = serde_json::to_vec_pretty(&envelope)?;
        fs::write(self.settings_path(), bytes)?;
        log::debug!("settings saved to {}", self.settings_path().display());
        Ok(())
    }

    fn settings_path(&self) -> PathBuf {
        self.root.join("settings.json")
    }
}
