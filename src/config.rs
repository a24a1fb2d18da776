use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::error::Error;

pub const DEFAULT_PATH: &str = "config.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub camera: CameraConfig,
    pub models: ModelConfig,
    pub session: SessionConfig,
    pub screen: ScreenConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub index: u32,
    pub mirror: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub face_detection: PathBuf,
    pub face_mesh: PathBuf,
    /// Square input edge of the mesh model (256 for the refined landmarker).
    pub mesh_input_size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub time_limit_secs: u64,
    pub stats_interval_secs: u64,
}

/// Overrides the size reported by the OS. Both must be set to take effect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub window_title: String,
    pub marker_radius: u32,
    pub font_family: String,
    pub font_size_pt: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self { index: 0, mirror: true }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            face_detection: PathBuf::from("models/face_detection.onnx"),
            face_mesh: PathBuf::from("models/face_landmarks_detector.onnx"),
            mesh_input_size: 256,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            time_limit_secs: 300,
            stats_interval_secs: 15,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            window_title: "Eye Controlled Mouse".to_string(),
            marker_radius: 3,
            font_family: "DejaVuSans".to_string(),
            font_size_pt: 22.0,
        }
    }
}

impl SessionConfig {
    pub fn time_limit(&self) -> Duration {
        Duration::from_secs(self.time_limit_secs)
    }

    pub fn stats_interval(&self) -> Duration {
        Duration::from_secs(self.stats_interval_secs)
    }
}

impl ScreenConfig {
    pub fn size(&self) -> Option<crate::types::ScreenSize> {
        match (self.width, self.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Some(crate::types::ScreenSize::new(w, h)),
            _ => None,
        }
    }
}

impl AppConfig {
    /// Reads `path`, falling back to defaults when it is missing or
    /// unparsable, then writes it back so new fields show up in the file.
    pub fn load(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let content = fs::read_to_string(path)?;
            match Self::parse(&content) {
                Ok(c) => {
                    info!(path = %path.display(), "loaded configuration");
                    c
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "could not parse config, using defaults");
                    Self::default()
                }
            }
        } else {
            info!(path = %path.display(), "configuration file not found, creating default");
            Self::default()
        };

        config.save(path)?;
        Ok(config)
    }

    pub fn parse(content: &str) -> std::result::Result<Self, Error> {
        let config: Self = serde_json::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> std::result::Result<(), Error> {
        if self.models.mesh_input_size == 0 {
            return Err(Error::Config("models.mesh_input_size must be positive".into()));
        }
        if self.session.stats_interval_secs == 0 {
            return Err(Error::Config("session.stats_interval_secs must be positive".into()));
        }
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
