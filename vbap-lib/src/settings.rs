//! Serialized configuration for gain-table generation.

use std::fmt::{Display, Formatter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::geometry::{deserialize_degrees, Direction};
use crate::presets::LayoutPreset;
use crate::triangulation::TriangulationSettings;

/// Options shared by the 3D table builders and [`crate::VbapPanner`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VbapSettings {
    #[serde(flatten)]
    pub triangulation: TriangulationSettings,
    /// Add dummy loudspeakers at uncovered poles.
    pub enable_dummies: bool,
    /// MDAP spread in degrees; values up to 0.1 disable spreading.
    #[serde(deserialize_with = "deserialize_degrees")]
    pub spread_deg: f32,
}

impl VbapSettings {
    pub fn with_spread(mut self, spread_deg: f32) -> Self {
        self.spread_deg = spread_deg;
        self
    }
}

impl Default for VbapSettings {
    fn default() -> Self {
        Self {
            triangulation: TriangulationSettings::default(),
            enable_dummies: true,
            spread_deg: 0.0,
        }
    }
}

/// JSON layout description read by tools built on this crate.
///
/// ```json
/// {
///   "preset": "surround_5_0",
///   "sources": [[0, 0], {"azimuth": "45deg", "elevation": 20}],
///   "settings": {"spread_deg": 20, "enable_dummies": true}
/// }
/// ```
///
/// Explicit `loudspeakers` take precedence over `preset`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<LayoutPreset>,
    pub loudspeakers: Vec<Direction>,
    pub sources: Vec<Direction>,
    pub settings: VbapSettings,
}

impl LayoutFile {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Loudspeaker directions, falling back to the preset.
    pub fn resolved_loudspeakers(&self) -> Vec<Direction> {
        if self.loudspeakers.is_empty() {
            if let Some(preset) = self.preset {
                return preset.directions();
            }
        }
        self.loudspeakers.clone()
    }
}

/// Error type for reading layout files.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read layout file: {}", err),
            Self::Json(err) => write!(f, "invalid layout file: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}
