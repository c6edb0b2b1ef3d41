//! Common loudspeaker layouts.

use serde::{Deserialize, Serialize};

use crate::geometry::Direction;

const CUBE_ELEVATION: f32 = 35.264_39;

/// Named loudspeaker layouts (LFE channels omitted).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutPreset {
    #[serde(rename = "stereo")]
    Stereo,
    #[serde(rename = "surround_5_0")]
    Surround5_0,
    #[serde(rename = "surround_7_0")]
    Surround7_0,
    #[serde(rename = "surround_7_0_4")]
    Surround7_0_4,
    #[serde(rename = "cube")]
    Cube,
}

impl LayoutPreset {
    pub const ALL: [LayoutPreset; 5] = [
        LayoutPreset::Stereo,
        LayoutPreset::Surround5_0,
        LayoutPreset::Surround7_0,
        LayoutPreset::Surround7_0_4,
        LayoutPreset::Cube,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LayoutPreset::Stereo => "stereo",
            LayoutPreset::Surround5_0 => "surround_5_0",
            LayoutPreset::Surround7_0 => "surround_7_0",
            LayoutPreset::Surround7_0_4 => "surround_7_0_4",
            LayoutPreset::Cube => "cube",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|preset| preset.name() == name)
    }

    /// Whether the layout only spans the horizontal plane.
    pub fn is_horizontal(self) -> bool {
        self.directions().iter().all(|d| d.elevation == 0.0)
    }

    pub fn directions(self) -> Vec<Direction> {
        let pairs: &[(f32, f32)] = match self {
            LayoutPreset::Stereo => &[(30.0, 0.0), (-30.0, 0.0)],
            LayoutPreset::Surround5_0 => &[
                (30.0, 0.0),
                (-30.0, 0.0),
                (0.0, 0.0),
                (110.0, 0.0),
                (-110.0, 0.0),
            ],
            LayoutPreset::Surround7_0 => &[
                (30.0, 0.0),
                (-30.0, 0.0),
                (0.0, 0.0),
                (90.0, 0.0),
                (-90.0, 0.0),
                (150.0, 0.0),
                (-150.0, 0.0),
            ],
            LayoutPreset::Surround7_0_4 => &[
                (30.0, 0.0),
                (-30.0, 0.0),
                (0.0, 0.0),
                (90.0, 0.0),
                (-90.0, 0.0),
                (150.0, 0.0),
                (-150.0, 0.0),
                (45.0, 45.0),
                (-45.0, 45.0),
                (135.0, 45.0),
                (-135.0, 45.0),
            ],
            LayoutPreset::Cube => &[
                (45.0, CUBE_ELEVATION),
                (135.0, CUBE_ELEVATION),
                (-135.0, CUBE_ELEVATION),
                (-45.0, CUBE_ELEVATION),
                (45.0, -CUBE_ELEVATION),
                (135.0, -CUBE_ELEVATION),
                (-135.0, -CUBE_ELEVATION),
                (-45.0, -CUBE_ELEVATION),
            ],
        };
        pairs.iter().map(|&pair| Direction::from(pair)).collect()
    }
}
