use std::fmt::{Display, Formatter};

/// Error type for layout validation and gain-table computation.
///
/// A layout that triangulates to nothing is not an error: builders report it
/// as `Ok(None)`.
#[derive(Debug, Clone, PartialEq)]
pub enum VbapError {
    TooFewLoudspeakers { required: usize, found: usize },
    InvalidDirection { index: usize, azimuth: f32, elevation: f32 },
    InvalidResolution { azimuth: f32, elevation: f32 },
    InvalidSpread(f32),
    DimensionMismatch { expected: usize, found: usize },
    SingularMatrix { group: usize },
    InvalidArgument(String),
}

impl Display for VbapError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooFewLoudspeakers { required, found } => write!(
                f,
                "layout needs at least {} loudspeakers, found {}",
                required, found
            ),
            Self::InvalidDirection {
                index,
                azimuth,
                elevation,
            } => write!(
                f,
                "invalid direction at index {}: azimuth {}, elevation {}",
                index, azimuth, elevation
            ),
            Self::InvalidResolution { azimuth, elevation } => write!(
                f,
                "invalid grid resolution: azimuth {}, elevation {}",
                azimuth, elevation
            ),
            Self::InvalidSpread(spread) => write!(f, "invalid spread: {}", spread),
            Self::DimensionMismatch { expected, found } => {
                write!(f, "dimension mismatch: expected {}, found {}", expected, found)
            }
            Self::SingularMatrix { group } => {
                write!(f, "loudspeaker group {} has a singular matrix", group)
            }
            Self::InvalidArgument(err) => write!(f, "invalid argument: {}", err),
        }
    }
}

impl std::error::Error for VbapError {}
