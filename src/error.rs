//! Error types for the simulation core.
//!
//! Every error here is a caller-input error. Numeric degeneracy in the force
//! law (near-zero separation) is absorbed by softening and never reported.

use std::fmt;

use crate::shared::ParticleId;
use crate::vect::Vect;

#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// A quadrant code outside `0..4`.
    InvalidQuadrant(u8),
    /// Particle id is not in `[0, count)`.
    ParticleNotFound { id: ParticleId, count: usize },
    /// Bounding box with non-positive (or non-finite) extent on some axis.
    DegenerateGeometry { min: Vect, max: Vect },
    /// Tried to insert a position the tree's root box does not contain.
    OutOfBounds { position: Vect },
    /// A simulation setting outside its valid range.
    InvalidSetting { name: &'static str, value: f64 },
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::InvalidQuadrant(code) => write!(f, "bad quadrant: {}", code),
            SimulationError::ParticleNotFound { id, count } => {
                write!(f, "particle #{} not found ({} particles)", id, count)
            }
            SimulationError::DegenerateGeometry { min, max } => write!(
                f,
                "degenerate bounding box ({}, {}) - ({}, {})",
                min.x, min.y, max.x, max.y
            ),
            SimulationError::OutOfBounds { position } => write!(
                f,
                "position ({}, {}) lies outside the tree bounds",
                position.x, position.y
            ),
            SimulationError::InvalidSetting { name, value } => {
                write!(f, "invalid value for setting `{}`: {}", name, value)
            }
        }
    }
}

impl std::error::Error for SimulationError {}

pub type Result<T> = std::result::Result<T, SimulationError>;
