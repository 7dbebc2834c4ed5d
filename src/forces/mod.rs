mod barnes_hut;
mod brute_force;

pub use barnes_hut::*;
pub use brute_force::*;

use crate::shared::SimulationSettings;
use crate::vect::{Vect, VectExt};

/// Acceleration felt at `position` from a point mass at `source`, pointing
/// toward the source. Pairs closer than the softening distance, or exactly
/// coincident, contribute nothing.
pub fn pairwise_acceleration(
    position: &Vect,
    source: &Vect,
    source_mass: f64,
    settings: &SimulationSettings,
) -> Vect {
    let delta = source - position;
    let dist2 = delta.norm_squared();
    if dist2 == 0.0 || dist2 < settings.softening2() {
        return Vect::zeros();
    }
    delta.unit() * (settings.g * source_mass / dist2)
}

/// Force of magnitude `G·m1·m2/d²` on a body of mass `mass` at `position`.
pub fn pairwise_force(
    position: &Vect,
    mass: f64,
    source: &Vect,
    source_mass: f64,
    settings: &SimulationSettings,
) -> Vect {
    pairwise_acceleration(position, source, source_mass, settings) * mass
}
