//! Gravitational n-body simulation in the plane: Barnes-Hut quadtree force
//! approximation integrated with classical RK4.

pub mod bounds;
pub mod error;
pub mod forces;
pub mod integrators;
pub mod quadtree;
pub mod shared;
pub mod space;
pub mod vect;

pub use error::SimulationError;
pub use shared::{Particle, ParticleId, Simulation, SimulationSettings};
pub use space::{BarnesHutSpace, BruteForceSpace, LeapFrogSpace, Space};
pub use vect::{Vect, VectExt};
