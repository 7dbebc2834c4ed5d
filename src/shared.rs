// This file defines the particle contract and the traits the force and integration
// strategies plug into.

use std::fmt;

use crate::error::{Result, SimulationError};
use crate::vect::Vect;

/// Gravitational constant in SI units, for callers that want physical units.
pub const GRAVITATIONAL_CONSTANT: f64 = 6.67384e-11;

pub type ParticleId = usize;

/// A canonical particle owned by a simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    id: ParticleId,
    pub position: Vect,
    pub velocity: Vect,
    acceleration: Vect,
    mass: f64,
    inverse_mass: f64,
}

impl Particle {
    pub(crate) fn new(id: ParticleId, mass: f64) -> Self {
        let mut particle = Self {
            id,
            position: Vect::zeros(),
            velocity: Vect::zeros(),
            acceleration: Vect::zeros(),
            mass: 0.0,
            inverse_mass: 0.0,
        };
        particle.set_mass(mass);
        particle
    }

    pub fn id(&self) -> ParticleId {
        self.id
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Sets the mass and refreshes the cached inverse. A massless particle
    /// has an inverse mass of zero, so impulses leave it untouched.
    pub fn set_mass(&mut self, mass: f64) {
        self.mass = mass;
        self.inverse_mass = if mass != 0.0 { 1.0 / mass } else { 0.0 };
    }

    pub fn inverse_mass(&self) -> f64 {
        self.inverse_mass
    }

    /// Acceleration observed at the start of the most recent step.
    pub fn acceleration(&self) -> Vect {
        self.acceleration
    }

    pub(crate) fn set_acceleration(&mut self, acceleration: Vect) {
        self.acceleration = acceleration;
    }

    pub fn momentum(&self) -> Vect {
        self.velocity * self.mass
    }

    pub fn apply_impulse(&mut self, impulse: Vect) {
        self.velocity += impulse * self.inverse_mass;
    }

    pub(crate) fn snapshot(&self) -> ParticleSnapshot {
        ParticleSnapshot {
            position: self.position,
            velocity: self.velocity,
            mass: self.mass,
        }
    }
}

impl fmt::Display for Particle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:4}; X({:2.4}, {:2.4}); V({:2.4}, {:2.4}); M = {}",
            self.id, self.position.x, self.position.y, self.velocity.x, self.velocity.y, self.mass
        )
    }
}

/// Transient copy of a particle's state used inside one integration stage.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ParticleSnapshot {
    pub position: Vect,
    pub velocity: Vect,
    pub mass: f64,
}

impl ParticleSnapshot {
    pub fn new(position: Vect, velocity: Vect, mass: f64) -> Self {
        Self {
            position,
            velocity,
            mass,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SimulationSettings {
    /// Gravitational constant; units are up to the caller.
    pub g: f64,
    /// Pairs closer than this exert no force on each other.
    pub softening: f64,
    /// Barnes-Hut opening angle. Zero forces exact pairwise evaluation.
    pub theta: f64,
    /// Deepest level a tree may subdivide to before leaves start merging.
    pub max_depth: usize,
    /// Particles within this distance of a leaf merge into it.
    pub merge_distance: f64,
    /// Run per-particle force queries on the rayon pool.
    pub parallel: bool,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            g: 1.0,
            softening: 2e-3,
            theta: 0.5,
            max_depth: 32,
            merge_distance: 0.0,
            parallel: false,
        }
    }
}

impl SimulationSettings {
    pub fn theta2(&self) -> f64 {
        self.theta * self.theta
    }

    pub fn softening2(&self) -> f64 {
        self.softening * self.softening
    }

    pub fn validate(&self) -> Result<()> {
        let non_negative = [
            ("g", self.g),
            ("softening", self.softening),
            ("theta", self.theta),
            ("merge_distance", self.merge_distance),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(SimulationError::InvalidSetting { name, value });
            }
        }
        if self.max_depth == 0 {
            return Err(SimulationError::InvalidSetting {
                name: "max_depth",
                value: 0.0,
            });
        }
        Ok(())
    }
}

/// Computes the acceleration of every body in a stage snapshot.
pub trait ForceEvaluator {
    fn accelerations(
        &self,
        bodies: &[ParticleSnapshot],
        settings: &SimulationSettings,
        out: &mut [Vect],
    ) -> Result<()>;
}

/// Advances canonical particle state by one time step.
pub trait Integrator {
    fn step<E: ForceEvaluator>(
        &mut self,
        particles: &mut [Particle],
        evaluator: &E,
        settings: &SimulationSettings,
        dt: f64,
    ) -> Result<()>;
}

/// The contract rendering and driver code consume.
pub trait Simulation {
    fn add_particle(&mut self, mass: f64) -> ParticleId;
    fn particle(&self, id: ParticleId) -> Result<&Particle>;
    fn particle_mut(&mut self, id: ParticleId) -> Result<&mut Particle>;
    fn particles(&self) -> &[Particle];
    fn particle_count(&self) -> usize;
    fn step(&mut self, dt: f64) -> Result<()>;
    fn time(&self) -> f64;
    fn settings(&self) -> &SimulationSettings;
    fn settings_mut(&mut self) -> &mut SimulationSettings;
}
