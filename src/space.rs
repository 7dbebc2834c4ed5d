use crate::error::{Result, SimulationError};
use crate::forces::{BarnesHut, BruteForce};
use crate::integrators::{LeapFrogIntegrator, Rk4Integrator};
use crate::shared::{
    ForceEvaluator, Integrator, Particle, ParticleId, Simulation, SimulationSettings,
};

pub type BarnesHutSpace = Space<BarnesHut, Rk4Integrator>;
pub type BruteForceSpace = Space<BruteForce, Rk4Integrator>;
pub type LeapFrogSpace = Space<BarnesHut, LeapFrogIntegrator>;

/// A simulation space: the canonical particles plus the force and
/// integration strategies that advance them.
///
/// Particles are append-only. Their ids are insertion indices and are never
/// reused; there is no removal.
#[derive(Clone, Debug, Default)]
pub struct Space<E = BarnesHut, I = Rk4Integrator>
where
    E: ForceEvaluator,
    I: Integrator,
{
    particles: Vec<Particle>,
    evaluator: E,
    integrator: I,
    settings: SimulationSettings,
    time: f64,
}

impl<E, I> Space<E, I>
where
    E: ForceEvaluator,
    I: Integrator,
{
    pub fn new(evaluator: E, integrator: I) -> Self {
        Self {
            particles: Vec::new(),
            evaluator,
            integrator,
            settings: SimulationSettings::default(),
            time: 0.0,
        }
    }

    pub fn with_settings(mut self, settings: SimulationSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    pub fn integrator(&self) -> &I {
        &self.integrator
    }

    fn not_found(&self, id: ParticleId) -> SimulationError {
        SimulationError::ParticleNotFound {
            id,
            count: self.particles.len(),
        }
    }
}

impl<E, I> Simulation for Space<E, I>
where
    E: ForceEvaluator,
    I: Integrator,
{
    fn add_particle(&mut self, mass: f64) -> ParticleId {
        let id = self.particles.len();
        self.particles.push(Particle::new(id, mass));
        id
    }

    fn particle(&self, id: ParticleId) -> Result<&Particle> {
        self.particles.get(id).ok_or_else(|| self.not_found(id))
    }

    fn particle_mut(&mut self, id: ParticleId) -> Result<&mut Particle> {
        let count = self.particles.len();
        self.particles
            .get_mut(id)
            .ok_or(SimulationError::ParticleNotFound { id, count })
    }

    fn particles(&self) -> &[Particle] {
        &self.particles
    }

    fn particle_count(&self) -> usize {
        self.particles.len()
    }

    /// Advances every particle by `dt` and then the clock. On error nothing
    /// changes, time included.
    fn step(&mut self, dt: f64) -> Result<()> {
        self.settings.validate()?;
        if !dt.is_finite() {
            return Err(SimulationError::InvalidSetting {
                name: "dt",
                value: dt,
            });
        }

        if let Err(err) =
            self.integrator
                .step(&mut self.particles, &self.evaluator, &self.settings, dt)
        {
            log::warn!("step of {} at t = {} rejected: {}", dt, self.time, err);
            return Err(err);
        }
        self.time += dt;
        log::debug!(
            "stepped {} particles by {} to t = {}",
            self.particles.len(),
            dt,
            self.time
        );
        Ok(())
    }

    fn time(&self) -> f64 {
        self.time
    }

    fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut SimulationSettings {
        &mut self.settings
    }
}
