use crate::error::Result;
use crate::shared::{ForceEvaluator, Integrator, Particle, ParticleSnapshot, SimulationSettings};
use crate::vect::Vect;

/// Velocity-Verlet (kick-drift-kick) leapfrog. Symplectic and second order,
/// with two evaluator passes per step.
#[derive(Clone, Debug, Default)]
pub struct LeapFrogIntegrator {
    bodies: Vec<ParticleSnapshot>,
    accelerations: Vec<Vect>,
    drifted: Vec<Particle>,
}

impl LeapFrogIntegrator {
    pub fn new() -> Self {
        Self::default()
    }

    fn evaluate<E: ForceEvaluator>(
        &mut self,
        particles: &[Particle],
        evaluator: &E,
        settings: &SimulationSettings,
    ) -> Result<()> {
        self.bodies.clear();
        self.bodies.extend(particles.iter().map(Particle::snapshot));
        self.accelerations.resize(particles.len(), Vect::zeros());
        evaluator.accelerations(&self.bodies, settings, &mut self.accelerations)
    }
}

impl Integrator for LeapFrogIntegrator {
    fn step<E: ForceEvaluator>(
        &mut self,
        particles: &mut [Particle],
        evaluator: &E,
        settings: &SimulationSettings,
        dt: f64,
    ) -> Result<()> {
        if particles.is_empty() {
            return Ok(());
        }
        let half_dt = 0.5 * dt;

        // A failed pass must leave `particles` untouched.
        self.evaluate(particles, evaluator, settings)?;
        let mut drifted = std::mem::take(&mut self.drifted);
        if drifted.len() == particles.len() {
            drifted.clone_from_slice(particles);
        } else {
            drifted.clear();
            drifted.extend_from_slice(particles);
        }
        for (particle, acceleration) in drifted.iter_mut().zip(self.accelerations.iter()) {
            particle.set_acceleration(*acceleration);
            particle.velocity += acceleration * half_dt;
            particle.position += particle.velocity * dt;
        }

        let result = self.evaluate(&drifted, evaluator, settings);
        if result.is_ok() {
            for (particle, acceleration) in drifted.iter_mut().zip(self.accelerations.iter()) {
                particle.velocity += acceleration * half_dt;
            }
            particles.clone_from_slice(&drifted);
        }
        self.drifted = drifted;
        result
    }
}
