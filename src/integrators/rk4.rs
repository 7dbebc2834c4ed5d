use crate::error::Result;
use crate::shared::{ForceEvaluator, Integrator, Particle, ParticleSnapshot, SimulationSettings};
use crate::vect::Vect;

const STAGES: usize = 4;

/// Classical 4th-order Runge-Kutta over positions and velocities.
///
/// Stage 0 is a copy of the canonical state. Stages 1 to 3 are estimated from
/// stage 0 with sub-steps `dt/2`, `dt/2` and `dt`, each using the previous
/// stage's velocity and the accelerations evaluated from the previous stage's
/// positions. Every stage gets its own evaluator pass, so a tree evaluator
/// rebuilds its tree four times per step.
///
/// The stage buffers are kept between steps and only resized when the
/// particle count changes; their contents carry no meaning across steps.
#[derive(Clone, Debug, Default)]
pub struct Rk4Integrator {
    stages: [Vec<ParticleSnapshot>; STAGES],
    accelerations: [Vec<Vect>; STAGES],
}

impl Rk4Integrator {
    pub fn new() -> Self {
        Self::default()
    }

    fn resize(&mut self, count: usize) {
        if self.stages[0].len() == count {
            return;
        }
        log::debug!("resizing rk4 stage buffers to {} particles", count);
        for stage in self.stages.iter_mut() {
            stage.resize(count, ParticleSnapshot::default());
        }
        for accelerations in self.accelerations.iter_mut() {
            accelerations.resize(count, Vect::zeros());
        }
    }

    /// Fills stage `k` from stage 0 and stage `k - 1` with sub-step `h`.
    fn estimate_stage(&mut self, k: usize, h: f64) {
        let (done, rest) = self.stages.split_at_mut(k);
        let (origin, previous) = (&done[0], &done[k - 1]);
        let accelerations = &self.accelerations[k - 1];
        for (i, next) in rest[0].iter_mut().enumerate() {
            *next = ParticleSnapshot {
                position: origin[i].position + previous[i].velocity * h,
                velocity: origin[i].velocity + accelerations[i] * h,
                mass: origin[i].mass,
            };
        }
    }

    fn apply_state(&self, particles: &mut [Particle], dt: f64) {
        let [s0, s1, s2, s3] = &self.stages;
        let [a0, a1, a2, a3] = &self.accelerations;
        let sixth = dt / 6.0;
        for (i, particle) in particles.iter_mut().enumerate() {
            let velocity = s0[i].velocity + 2.0 * (s1[i].velocity + s2[i].velocity) + s3[i].velocity;
            let acceleration = a0[i] + 2.0 * (a1[i] + a2[i]) + a3[i];
            particle.position = s0[i].position + velocity * sixth;
            particle.velocity = s0[i].velocity + acceleration * sixth;
            particle.set_acceleration(a0[i]);
        }
    }
}

impl Integrator for Rk4Integrator {
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
        self.resize(particles.len());

        for (snapshot, particle) in self.stages[0].iter_mut().zip(particles.iter()) {
            *snapshot = particle.snapshot();
        }

        let sub_steps = [dt / 2.0, dt / 2.0, dt];
        for k in 0..STAGES {
            evaluator.accelerations(&self.stages[k], settings, &mut self.accelerations[k])?;
            if let Some(&h) = sub_steps.get(k) {
                self.estimate_stage(k + 1, h);
            }
        }

        self.apply_state(particles, dt);
        Ok(())
    }
}
