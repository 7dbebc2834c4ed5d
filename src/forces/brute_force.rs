use crate::error::Result;
use crate::shared::{ForceEvaluator, ParticleSnapshot, SimulationSettings};
use crate::vect::Vect;

use super::pairwise_acceleration;

/// Exhaustive O(n²) pairwise evaluation. Slow, but exact up to softening, so
/// it serves as the reference the tree evaluator is checked against.
#[derive(Clone, Copy, Debug, Default)]
pub struct BruteForce;

impl ForceEvaluator for BruteForce {
    fn accelerations(
        &self,
        bodies: &[ParticleSnapshot],
        settings: &SimulationSettings,
        out: &mut [Vect],
    ) -> Result<()> {
        debug_assert_eq!(bodies.len(), out.len());
        out.fill(Vect::zeros());

        for i in 0..bodies.len() {
            for j in 0..i {
                let (p, q) = (&bodies[i], &bodies[j]);
                out[i] += pairwise_acceleration(&p.position, &q.position, q.mass, settings);
                out[j] += pairwise_acceleration(&q.position, &p.position, p.mass, settings);
            }
        }
        Ok(())
    }
}
