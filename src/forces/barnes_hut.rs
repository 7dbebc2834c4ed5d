use rayon::prelude::*;
use smallvec::{SmallVec, smallvec};

use crate::error::{Result, SimulationError};
use crate::quadtree::{Node, QuadTree};
use crate::shared::{ForceEvaluator, ParticleSnapshot, SimulationSettings};
use crate::vect::Vect;

use super::pairwise_acceleration;

/// Tree evaluator: builds a fresh [`QuadTree`] over the snapshot on every
/// call and answers each body's query against it.
#[derive(Clone, Copy, Debug, Default)]
pub struct BarnesHut;

impl ForceEvaluator for BarnesHut {
    fn accelerations(
        &self,
        bodies: &[ParticleSnapshot],
        settings: &SimulationSettings,
        out: &mut [Vect],
    ) -> Result<()> {
        debug_assert_eq!(bodies.len(), out.len());
        if bodies.is_empty() {
            return Ok(());
        }

        let tree = QuadTree::build(bodies, settings)?;
        if settings.parallel {
            out.par_iter_mut()
                .enumerate()
                .try_for_each(|(i, acceleration)| -> Result<()> {
                    *acceleration = tree.acceleration(i, settings)?;
                    Ok(())
                })
        } else {
            for (i, acceleration) in out.iter_mut().enumerate() {
                *acceleration = tree.acceleration(i, settings)?;
            }
            Ok(())
        }
    }
}

impl QuadTree<'_> {
    fn body(&self, index: usize) -> Result<&ParticleSnapshot> {
        self.bodies()
            .get(index)
            .ok_or(SimulationError::ParticleNotFound {
                id: index,
                count: self.bodies().len(),
            })
    }

    /// Approximate acceleration of body `index` from every other body.
    pub fn acceleration(&self, index: usize, settings: &SimulationSettings) -> Result<Vect> {
        let body = self.body(index)?;
        Ok(self.acceleration_at(&body.position, Some(index), settings))
    }

    /// Approximate force on body `index`.
    pub fn force(&self, index: usize, settings: &SimulationSettings) -> Result<Vect> {
        let mass = self.body(index)?.mass;
        Ok(self.acceleration(index, settings)? * mass)
    }

    /// Opening-angle walk from the root. An internal node whose side length
    /// over its distance to `position` is below theta counts as one point
    /// mass at its center of mass; otherwise its children are visited. Leaf
    /// members equal to `exclude` are skipped.
    pub fn acceleration_at(
        &self,
        position: &Vect,
        exclude: Option<usize>,
        settings: &SimulationSettings,
    ) -> Vect {
        let theta2 = settings.theta2();
        let mut acceleration = Vect::zeros();
        let mut stack: SmallVec<[Node; 64]> = smallvec![self.root()];

        while let Some(node) = stack.pop() {
            match node {
                Node::Empty => {}
                Node::Leaf(id) => {
                    for &body in self.leaf(id).bodies() {
                        if Some(body) == exclude {
                            continue;
                        }
                        let source = &self.bodies()[body];
                        acceleration +=
                            pairwise_acceleration(position, &source.position, source.mass, settings);
                    }
                }
                Node::Internal(id) => {
                    let internal = self.internal(id);
                    let size = internal.bounds().size();
                    let com = internal.center_of_mass();
                    let dist2 = (com - position).norm_squared();
                    if size * size < theta2 * dist2 {
                        acceleration +=
                            pairwise_acceleration(position, &com, internal.mass(), settings);
                    } else {
                        stack.extend(internal.children().iter().copied());
                    }
                }
            }
        }
        acceleration
    }
}
