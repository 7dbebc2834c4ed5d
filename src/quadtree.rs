//! Barnes-Hut quadtree over one stage's particle snapshots.
//!
//! Internal nodes and leaves live in two arenas owned by the tree and refer to
//! each other by index. A child slot is a [`Node`]: empty, a leaf, or another
//! internal node. The tree borrows the snapshot slice it was built from and is
//! dropped as a whole once the stage is done with it.

use smallvec::{SmallVec, smallvec};

use crate::bounds::BoundingBox;
use crate::error::{Result, SimulationError};
use crate::shared::{ParticleSnapshot, SimulationSettings};
use crate::vect::{Vect, VectExt};

pub type InternalId = usize;
pub type LeafId = usize;

const ROOT: InternalId = 0;

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Node {
    #[default]
    Empty,
    Leaf(LeafId),
    Internal(InternalId),
}

/// One or more snapshot indices. Several indices share a leaf only when they
/// were merged as near-coincident or at the depth limit.
#[derive(Clone, Debug)]
pub struct Leaf {
    bodies: SmallVec<[usize; 1]>,
    mass: f64,
    center_of_mass: Vect,
}

impl Leaf {
    fn new(index: usize, body: &ParticleSnapshot) -> Self {
        Self {
            bodies: smallvec![index],
            mass: body.mass,
            center_of_mass: body.position,
        }
    }

    fn merge(&mut self, index: usize, bodies: &[ParticleSnapshot]) {
        self.bodies.push(index);
        let (mass, center_of_mass) =
            aggregate(self.bodies.iter().map(|&i| (bodies[i].mass, bodies[i].position)));
        self.mass = mass;
        self.center_of_mass = center_of_mass.unwrap_or(self.center_of_mass);
    }

    pub fn bodies(&self) -> &[usize] {
        &self.bodies
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn center_of_mass(&self) -> Vect {
        self.center_of_mass
    }
}

#[derive(Clone, Debug)]
pub struct Internal {
    bounds: BoundingBox,
    mass: f64,
    center_of_mass: Vect,
    children: [Node; 4],
}

impl Internal {
    fn new(bounds: BoundingBox) -> Self {
        Self {
            bounds,
            mass: 0.0,
            center_of_mass: bounds.center(),
            children: [Node::Empty; 4],
        }
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn center_of_mass(&self) -> Vect {
        self.center_of_mass
    }

    /// Child slots indexed by [`crate::bounds::Quadrant::index`].
    pub fn children(&self) -> &[Node; 4] {
        &self.children
    }
}

/// Total mass and centroid of `(mass, position)` pairs. The centroid is
/// mass-weighted, falling back to the plain mean when the masses sum to
/// zero, and `None` when there are no members at all.
fn aggregate(members: impl IntoIterator<Item = (f64, Vect)>) -> (f64, Option<Vect>) {
    let mut mass = 0.0;
    let mut weighted = Vect::zeros();
    let mut plain = Vect::zeros();
    let mut count = 0usize;
    for (m, position) in members {
        mass += m;
        weighted += position * m;
        plain += position;
        count += 1;
    }
    let center_of_mass = match count {
        0 => None,
        _ if mass != 0.0 => Some(weighted / mass),
        _ => Some(plain / count as f64),
    };
    (mass, center_of_mass)
}

pub struct QuadTree<'a> {
    bodies: &'a [ParticleSnapshot],
    internals: Vec<Internal>,
    leaves: Vec<Leaf>,
    max_depth: usize,
    merge_distance2: f64,
}

impl<'a> QuadTree<'a> {
    /// Empty tree whose root covers `bounds`. Bodies are referenced by their
    /// index in `bodies` and added with [`QuadTree::insert`].
    pub fn new(
        bodies: &'a [ParticleSnapshot],
        bounds: BoundingBox,
        settings: &SimulationSettings,
    ) -> Self {
        let mut internals = Vec::with_capacity(bodies.len().max(1));
        internals.push(Internal::new(bounds));
        Self {
            bodies,
            internals,
            leaves: Vec::with_capacity(bodies.len()),
            max_depth: settings.max_depth,
            merge_distance2: settings.merge_distance * settings.merge_distance,
        }
    }

    /// Tree over every body, with a root box enclosing all of them.
    pub fn build(bodies: &'a [ParticleSnapshot], settings: &SimulationSettings) -> Result<Self> {
        let bounds = BoundingBox::enclosing(bodies.iter().map(|b| &b.position))?;
        let mut tree = Self::new(bodies, bounds, settings);
        for index in 0..bodies.len() {
            tree.insert(index)?;
        }
        Ok(tree)
    }

    /// Inserts `bodies[index]`. Positions outside the root box are rejected
    /// and leave the tree unchanged.
    pub fn insert(&mut self, index: usize) -> Result<()> {
        let Some(body) = self.bodies.get(index) else {
            return Err(SimulationError::ParticleNotFound {
                id: index,
                count: self.bodies.len(),
            });
        };
        if !self.bounds().contains(&body.position) {
            return Err(SimulationError::OutOfBounds {
                position: body.position,
            });
        }
        self.insert_into(ROOT, index, 0);
        Ok(())
    }

    fn insert_into(&mut self, id: InternalId, index: usize, depth: usize) {
        let position = self.bodies[index].position;
        let bounds = self.internals[id].bounds;
        let quadrant = bounds.quadrant_of(&position);

        let slot = self.internals[id].children[quadrant.index()];
        match slot {
            Node::Empty => {
                let leaf = self.leaves.len();
                self.leaves.push(Leaf::new(index, &self.bodies[index]));
                self.internals[id].children[quadrant.index()] = Node::Leaf(leaf);
            }
            Node::Internal(child) => self.insert_into(child, index, depth + 1),
            Node::Leaf(leaf) => {
                let coincident =
                    self.leaves[leaf].center_of_mass.dst_sq(&position) <= self.merge_distance2;
                if coincident || depth >= self.max_depth {
                    log::trace!(
                        "merging body {} into leaf {} at depth {} (coincident: {})",
                        index,
                        leaf,
                        depth,
                        coincident
                    );
                    self.leaves[leaf].merge(index, self.bodies);
                } else {
                    let sub = self.internals.len();
                    self.internals.push(Internal::new(bounds.sub_box(quadrant)));
                    self.internals[id].children[quadrant.index()] = Node::Internal(sub);
                    self.attach_leaf(sub, leaf);
                    self.insert_into(sub, index, depth + 1);
                }
            }
        }

        self.recalculate(id);
    }

    /// Moves an existing leaf into a freshly created, still empty internal node.
    fn attach_leaf(&mut self, id: InternalId, leaf: LeafId) {
        let quadrant = self.internals[id]
            .bounds
            .quadrant_of(&self.leaves[leaf].center_of_mass);
        self.internals[id].children[quadrant.index()] = Node::Leaf(leaf);
    }

    fn recalculate(&mut self, id: InternalId) {
        let members = self.internals[id]
            .children
            .iter()
            .filter_map(|child| self.aggregate_of(*child))
            .collect::<SmallVec<[(f64, Vect); 4]>>();
        let (mass, center_of_mass) = aggregate(members);
        let internal = &mut self.internals[id];
        internal.mass = mass;
        internal.center_of_mass = center_of_mass.unwrap_or(internal.bounds.center());
    }

    /// `(mass, center of mass)` of a slot, `None` for an empty one.
    pub fn aggregate_of(&self, node: Node) -> Option<(f64, Vect)> {
        match node {
            Node::Empty => None,
            Node::Leaf(leaf) => {
                let leaf = &self.leaves[leaf];
                Some((leaf.mass, leaf.center_of_mass))
            }
            Node::Internal(id) => {
                let internal = &self.internals[id];
                Some((internal.mass, internal.center_of_mass))
            }
        }
    }

    pub fn bodies(&self) -> &'a [ParticleSnapshot] {
        self.bodies
    }

    pub fn root(&self) -> Node {
        Node::Internal(ROOT)
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.internals[ROOT].bounds
    }

    pub fn mass(&self) -> f64 {
        self.internals[ROOT].mass
    }

    pub fn center_of_mass(&self) -> Vect {
        self.internals[ROOT].center_of_mass
    }

    pub fn internal(&self, id: InternalId) -> &Internal {
        &self.internals[id]
    }

    pub fn leaf(&self, id: LeafId) -> &Leaf {
        &self.leaves[id]
    }

    pub fn node_count(&self) -> usize {
        self.internals.len() + self.leaves.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    /// Depth of the deepest node; a tree holding only its root has depth 0.
    pub fn depth(&self) -> usize {
        self.iter().map(|(depth, _)| depth).max().unwrap_or(0)
    }

    /// Every body index stored under `node`.
    pub fn leaf_bodies(&self, node: Node) -> Vec<usize> {
        let mut bodies = Vec::new();
        let mut stack = vec![node];
        while let Some(node) = stack.pop() {
            match node {
                Node::Empty => {}
                Node::Leaf(leaf) => bodies.extend_from_slice(&self.leaves[leaf].bodies),
                Node::Internal(id) => stack.extend(self.internals[id].children.iter().copied()),
            }
        }
        bodies
    }

    /// Breadth-first walk over non-empty nodes, yielding `(depth, node)`.
    pub fn iter(&self) -> NodeIterator<'_, 'a> {
        NodeIterator {
            tree: self,
            current: vec![self.root()],
            next: Vec::new(),
            current_index: 0,
            current_depth: 0,
        }
    }
}

pub struct NodeIterator<'t, 'a> {
    tree: &'t QuadTree<'a>,
    current: Vec<Node>,
    next: Vec<Node>,
    current_index: usize,
    current_depth: usize,
}

impl Iterator for NodeIterator<'_, '_> {
    type Item = (usize, Node);

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_index < self.current.len() {
            let node = self.current[self.current_index];
            if let Node::Internal(id) = node {
                self.next.extend(
                    self.tree.internals[id]
                        .children
                        .iter()
                        .filter(|child| **child != Node::Empty),
                );
            }
            self.current_index += 1;
            Some((self.current_depth, node))
        } else if self.next.is_empty() {
            None
        } else {
            self.current = std::mem::take(&mut self.next);
            self.current_index = 0;
            self.current_depth += 1;
            self.next()
        }
    }
}

impl<'t, 'a> IntoIterator for &'t QuadTree<'a> {
    type Item = (usize, Node);
    type IntoIter = NodeIterator<'t, 'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
