//! Axis-aligned bounding boxes and quadrant addressing.

use std::fmt;

use crate::error::{Result, SimulationError};
use crate::vect::Vect;

/// Relative padding added around points by [`BoundingBox::enclosing`], so
/// particles on the hull do not sit exactly on the root edges.
const ENCLOSING_PADDING: f64 = 1e-3;

/// One quarter of a box. Bit 0 marks west, bit 1 marks south.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Quadrant {
    NorthEast = 0,
    NorthWest = 1,
    SouthEast = 2,
    SouthWest = 3,
}

impl Quadrant {
    const WEST: u8 = 1;
    const SOUTH: u8 = 2;

    pub const ALL: [Quadrant; 4] = [
        Quadrant::NorthEast,
        Quadrant::NorthWest,
        Quadrant::SouthEast,
        Quadrant::SouthWest,
    ];

    /// Quadrant of `point` relative to `center`. Points on a center line go
    /// east (on the vertical line) or north (on the horizontal line).
    pub fn of(center: &Vect, point: &Vect) -> Quadrant {
        let mut code = 0;
        if point.x < center.x {
            code |= Self::WEST;
        }
        if point.y < center.y {
            code |= Self::SOUTH;
        }
        Self::from_bits(code)
    }

    fn from_bits(code: u8) -> Quadrant {
        match code & 0b11 {
            0 => Quadrant::NorthEast,
            1 => Quadrant::NorthWest,
            2 => Quadrant::SouthEast,
            _ => Quadrant::SouthWest,
        }
    }

    pub fn bits(self) -> u8 {
        self as u8
    }

    /// Slot index in a node's child array.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_west(self) -> bool {
        self.bits() & Self::WEST != 0
    }

    pub fn is_south(self) -> bool {
        self.bits() & Self::SOUTH != 0
    }

    /// Diagonal pointing from a box center into this quadrant.
    pub fn sign(self) -> Vect {
        Vect::new(
            if self.is_west() { -1.0 } else { 1.0 },
            if self.is_south() { -1.0 } else { 1.0 },
        )
    }
}

impl TryFrom<u8> for Quadrant {
    type Error = SimulationError;

    fn try_from(code: u8) -> Result<Self> {
        if code > 0b11 {
            return Err(SimulationError::InvalidQuadrant(code));
        }
        Ok(Self::from_bits(code))
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ns = if self.is_south() { "South" } else { "North" };
        let ew = if self.is_west() { "West" } else { "East" };
        write!(f, "{}{}", ns, ew)
    }
}

/// Axis-aligned box stored as its minimum and maximum corners. Both extents
/// are strictly positive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    min: Vect,
    max: Vect,
}

impl BoundingBox {
    /// Box spanned by two opposite corners, in any order.
    pub fn new(a: Vect, b: Vect) -> Result<Self> {
        let min = Vect::new(a.x.min(b.x), a.y.min(b.y));
        let max = Vect::new(a.x.max(b.x), a.y.max(b.y));
        let finite = min.iter().chain(max.iter()).all(|c| c.is_finite());
        if !finite || min.x >= max.x || min.y >= max.y {
            return Err(SimulationError::DegenerateGeometry {
                min: a.inf(&b),
                max: a.sup(&b),
            });
        }
        Ok(Self { min, max })
    }

    /// Square of side `2 * half_size` around `center`. The half size must be
    /// strictly positive.
    pub fn square(center: Vect, half_size: f64) -> Result<Self> {
        let half = Vect::new(half_size, half_size);
        if !(half_size > 0.0) {
            return Err(SimulationError::DegenerateGeometry {
                min: center - half,
                max: center + half,
            });
        }
        Self::new(center - half, center + half)
    }

    /// Smallest padded square containing every point. A set spanning no
    /// area (empty, one point, all coincident) gets a unit half-size.
    pub fn enclosing<'a>(points: impl IntoIterator<Item = &'a Vect>) -> Result<Self> {
        let mut points = points.into_iter();
        let Some(first) = points.next() else {
            return Self::square(Vect::zeros(), 1.0);
        };
        let (min, max) = points.fold((*first, *first), |(min, max), p| (min.inf(p), max.sup(p)));
        // Halved before subtracting so far-apart finite points cannot overflow.
        let half_extent = 0.5 * max - 0.5 * min;
        let half = half_extent.x.max(half_extent.y) * (1.0 + ENCLOSING_PADDING);
        let half = if half > 0.0 { half } else { 1.0 };
        Self::square(0.5 * min + 0.5 * max, half)
    }

    pub fn min(&self) -> Vect {
        self.min
    }

    pub fn max(&self) -> Vect {
        self.max
    }

    pub fn center(&self) -> Vect {
        0.5 * self.min + 0.5 * self.max
    }

    /// Side length. Tree boxes are square, so the horizontal extent is used.
    pub fn size(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Closed containment test.
    pub fn contains(&self, point: &Vect) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    pub fn quadrant_of(&self, point: &Vect) -> Quadrant {
        Quadrant::of(&self.center(), point)
    }

    /// Exact quarter of the box covering `quadrant`. The four quarters share
    /// the center point, so they tile the parent with no gaps or overlaps.
    pub fn sub_box(&self, quadrant: Quadrant) -> BoundingBox {
        let c = self.center();
        let (min_x, max_x) = if quadrant.is_west() {
            (self.min.x, c.x)
        } else {
            (c.x, self.max.x)
        };
        let (min_y, max_y) = if quadrant.is_south() {
            (self.min.y, c.y)
        } else {
            (c.y, self.max.y)
        };
        BoundingBox {
            min: Vect::new(min_x, min_y),
            max: Vect::new(max_x, max_y),
        }
    }
}
