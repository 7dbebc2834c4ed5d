//! Two-dimensional vector primitive.
//!
//! Arithmetic, `dot`, `norm` and `norm_squared` come straight from nalgebra;
//! [`VectExt`] adds the handful of helpers the tree and force code lean on.

use nalgebra::Vector2;

pub type Vect = Vector2<f64>;

pub trait VectExt {
    /// Unit vector in the same direction. The zero vector maps to itself
    /// instead of producing NaN components.
    fn unit(&self) -> Vect;

    /// Distance between `self` and `other`.
    fn dst(&self, other: &Vect) -> f64;

    /// Squared distance between `self` and `other`.
    fn dst_sq(&self, other: &Vect) -> f64;
}

impl VectExt for Vect {
    fn unit(&self) -> Vect {
        self.try_normalize(0.0).unwrap_or_else(Vect::zeros)
    }

    fn dst(&self, other: &Vect) -> f64 {
        (self - other).norm()
    }

    fn dst_sq(&self, other: &Vect) -> f64 {
        (self - other).norm_squared()
    }
}
