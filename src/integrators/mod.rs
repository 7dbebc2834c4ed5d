mod leapfrog;
mod rk4;

pub use leapfrog::*;
pub use rk4::*;
