//! Arrow flight model and the inverse solver built on it.
//!
//! The model is a discrete, per-tick integration in the vertical plane that
//! contains the shooter and the target: both velocity components are damped
//! by a constant drag factor every tick and gravity is subtracted from the
//! vertical one. Collisions are checked between consecutive trajectory
//! samples, so a shot is a polyline tested against vertical segments.

mod estimate;
mod simulator;
mod solver;

pub use estimate::*;
pub use simulator::*;
pub use solver::*;

/// Initial arrow speed, in blocks per tick, for a bow drawn for `power`
/// seconds.
pub fn launch_speed(power: f64) -> f64 {
    2.0 * power + power * power
}
