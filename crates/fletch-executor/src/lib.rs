//! Turns world snapshots into shots.
//!
//! The [`Targeter`] works out a [`TargetingPlan`] for the target block in a
//! snapshot, a [`ShotCycle`] then aims and fires it through a
//! [`CommandSink`], one tick at a time. [`ShotStats`] tallies how the shots
//! of any [`Aim`](fletch_ballistics::Aim) turn out in simulation.

mod command;
mod control;
mod shot_cycle;
mod stats;
mod targeter;

pub use command::*;
pub use control::*;
pub use shot_cycle::*;
pub use stats::*;
pub use targeter::*;
