//! Reading shot geometry out of a grid observation.
//!
//! A [`WorldSnapshot`] arrives from the host as JSON and is turned into a
//! [`VoxelGrid`]. From there the target block is located relative to the
//! agent, the line of fire is rasterized across the horizontal plane, and
//! every solid column along it becomes an [`Obstacle`](fletch_core::Obstacle)
//! in the vertical shot plane.

mod grid;
mod locate;
mod obstacles;
mod raster;
mod snapshot;
mod spawn;

pub use grid::*;
pub use locate::*;
pub use obstacles::*;
pub use raster::*;
pub use snapshot::*;
pub use spawn::*;
