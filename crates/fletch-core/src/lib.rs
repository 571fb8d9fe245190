mod angle;
mod error;
mod geom;
mod settings;

pub use angle::*;
pub use error::*;
pub use geom::*;
pub use settings::*;

pub type Vector2 = nalgebra::Vector2<f64>;
pub type Vector3 = nalgebra::Vector3<f64>;

/// Block id of empty space in a grid observation.
pub const AIR: &str = "air";
/// Block id of water in a grid observation.
pub const WATER: &str = "water";
/// Block id of lava in a grid observation.
pub const LAVA: &str = "lava";

/// Whether a block id names a liquid that cannot be stood on.
pub fn is_liquid(block: &str) -> bool {
    block == WATER || block == LAVA
}
