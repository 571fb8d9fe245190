use thiserror::Error;

/// Failures when reading geometry out of a voxel grid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error(
        "absolute coordinates cannot be negative, got ({x}, {y}, {z}); were relative coordinates passed?"
    )]
    InvalidCoordinate { x: i64, y: i64, z: i64 },
    #[error("offset {offset} is outside a grid of {len} cells")]
    OutOfBounds { offset: usize, len: usize },
    #[error("observed area must be square, got x radius {x} and z radius {z}")]
    NonSquareGrid { x: usize, z: usize },
    #[error("grid holds {actual} cells but its radii describe {expected}")]
    SizeMismatch { expected: usize, actual: usize },
}
