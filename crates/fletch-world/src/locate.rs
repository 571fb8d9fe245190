use fletch_core::{GridError, Vector3};

use crate::{ObservationRadius, VoxelGrid};

/// Horizontal offset of the agent inside its block. The agent is assumed to
/// stand at the centre of the block containing it.
const AGENT_OFFSET: f64 = 0.5;

/// Find the first cell holding `block` and return its position relative to
/// the agent.
///
/// Horizontal coordinates are measured from the centre of the agent's block,
/// the vertical one from the agent's footing. With `center` set, x and z point
/// at the middle of the target block, otherwise at its north-west corner.
///
/// Returns `Ok(None)` when the block is not in view, which is routine: the
/// caller should simply try again with the next snapshot.
pub fn locate(grid: &VoxelGrid, block: &str, center: bool) -> Result<Option<Vector3>, GridError> {
    let radius = grid.radius();
    radius.ensure_square()?;

    let Some(offset) = grid.cells().iter().position(|cell| cell == block) else {
        log::debug!("No {} in view", block);
        return Ok(None);
    };
    let (x, y, z) = grid.decompose(offset)?;
    let position = to_relative(radius, x, y, z, center);
    log::debug!(
        "Located {} at offset {} -> relative ({:.2}, {:.2}, {:.2})",
        block,
        offset,
        position.x,
        position.y,
        position.z
    );
    Ok(Some(position))
}

/// Convert an absolute grid coordinate to a position relative to the agent.
pub fn to_relative(radius: ObservationRadius, x: usize, y: usize, z: usize, center: bool) -> Vector3 {
    let bias = if center { 0.5 } else { 0.0 };
    Vector3::new(
        x as f64 + bias - radius.x as f64 - AGENT_OFFSET,
        y as f64 - radius.y as f64,
        z as f64 + bias - radius.z as f64 - AGENT_OFFSET,
    )
}

/// The absolute grid coordinate of the block containing a relative position.
pub fn to_absolute(radius: ObservationRadius, position: &Vector3) -> (i64, i64, i64) {
    (
        cell_index(position.x, radius.x),
        position.y.floor() as i64 + radius.y as i64,
        cell_index(position.z, radius.z),
    )
}

/// Grid index along a horizontal axis of the cell containing a relative
/// coordinate.
pub fn cell_index(relative: f64, radius: usize) -> i64 {
    (relative + AGENT_OFFSET).floor() as i64 + radius as i64
}
