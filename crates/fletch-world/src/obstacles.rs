use fletch_core::{GridError, Obstacle};

use crate::{RasterCell, VoxelGrid};

/// Turn the rasterized line of fire into obstacle silhouettes.
///
/// For every cell the column is scanned from the top of the grid down. The
/// first non-air block is the top of that column's obstacle, which reaches
/// down to the bottom of the grid. A column whose first block is the target
/// itself produces nothing, and empty columns produce nothing. Obstacles keep
/// the order of `cells`.
pub fn profile(
    grid: &VoxelGrid,
    cells: &[RasterCell],
    target_block: &str,
) -> Result<Vec<Obstacle>, GridError> {
    let radius = grid.radius();
    radius.ensure_square()?;
    let (obx, oby) = (radius.x as f64, radius.y as f64);

    let mut obstacles = Vec::with_capacity(cells.len());
    for cell in cells {
        let Some((block, top)) = grid.column_top(cell.x, cell.z)? else {
            continue;
        };
        if block == target_block {
            continue;
        }
        let distance = ((cell.x as f64 - obx).powi(2) + (cell.z as f64 - obx).powi(2)).sqrt();
        obstacles.push(Obstacle::new(distance, -oby, top as f64));
    }
    log::debug!(
        "{} obstacles along {} cells of the line of fire",
        obstacles.len(),
        cells.len()
    );
    Ok(obstacles)
}
