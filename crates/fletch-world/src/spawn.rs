use fletch_core::{GridError, Vector3};
use rand::Rng;

use crate::VoxelGrid;

/// Pick a random column in view with solid, dry footing and return the
/// absolute position an agent could be placed at on top of it.
///
/// Up to `tries` columns are sampled. Returns `Ok(None)` if none of them had
/// footing. With `center` set the position is moved to the middle of the
/// block.
pub fn find_spawn(
    grid: &VoxelGrid,
    rng: &mut impl Rng,
    tries: usize,
    center: bool,
) -> Result<Option<Vector3>, GridError> {
    let radius = grid.radius();
    radius.ensure_square()?;
    let ob = radius.x as i64;

    for _ in 0..tries {
        let rx = rng.gen_range(-ob..=ob);
        let rz = rng.gen_range(-ob..=ob);
        let Some(ry) = grid.first_solid_footing_above(rx + ob, rz + ob)? else {
            continue;
        };
        let bias = if center { 0.5 } else { 0.0 };
        let origin = grid.origin();
        let spawn = Vector3::new(
            origin.x.floor() + rx as f64 + bias,
            origin.y + ry as f64,
            origin.z.floor() + rz as f64 + bias,
        );
        log::debug!("Found spawn at {:?}", spawn);
        return Ok(Some(spawn));
    }
    Ok(None)
}

/// Like [`find_spawn`], but only accepts spawns within `max_offset` blocks
/// (on both horizontal axes) of the absolute column `(anchor_x, anchor_z)`.
///
/// Gives up after `attempts` rounds of [`find_spawn`].
pub fn find_spawn_near(
    grid: &VoxelGrid,
    rng: &mut impl Rng,
    anchor_x: f64,
    anchor_z: f64,
    max_offset: f64,
    attempts: usize,
) -> Result<Option<Vector3>, GridError> {
    for _ in 0..attempts {
        if let Some(spawn) = find_spawn(grid, rng, 10, true)? {
            if (spawn.x - anchor_x).abs() <= max_offset && (spawn.z - anchor_z).abs() <= max_offset
            {
                return Ok(Some(spawn));
            }
        }
    }
    log::warn!(
        "No spawn within {} blocks of ({}, {}) after {} attempts",
        max_offset,
        anchor_x,
        anchor_z,
        attempts
    );
    Ok(None)
}
