use crate::cell_index;

/// One horizontal grid cell touched by the line of fire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterCell {
    /// Absolute grid x.
    pub x: i64,
    /// Absolute grid z.
    pub z: i64,
    /// How much of the cell the anti-aliased line covers, in (0, 1].
    pub coverage: f64,
}

/// Rasterize the line of fire from the agent's cell to the cell containing the
/// relative target position `(target_x, target_z)`.
///
/// The line is drawn with an anti-aliased Bresenham variant, so cells the line
/// only grazes are reported as well. Cells come out in the order the line
/// visits them, starting at the agent. The same cell may appear more than
/// once; consumers must tolerate that. Cells that fall outside the observed
/// square are dropped.
pub fn rasterize(obx: usize, obz: usize, target_x: f64, target_z: f64) -> Vec<RasterCell> {
    let (x0, z0) = (obx as i64, obz as i64);
    let (x1, z1) = (cell_index(target_x, obx), cell_index(target_z, obz));
    let in_view = |x: i64, z: i64| x >= 0 && z >= 0 && x <= 2 * obx as i64 && z <= 2 * obz as i64;

    line_aa(x0, z0, x1, z1)
        .into_iter()
        .filter(|cell| cell.coverage > 0.0 && in_view(cell.x, cell.z))
        .collect()
}

/// Anti-aliased line between two cells, including cells with zero coverage.
fn line_aa(x0: i64, z0: i64, x1: i64, z1: i64) -> Vec<RasterCell> {
    let dx = (x0 - x1).abs();
    let dz = (z0 - z1).abs();
    let step_x = if x0 < x1 { 1 } else { -1 };
    let step_z = if z0 < z1 { 1 } else { -1 };
    let length = if dx + dz == 0 {
        1.0
    } else {
        ((dx * dx + dz * dz) as f64).sqrt()
    };
    let (dx_f, dz_f) = (dx as f64, dz as f64);

    let mut cells = Vec::new();
    let mut push = |x: i64, z: i64, distance: f64| {
        cells.push(RasterCell {
            x,
            z,
            coverage: 1.0 - distance / length,
        })
    };

    let mut err = dx_f - dz_f;
    let (mut x, mut z) = (x0, z0);
    loop {
        push(x, z, (err - dx_f + dz_f).abs());

        let prev_err = err;
        let prev_x = x;

        if 2.0 * prev_err >= -dx_f {
            if x == x1 {
                break;
            }
            if prev_err + dz_f < length {
                push(x, z + step_z, (prev_err + dz_f).abs());
            }
            err -= dz_f;
            x += step_x;
        }

        if 2.0 * prev_err <= dz_f {
            if z == z1 {
                break;
            }
            if dx_f - prev_err < length {
                push(prev_x + step_x, z, (dx_f - prev_err).abs());
            }
            err += dx_f;
            z += step_z;
        }
    }
    cells
}
