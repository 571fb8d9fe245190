use fletch_core::{is_liquid, GridError, Vector3, AIR};
use serde::{Deserialize, Serialize};

/// How far the observed cube extends from the agent along each axis.
///
/// A radius of 25 on x means 25 blocks on either side of the agent, so the
/// grid is 51 blocks wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationRadius {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl ObservationRadius {
    pub fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }

    pub fn side_x(&self) -> usize {
        2 * self.x + 1
    }

    pub fn side_y(&self) -> usize {
        2 * self.y + 1
    }

    pub fn side_z(&self) -> usize {
        2 * self.z + 1
    }

    /// Number of cells in the flattened observation.
    pub fn cell_count(&self) -> usize {
        self.side_x() * self.side_y() * self.side_z()
    }

    /// Fails unless the observed area is square in x and z.
    pub fn ensure_square(&self) -> Result<(), GridError> {
        if self.x != self.z {
            return Err(GridError::NonSquareGrid {
                x: self.x,
                z: self.z,
            });
        }
        Ok(())
    }
}

/// An immutable grid observation around the agent.
///
/// Cells are stored with y as the major axis, then z, then x, which is the
/// order the host serializes them in. Grid coordinates are absolute: `(0, 0,
/// 0)` is the lowest north-west corner of the observed cube and the agent's
/// feet are at `(radius.x, radius.y, radius.z)`.
#[derive(Debug, Clone, PartialEq)]
pub struct VoxelGrid {
    cells: Vec<String>,
    radius: ObservationRadius,
    origin: Vector3,
}

impl VoxelGrid {
    /// Wrap a flattened observation, checking that its size matches the radii.
    pub fn new(
        cells: Vec<String>,
        radius: ObservationRadius,
        origin: Vector3,
    ) -> Result<Self, GridError> {
        let expected = radius.cell_count();
        if cells.len() != expected {
            return Err(GridError::SizeMismatch {
                expected,
                actual: cells.len(),
            });
        }
        Ok(Self {
            cells,
            radius,
            origin,
        })
    }

    /// Build a grid by asking `block` for the id at every absolute coordinate.
    pub fn from_fn(
        radius: ObservationRadius,
        origin: Vector3,
        mut block: impl FnMut(usize, usize, usize) -> String,
    ) -> Self {
        let mut cells = Vec::with_capacity(radius.cell_count());
        for y in 0..radius.side_y() {
            for z in 0..radius.side_z() {
                for x in 0..radius.side_x() {
                    cells.push(block(x, y, z));
                }
            }
        }
        Self {
            cells,
            radius,
            origin,
        }
    }

    pub fn radius(&self) -> ObservationRadius {
        self.radius
    }

    /// Absolute position of the agent when the observation was taken.
    pub fn origin(&self) -> Vector3 {
        self.origin
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    /// Linear offset of an absolute coordinate in the flattened buffer.
    pub fn offset(&self, x: i64, y: i64, z: i64) -> Result<usize, GridError> {
        if x < 0 || y < 0 || z < 0 {
            return Err(GridError::InvalidCoordinate { x, y, z });
        }
        let side_x = self.radius.side_x();
        let side_z = self.radius.side_z();
        let offset = y as usize * side_x * side_z + x as usize + z as usize * side_x;
        if offset >= self.cells.len() {
            return Err(GridError::OutOfBounds {
                offset,
                len: self.cells.len(),
            });
        }
        Ok(offset)
    }

    /// Split a linear offset back into its absolute `(x, y, z)`.
    pub fn decompose(&self, offset: usize) -> Result<(usize, usize, usize), GridError> {
        if offset >= self.cells.len() {
            return Err(GridError::OutOfBounds {
                offset,
                len: self.cells.len(),
            });
        }
        let layer = self.radius.side_x() * self.radius.side_z();
        let y = offset / layer;
        let z = offset % layer / self.radius.side_x();
        let x = offset % layer % self.radius.side_x();
        Ok((x, y, z))
    }

    /// The block id at an absolute coordinate.
    pub fn block_at(&self, x: i64, y: i64, z: i64) -> Result<&str, GridError> {
        let offset = self.offset(x, y, z)?;
        Ok(&self.cells[offset])
    }

    /// Scan the column at `(x, z)` from the top of the grid down and return the
    /// height, relative to the agent's footing, of the top face of the first
    /// block that is not air.
    pub fn first_non_air_above(&self, x: i64, z: i64) -> Result<Option<i64>, GridError> {
        self.scan_column(x, z, |_| false)
    }

    /// Like [`Self::first_non_air_above`], but gives up on the column as soon
    /// as the scan meets water or lava.
    pub fn first_solid_footing_above(&self, x: i64, z: i64) -> Result<Option<i64>, GridError> {
        self.scan_column(x, z, is_liquid)
    }

    /// First non-air block in a column, from the top down, with its relative
    /// top height. The bottom layer of the grid is never scanned.
    pub fn column_top(&self, x: i64, z: i64) -> Result<Option<(&str, i64)>, GridError> {
        let oby = self.radius.y as i64;
        for y in (1..=2 * oby).rev() {
            let block = self.block_at(x, y, z)?;
            if block != AIR {
                return Ok(Some((block, y - oby + 1)));
            }
        }
        Ok(None)
    }

    fn scan_column(
        &self,
        x: i64,
        z: i64,
        disqualifies: impl Fn(&str) -> bool,
    ) -> Result<Option<i64>, GridError> {
        let oby = self.radius.y as i64;
        for y in (1..=2 * oby).rev() {
            let block = self.block_at(x, y, z)?;
            if disqualifies(block) {
                return Ok(None);
            }
            if block != AIR {
                return Ok(Some(y - oby + 1));
            }
        }
        Ok(None)
    }
}
