use anyhow::{anyhow, Context, Result};
use fletch_core::{Orientation, Vector3};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{ObservationRadius, VoxelGrid};

/// Name the host gives the grid observation by default.
pub const DEFAULT_GRID_NAME: &str = "Map";

/// One observation from the host: the agent's pose and, when the observation
/// carries one, the flattened grid around it.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldSnapshot {
    /// Absolute position of the agent.
    pub position: Vector3,
    pub orientation: Orientation,
    /// Block ids, y-major, then z, then x.
    pub cells: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct RawObservation {
    #[serde(rename = "XPos")]
    x: f64,
    #[serde(rename = "YPos")]
    y: f64,
    #[serde(rename = "ZPos")]
    z: f64,
    #[serde(rename = "Pitch", default)]
    pitch: f64,
    #[serde(rename = "Yaw", default)]
    yaw: f64,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

impl WorldSnapshot {
    /// Parse an observation using the default grid name.
    pub fn from_json(text: &str) -> Result<Self> {
        Self::from_json_with_grid(text, DEFAULT_GRID_NAME)
    }

    /// Parse an observation whose grid is published under `grid_name`.
    pub fn from_json_with_grid(text: &str, grid_name: &str) -> Result<Self> {
        let mut raw: RawObservation =
            serde_json::from_str(text).context("Failed to parse observation")?;
        let cells = match raw.rest.remove(grid_name) {
            Some(value) => Some(
                serde_json::from_value(value)
                    .with_context(|| format!("Grid '{}' is not a list of block ids", grid_name))?,
            ),
            None => None,
        };
        Ok(Self {
            position: Vector3::new(raw.x, raw.y, raw.z),
            orientation: Orientation::new(raw.pitch, raw.yaw),
            cells,
        })
    }

    pub fn has_grid(&self) -> bool {
        self.cells.is_some()
    }

    /// Take the grid out of the snapshot, checking it against the radii the
    /// observation was configured with.
    pub fn into_grid(self, radius: ObservationRadius) -> Result<VoxelGrid> {
        let cells = self
            .cells
            .ok_or_else(|| anyhow!("Observation carries no grid"))?;
        Ok(VoxelGrid::new(cells, radius, self.position)?)
    }
}

#[cfg(test)]
mod tests {
    use fletch_core::GridError;

    use super::*;

    fn observation(grid_name: &str, cells: usize) -> String {
        let cells = vec!["\"air\""; cells].join(",");
        format!(
            r#"{{"XPos": 243.5, "YPos": 76.0, "ZPos": 323.5, "Pitch": 12.5, "Yaw": -90.0,
                "Life": 20.0, "{grid_name}": [{cells}]}}"#
        )
    }

    #[test]
    fn test_parse_observation() {
        let snapshot = WorldSnapshot::from_json(&observation("Map", 27)).unwrap();
        assert_eq!(snapshot.position, Vector3::new(243.5, 76.0, 323.5));
        assert_eq!(snapshot.orientation, Orientation::new(12.5, -90.0));
        assert_eq!(snapshot.cells.as_ref().map(Vec::len), Some(27));

        let grid = snapshot.into_grid(ObservationRadius::new(1, 1, 1)).unwrap();
        assert_eq!(grid.block_at(1, 1, 1).unwrap(), "air");
        assert_eq!(grid.origin(), Vector3::new(243.5, 76.0, 323.5));
    }

    #[test]
    fn test_custom_grid_name() {
        let text = observation("floor", 27);
        assert!(!WorldSnapshot::from_json(&text).unwrap().has_grid());
        assert!(WorldSnapshot::from_json_with_grid(&text, "floor")
            .unwrap()
            .has_grid());
    }

    #[test]
    fn test_orientation_defaults_to_zero() {
        let snapshot = WorldSnapshot::from_json(r#"{"XPos": 1, "YPos": 2, "ZPos": 3}"#).unwrap();
        assert_eq!(snapshot.orientation, Orientation::default());
        assert!(snapshot.into_grid(ObservationRadius::new(1, 1, 1)).is_err());
    }

    #[test]
    fn test_grid_size_is_checked() {
        let snapshot = WorldSnapshot::from_json(&observation("Map", 26)).unwrap();
        let err = snapshot
            .into_grid(ObservationRadius::new(1, 1, 1))
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<GridError>(),
            Some(&GridError::SizeMismatch {
                expected: 27,
                actual: 26
            })
        );
    }

    #[test]
    fn test_malformed_observation() {
        assert!(WorldSnapshot::from_json("{}").is_err());
        assert!(WorldSnapshot::from_json(r#"{"XPos": 1, "YPos": 2, "ZPos": 3, "Map": 5}"#).is_err());
    }
}
