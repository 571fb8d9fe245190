use serde::{Deserialize, Serialize};

/// Where the agent is looking, in degrees.
///
/// Pitch follows the game convention: positive looks towards the ground,
/// negative towards the sky. Yaw 0 faces south (+z).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    pub pitch: f64,
    pub yaw: f64,
}

impl Orientation {
    pub fn new(pitch: f64, yaw: f64) -> Self {
        Self { pitch, yaw }
    }
}

/// The shortest signed turn from `current` to `target`, in degrees, wrapped
/// into [-180, 180].
pub fn angle_delta(target: f64, current: f64) -> f64 {
    let mut delta = (target - current) % 360.0;
    while delta < -180.0 {
        delta += 360.0;
    }
    while delta > 180.0 {
        delta -= 360.0;
    }
    delta
}

/// Yaw in degrees that faces the point `(x, z)` relative to the viewer.
pub fn yaw_towards(x: f64, z: f64) -> f64 {
    -x.atan2(z).to_degrees()
}
