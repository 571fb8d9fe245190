use serde::{Deserialize, Serialize};

use crate::Vector2;

/// A point in the vertical plane that contains the shooter and the target.
///
/// `x` is the horizontal distance from the shooter and `y` the height relative
/// to the block the shooter stands on. Targets, obstacles and trajectory
/// samples all live in this plane.
pub type RelativePoint = Vector2;

/// A line segment in the shot plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub p1: Vector2,
    pub p2: Vector2,
}

impl Segment {
    pub fn new(p1: Vector2, p2: Vector2) -> Self {
        Self { p1, p2 }
    }

    /// Whether the two segments cross each other.
    ///
    /// Uses the counter-clockwise orientation test, so segments that only
    /// touch at an endpoint or are collinear do not count as crossing.
    pub fn intersects(&self, other: &Segment) -> bool {
        ccw(self.p1, other.p1, other.p2) != ccw(self.p2, other.p1, other.p2)
            && ccw(self.p1, self.p2, other.p1) != ccw(self.p1, self.p2, other.p2)
    }
}

fn ccw(a: Vector2, b: Vector2, c: Vector2) -> bool {
    (c.y - a.y) * (b.x - a.x) > (b.y - a.y) * (c.x - a.x)
}

/// The silhouette of a solid block column crossing the line of fire: a
/// vertical segment from `(distance, base)` up to `(distance, top)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub distance: f64,
    pub base: f64,
    pub top: f64,
}

impl Obstacle {
    pub fn new(distance: f64, base: f64, top: f64) -> Self {
        Self {
            distance,
            base,
            top,
        }
    }

    pub fn base_point(&self) -> RelativePoint {
        Vector2::new(self.distance, self.base)
    }

    pub fn top_point(&self) -> RelativePoint {
        Vector2::new(self.distance, self.top)
    }

    /// The segment projectiles collide with, its top raised by `clearance`.
    pub fn collision_segment(&self, clearance: f64) -> Segment {
        Segment::new(
            self.base_point(),
            Vector2::new(self.distance, self.top + clearance),
        )
    }

    /// The obstacle with the highest top, the first one on ties.
    pub fn tallest(obstacles: &[Obstacle]) -> Option<&Obstacle> {
        obstacles
            .iter()
            .fold(None, |best: Option<&Obstacle>, obstacle| match best {
                Some(best) if best.top >= obstacle.top => Some(best),
                _ => Some(obstacle),
            })
    }
}

/// The block being shot at, seen in the shot plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Target {
    /// Horizontal distance from the shooter.
    pub distance: f64,
    /// Height of the bottom face relative to the shooter's footing.
    pub base: f64,
    /// Vertical size of the target, 1 for a single block.
    pub extent: f64,
}

impl Target {
    pub fn new(distance: f64, base: f64) -> Self {
        Self::with_extent(distance, base, 1.0)
    }

    pub fn with_extent(distance: f64, base: f64, extent: f64) -> Self {
        Self {
            distance,
            base,
            extent,
        }
    }

    /// Vertical center of the target.
    pub fn center(&self) -> RelativePoint {
        Vector2::new(self.distance, self.base + self.extent / 2.0)
    }

    /// The segment a projectile has to cross to count as a hit, narrowed by
    /// the given margins at the bottom and the top.
    pub fn hit_segment(&self, margin_bottom: f64, margin_top: f64) -> Segment {
        Segment::new(
            Vector2::new(self.distance, self.base + margin_bottom),
            Vector2::new(self.distance, self.base + self.extent - margin_top),
        )
    }
}

/// Everything needed to take a shot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShotSolution {
    /// How long to draw the bow, in seconds, within (0, 1].
    pub power: f64,
    /// Pitch in degrees, positive towards the ground.
    pub pitch: f64,
    /// Yaw in degrees, 0 facing south.
    pub yaw: f64,
}

impl ShotSolution {
    pub fn new(power: f64, pitch: f64, yaw: f64) -> Self {
        Self { power, pitch, yaw }
    }

    /// Launch angle above the horizon, in degrees.
    pub fn launch_angle(&self) -> f64 {
        -self.pitch
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn seg(x1: f64, y1: f64, x2: f64, y2: f64) -> Segment {
        Segment::new(Vector2::new(x1, y1), Vector2::new(x2, y2))
    }

    #[test]
    fn test_crossing_segments() {
        let a = seg(0.0, 0.0, 2.0, 2.0);
        let b = seg(0.0, 2.0, 2.0, 0.0);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn test_disjoint_segments() {
        let a = seg(0.0, 0.0, 1.0, 1.0);
        let b = seg(2.0, 0.0, 2.0, 5.0);
        assert!(!a.intersects(&b));
    }

    #[test]
    fn test_parallel_segments() {
        let a = seg(0.0, 0.0, 4.0, 0.0);
        let b = seg(0.0, 1.0, 4.0, 1.0);
        assert!(!a.intersects(&b));
    }

    #[test]
    fn test_collinear_segments_do_not_count() {
        let a = seg(0.0, -10.0, 0.0, 0.5);
        let b = seg(0.0, 1.62, 1.0, 1.5);
        assert!(!a.intersects(&b));
    }

    #[test]
    fn test_trajectory_step_through_vertical_wall() {
        let wall = Obstacle::new(3.0, -10.0, 2.0).collision_segment(0.5);
        assert!(seg(2.5, 1.0, 3.5, 1.2).intersects(&wall));
        // Passes over the raised top
        assert!(!seg(2.5, 2.6, 3.5, 2.7).intersects(&wall));
    }

    #[test]
    fn test_obstacle_clearance_raises_top_only() {
        let obstacle = Obstacle::new(4.0, -10.0, 1.0);
        let segment = obstacle.collision_segment(0.5);
        assert_eq!(segment.p1, Vector2::new(4.0, -10.0));
        assert_eq!(segment.p2, Vector2::new(4.0, 1.5));
    }

    #[test]
    fn test_target_geometry() {
        let target = Target::with_extent(10.0, 2.0, 2.0);
        assert_relative_eq!(target.center().y, 3.0);

        let hit = target.hit_segment(0.25, 0.25);
        assert_relative_eq!(hit.p1.y, 2.25);
        assert_relative_eq!(hit.p2.y, 3.75);
        assert_relative_eq!(hit.p1.x, 10.0);
    }

    #[test]
    fn test_launch_angle_is_negated_pitch() {
        let solution = ShotSolution::new(0.5, -12.0, 0.0);
        assert_eq!(solution.launch_angle(), 12.0);
    }

    #[test]
    fn test_tallest_obstacle() {
        let obstacles = [
            Obstacle::new(1.0, -3.0, 0.0),
            Obstacle::new(2.0, -3.0, 3.0),
            Obstacle::new(3.0, -3.0, 3.0),
        ];
        assert_eq!(Obstacle::tallest(&obstacles), Some(&obstacles[1]));
        assert_eq!(Obstacle::tallest(&[]), None);
    }
}
