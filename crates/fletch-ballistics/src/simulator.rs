use fletch_core::{BallisticsSettings, Obstacle, RelativePoint, Segment, Target, Vector2};

/// Positions of the arrow after every tick, starting at the release point.
pub type Trajectory = Vec<RelativePoint>;

/// How a simulated shot ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShotOutcome {
    /// The arrow crossed the target's hit segment.
    Hit,
    /// The arrow ran into an obstacle. `miss` is the distance from the point
    /// where it stopped to the target's center.
    Obstructed { miss: f64 },
    /// The arrow reached the target's distance (or ran out of speed) without
    /// hitting it.
    Missed { miss: f64 },
}

impl ShotOutcome {
    pub fn is_hit(&self) -> bool {
        matches!(self, ShotOutcome::Hit)
    }

    /// Distance by which the shot missed, 0 for a hit.
    pub fn miss_distance(&self) -> f64 {
        match self {
            ShotOutcome::Hit => 0.0,
            ShotOutcome::Obstructed { miss } | ShotOutcome::Missed { miss } => *miss,
        }
    }
}

/// A simulated shot.
#[derive(Debug, Clone)]
pub struct Flight {
    pub trajectory: Trajectory,
    pub outcome: ShotOutcome,
}

impl Flight {
    /// The last point the arrow reached.
    pub fn end_point(&self) -> RelativePoint {
        self.trajectory
            .last()
            .copied()
            .unwrap_or_else(Vector2::zeros)
    }
}

/// Simulates an arrow released at `angle` degrees above the horizon with
/// `speed` blocks per tick.
///
/// The arrow flies until it passes the target's distance, becomes too slow
/// horizontally, runs into an obstacle or hits the target. Every tick moves
/// the arrow by its current velocity and then applies drag and gravity.
pub fn simulate(
    angle: f64,
    speed: f64,
    target: &Target,
    obstacles: &[Obstacle],
    settings: &BallisticsSettings,
) -> Flight {
    let angle = angle.to_radians();
    let mut position = Vector2::new(0.0, settings.eye_height);
    let mut velocity = Vector2::new(speed * angle.cos(), speed * angle.sin());

    let walls = obstacles
        .iter()
        .map(|o| o.collision_segment(settings.obstacle_clearance))
        .collect::<Vec<_>>();
    let hit_segment = target.hit_segment(settings.hit_margin_bottom, settings.hit_margin_top);

    let mut trajectory = vec![position];
    let mut obstructed = false;
    while position.x < target.distance
        && velocity.x > settings.min_horizontal_speed
        && trajectory.len() <= settings.max_steps
    {
        let next = position + velocity;
        velocity.x *= settings.drag;
        velocity.y = velocity.y * settings.drag - settings.gravity;

        let step = Segment::new(position, next);
        position = next;
        trajectory.push(position);

        if walls.iter().any(|wall| step.intersects(wall)) {
            obstructed = true;
            break;
        }
        if step.intersects(&hit_segment) {
            return Flight {
                trajectory,
                outcome: ShotOutcome::Hit,
            };
        }
    }

    let miss = (position - target.center()).norm();
    let outcome = if obstructed {
        ShotOutcome::Obstructed { miss }
    } else {
        ShotOutcome::Missed { miss }
    };
    Flight {
        trajectory,
        outcome,
    }
}

/// Distance by which a shot misses the target, 0 when it hits.
pub fn simulate_shot(
    angle: f64,
    speed: f64,
    target: &Target,
    obstacles: &[Obstacle],
    settings: &BallisticsSettings,
) -> f64 {
    simulate(angle, speed, target, obstacles, settings)
        .outcome
        .miss_distance()
}
