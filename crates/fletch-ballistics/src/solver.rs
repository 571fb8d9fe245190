use fletch_core::{BallisticsSettings, Obstacle, ShotSolution, SolverSettings, Target};

use crate::{launch_speed, simulate};

/// A target to shoot at, as seen from the shooter.
#[derive(Debug, Clone, PartialEq)]
pub struct ShotProblem {
    pub target: Target,
    /// Obstacles along the line of fire, in the shot plane.
    pub obstacles: Vec<Obstacle>,
    /// Yaw towards the target, in degrees.
    pub yaw: f64,
}

impl ShotProblem {
    pub fn new(target: Target, obstacles: Vec<Obstacle>, yaw: f64) -> Self {
        Self {
            target,
            obstacles,
            yaw,
        }
    }

    /// The obstacle with the highest top, the first one on ties.
    pub fn tallest_obstacle(&self) -> Option<&Obstacle> {
        Obstacle::tallest(&self.obstacles)
    }
}

/// Something that picks a draw power and pitch for a shot.
pub trait Aim {
    /// Returns `None` when no shot is expected to hit.
    fn aim(&self, problem: &ShotProblem) -> Option<ShotSolution>;
}

/// Finds a hitting shot by simulating every power level and launch angle.
///
/// Power levels are tried strongest first and, for each, launch angles from
/// the lowest to the highest in whole degrees; the first combination that
/// hits wins. The simulated flight is discontinuous wherever it starts or
/// stops clipping an obstacle, so there is no gradient to follow.
#[derive(Debug, Clone, Default)]
pub struct ExhaustiveSolver {
    ballistics: BallisticsSettings,
    settings: SolverSettings,
}

impl ExhaustiveSolver {
    pub fn new(ballistics: BallisticsSettings, settings: SolverSettings) -> Self {
        Self {
            ballistics,
            settings,
        }
    }

    pub fn ballistics(&self) -> &BallisticsSettings {
        &self.ballistics
    }

    pub fn settings(&self) -> &SolverSettings {
        &self.settings
    }

    /// Returns `(power, pitch)` for a target `distance` blocks away whose
    /// bottom is `base` blocks above the shooter's footing, or `None` when
    /// nothing in the search space hits.
    pub fn solve(
        &self,
        distance: f64,
        base: f64,
        extent: f64,
        obstacles: &[Obstacle],
    ) -> Option<(f64, f64)> {
        let target = Target::with_extent(distance, base, extent);
        for power in self.settings.power_levels() {
            let speed = launch_speed(power);
            for angle in self.settings.min_launch_angle..=self.settings.max_launch_angle {
                let flight = simulate(angle as f64, speed, &target, obstacles, &self.ballistics);
                if flight.outcome.is_hit() {
                    let pitch = -(angle as f64);
                    log::debug!(
                        "Solved target at {:.2}/{:.2}: power {:.1}, pitch {}",
                        distance,
                        base,
                        power,
                        pitch
                    );
                    return Some((power, pitch));
                }
            }
        }

        log::debug!(
            "No solution for target at {:.2}/{:.2} with {} obstacles",
            distance,
            base,
            obstacles.len()
        );
        None
    }
}

impl Aim for ExhaustiveSolver {
    fn aim(&self, problem: &ShotProblem) -> Option<ShotSolution> {
        let target = &problem.target;
        self.solve(
            target.distance,
            target.base,
            target.extent,
            &problem.obstacles,
        )
        .map(|(power, pitch)| ShotSolution::new(power, pitch, problem.yaw))
    }
}
