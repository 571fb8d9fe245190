use anyhow::Result;
use fletch_ballistics::{Aim, ExhaustiveSolver, ShotProblem};
use fletch_core::{yaw_towards, FletchSettings, GridError, Obstacle, ShotSolution, Target, Vector3};
use fletch_predictor::TrainingRecord;
use fletch_world::{locate, profile, rasterize, ObservationRadius, VoxelGrid, WorldSnapshot};

/// Everything worked out about one target from one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetingPlan {
    /// Target position relative to the agent, centred in its block.
    pub relative_target: Vector3,
    pub obstacles: Vec<Obstacle>,
    /// Horizontal distance to the target.
    pub distance: f64,
    pub yaw: f64,
    /// `None` when no shot is expected to hit.
    pub solution: Option<ShotSolution>,
    /// The episode, ready to be added to a training set.
    pub record: TrainingRecord,
}

impl TargetingPlan {
    pub fn problem(&self) -> ShotProblem {
        ShotProblem::new(
            Target::new(self.distance, self.relative_target.y),
            self.obstacles.clone(),
            self.yaw,
        )
    }
}

/// Turns snapshots into shot solutions for one kind of target block.
///
/// The target is located in the grid, the line of fire towards it is traced
/// over the horizontal plane, the columns along it become obstacles and the
/// aim picks a power and pitch for the resulting shot.
pub struct Targeter<A> {
    aim: A,
    radius: ObservationRadius,
    target_block: String,
}

impl Targeter<ExhaustiveSolver> {
    /// A targeter using the exhaustive solver configured by `settings`.
    pub fn from_settings(
        settings: &FletchSettings,
        radius: ObservationRadius,
        target_block: impl Into<String>,
    ) -> Self {
        let solver = ExhaustiveSolver::new(settings.ballistics.clone(), settings.solver.clone());
        Self::new(solver, radius, target_block)
    }
}

impl<A: Aim> Targeter<A> {
    pub fn new(aim: A, radius: ObservationRadius, target_block: impl Into<String>) -> Self {
        Self {
            aim,
            radius,
            target_block: target_block.into(),
        }
    }

    pub fn aim(&self) -> &A {
        &self.aim
    }

    pub fn target_block(&self) -> &str {
        &self.target_block
    }

    /// Plan a shot from a raw snapshot. `Ok(None)` when the target is not in
    /// view.
    pub fn acquire_snapshot(&self, snapshot: WorldSnapshot) -> Result<Option<TargetingPlan>> {
        let grid = snapshot.into_grid(self.radius)?;
        Ok(self.acquire(&grid)?)
    }

    /// Plan a shot at the first target block in `grid`. `Ok(None)` when the
    /// target is not in view.
    pub fn acquire(&self, grid: &VoxelGrid) -> Result<Option<TargetingPlan>, GridError> {
        let Some(relative_target) = locate(grid, &self.target_block, true)? else {
            return Ok(None);
        };

        let radius = grid.radius();
        let cells = rasterize(radius.x, radius.z, relative_target.x, relative_target.z);
        let obstacles = profile(grid, &cells, &self.target_block)?;

        let distance = relative_target.x.hypot(relative_target.z);
        let yaw = yaw_towards(relative_target.x, relative_target.z);
        let problem = ShotProblem::new(
            Target::new(distance, relative_target.y),
            obstacles.clone(),
            yaw,
        );
        let solution = self.aim.aim(&problem);
        match &solution {
            Some(s) => log::info!(
                "Target {:.1} blocks away: power {:.1}, pitch {:.1}, yaw {:.1}",
                distance,
                s.power,
                s.pitch,
                s.yaw
            ),
            None => log::info!(
                "Target {:.1} blocks away behind {} obstacles: no shot",
                distance,
                obstacles.len()
            ),
        }

        let record = TrainingRecord::new(relative_target, &obstacles, yaw, solution.as_ref());
        Ok(Some(TargetingPlan {
            relative_target,
            obstacles,
            distance,
            yaw,
            solution,
            record,
        }))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use fletch_ballistics::{launch_speed, simulate};
    use fletch_core::{BallisticsSettings, AIR};

    use super::*;

    const TARGET: &str = "diamond_block";

    struct NoShot;

    impl Aim for NoShot {
        fn aim(&self, _problem: &ShotProblem) -> Option<ShotSolution> {
            None
        }
    }

    fn radius() -> ObservationRadius {
        ObservationRadius::new(25, 10, 25)
    }

    /// Empty world with the target 10 blocks east of the agent, level with
    /// its feet.
    fn open_field() -> VoxelGrid {
        VoxelGrid::from_fn(radius(), Vector3::zeros(), |x, y, z| {
            let block = if (x, y, z) == (35, 10, 25) { TARGET } else { AIR };
            block.to_string()
        })
    }

    /// Flat ground with the target on it and a two block wall halfway.
    fn walled_field() -> VoxelGrid {
        VoxelGrid::from_fn(radius(), Vector3::zeros(), |x, y, z| {
            let block = match (x, y, z) {
                (_, y, _) if y < 10 => "grass",
                (35, 10, 25) => TARGET,
                (30, 10 | 11, 25) => "cobblestone",
                _ => AIR,
            };
            block.to_string()
        })
    }

    #[test_log::test]
    fn test_open_field() {
        let targeter = Targeter::from_settings(&FletchSettings::default(), radius(), TARGET);
        let plan = targeter.acquire(&open_field()).unwrap().unwrap();

        assert_relative_eq!(plan.relative_target, Vector3::new(10.0, 0.0, 0.0));
        assert_relative_eq!(plan.distance, 10.0);
        assert_relative_eq!(plan.yaw, -90.0);
        assert!(plan.obstacles.is_empty());

        let solution = plan.solution.unwrap();
        assert!(solution.power > 0.0 && solution.power <= 1.0);
        assert!(solution.pitch.abs() <= 15.0);
        assert_eq!(solution.yaw, plan.yaw);
        let flight = simulate(
            solution.launch_angle(),
            launch_speed(solution.power),
            &Target::new(10.0, 0.0),
            &[],
            &BallisticsSettings::default(),
        );
        assert!(flight.outcome.is_hit());
    }

    #[test]
    fn test_plan_is_reproducible() {
        let targeter = Targeter::from_settings(&FletchSettings::default(), radius(), TARGET);
        let first = targeter.acquire(&walled_field()).unwrap();
        let second = targeter.acquire(&walled_field()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_shot_clears_wall() {
        let targeter = Targeter::from_settings(&FletchSettings::default(), radius(), TARGET);
        let plan = targeter.acquire(&walled_field()).unwrap().unwrap();

        // Ground in front of the agent up to the target plus the wall
        assert_eq!(plan.obstacles.len(), 10);
        let wall = Obstacle::tallest(&plan.obstacles).unwrap();
        assert_eq!((wall.distance, wall.top), (5.0, 2.0));

        let solution = plan.solution.expect("no solution over the wall");
        let problem = plan.problem();
        let flight = simulate(
            solution.launch_angle(),
            launch_speed(solution.power),
            &problem.target,
            &problem.obstacles,
            targeter.aim().ballistics(),
        );
        assert!(flight.outcome.is_hit());
    }

    #[test]
    fn test_record_matches_plan() {
        let targeter = Targeter::from_settings(&FletchSettings::default(), radius(), TARGET);
        let plan = targeter.acquire(&walled_field()).unwrap().unwrap();
        let solution = plan.solution.unwrap();

        let features = plan.record.features();
        assert_relative_eq!(features.distance, 10.0);
        assert_eq!((features.obstacle_distance, features.obstacle_height), (5.0, 2.0));
        assert_eq!(plan.record.label(), Some((solution.power, solution.pitch)));
        assert_eq!(plan.record.yaw, plan.yaw);
    }

    #[test]
    fn test_unsolvable_plan_is_still_recorded() {
        let targeter = Targeter::new(NoShot, radius(), TARGET);
        let plan = targeter.acquire(&walled_field()).unwrap().unwrap();
        assert_eq!(plan.solution, None);
        assert_eq!(plan.record.label(), None);
        assert_eq!(plan.record.obstacle_tops.len(), plan.obstacles.len());
    }

    #[test]
    fn test_target_out_of_view() {
        let targeter = Targeter::new(NoShot, radius(), "gold_block");
        assert_eq!(targeter.acquire(&open_field()), Ok(None));
    }

    #[test]
    fn test_non_square_grid() {
        let targeter = Targeter::new(NoShot, ObservationRadius::new(2, 1, 3), TARGET);
        let grid = VoxelGrid::from_fn(ObservationRadius::new(2, 1, 3), Vector3::zeros(), |_, _, _| {
            TARGET.to_string()
        });
        assert_eq!(
            targeter.acquire(&grid),
            Err(GridError::NonSquareGrid { x: 2, z: 3 })
        );
    }

    #[test]
    fn test_acquire_snapshot() {
        let cells = open_field()
            .cells()
            .iter()
            .map(|c| format!("\"{}\"", c))
            .collect::<Vec<_>>()
            .join(",");
        let text = format!(r#"{{"XPos": 0.5, "YPos": 4.0, "ZPos": 0.5, "Map": [{}]}}"#, cells);
        let snapshot = WorldSnapshot::from_json(&text).unwrap();

        let targeter = Targeter::new(NoShot, radius(), TARGET);
        let plan = targeter.acquire_snapshot(snapshot).unwrap().unwrap();
        assert_relative_eq!(plan.distance, 10.0);

        let empty = WorldSnapshot::from_json(r#"{"XPos": 0.5, "YPos": 4.0, "ZPos": 0.5}"#).unwrap();
        assert!(targeter.acquire_snapshot(empty).is_err());
    }
}
