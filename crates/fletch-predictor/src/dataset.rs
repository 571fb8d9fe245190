use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::Path,
};

use anyhow::{Context, Result};
use fletch_ballistics::ShotProblem;
use fletch_core::{Obstacle, ShotSolution, Vector3};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};

/// The inputs of the learned predictor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Features {
    /// Horizontal distance to the target.
    pub distance: f64,
    /// Height of the target relative to the shooter's footing.
    pub height: f64,
    /// Distance to the tallest obstacle, 0 without obstacles.
    pub obstacle_distance: f64,
    /// Top of the tallest obstacle, 0 without obstacles.
    pub obstacle_height: f64,
}

impl Features {
    pub const LEN: usize = 4;

    pub fn new(distance: f64, height: f64, obstacle_distance: f64, obstacle_height: f64) -> Self {
        Self {
            distance,
            height,
            obstacle_distance,
            obstacle_height,
        }
    }

    pub fn from_problem(problem: &ShotProblem) -> Self {
        let (obstacle_distance, obstacle_height) = problem
            .tallest_obstacle()
            .map(|o| (o.distance, o.top))
            .unwrap_or((0.0, 0.0));
        Self::new(
            problem.target.distance,
            problem.target.base,
            obstacle_distance,
            obstacle_height,
        )
    }

    pub fn to_array(&self) -> [f64; Self::LEN] {
        [
            self.distance,
            self.height,
            self.obstacle_distance,
            self.obstacle_height,
        ]
    }
}

/// One targeting episode: what the agent saw and what the solver answered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingRecord {
    /// Target position relative to the agent.
    pub target: Vector3,
    /// `(distance, top)` of every obstacle along the line of fire.
    pub obstacle_tops: Vec<(f64, f64)>,
    pub power: Option<f64>,
    pub pitch: Option<f64>,
    pub yaw: f64,
}

impl TrainingRecord {
    pub fn new(
        target: Vector3,
        obstacles: &[Obstacle],
        yaw: f64,
        solution: Option<&ShotSolution>,
    ) -> Self {
        Self {
            target,
            obstacle_tops: obstacles.iter().map(|o| (o.distance, o.top)).collect(),
            power: solution.map(|s| s.power),
            pitch: solution.map(|s| s.pitch),
            yaw,
        }
    }

    pub fn features(&self) -> Features {
        let (obstacle_distance, obstacle_height) = self
            .obstacle_tops
            .iter()
            .fold(None, |best: Option<(f64, f64)>, &(distance, top)| match best {
                Some(best) if best.1 >= top => Some(best),
                _ => Some((distance, top)),
            })
            .unwrap_or((0.0, 0.0));
        Features::new(
            self.target.x.hypot(self.target.z),
            self.target.y,
            obstacle_distance,
            obstacle_height,
        )
    }

    /// `(power, pitch)`, if the episode was solved.
    pub fn label(&self) -> Option<(f64, f64)> {
        self.power.zip(self.pitch)
    }
}

/// Recorded episodes, stored as one JSON object per line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingSet {
    records: Vec<TrainingRecord>,
}

impl TrainingSet {
    pub fn new(records: Vec<TrainingRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[TrainingRecord] {
        &self.records
    }

    pub fn push(&mut self, record: TrainingRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Feature/label pairs of the solved records.
    pub fn samples(&self) -> Vec<(Features, (f64, f64))> {
        self.records
            .iter()
            .filter_map(|r| r.label().map(|label| (r.features(), label)))
            .collect()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read training set at {}", path.display()))?;

        let mut records = Vec::new();
        for (index, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str(line).with_context(|| {
                format!("Invalid record on line {} of {}", index + 1, path.display())
            })?;
            records.push(record);
        }
        log::debug!("Loaded {} records from {}", records.len(), path.display());
        Ok(Self { records })
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut contents = String::new();
        for record in &self.records {
            contents.push_str(&serde_json::to_string(record)?);
            contents.push('\n');
        }
        fs::write(path, contents)
            .with_context(|| format!("Failed to write training set to {}", path.display()))
    }

    /// Add a single record to the end of the file, creating it if needed.
    pub fn append(path: impl AsRef<Path>, record: &TrainingRecord) -> Result<()> {
        let path = path.as_ref();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open training set at {}", path.display()))?;
        writeln!(file, "{}", serde_json::to_string(record)?)
            .with_context(|| format!("Failed to append to {}", path.display()))
    }

    /// Shuffle the records with a seeded RNG and split them into a training
    /// and a test set. The test set gets `test_fraction` of the records,
    /// rounded up.
    pub fn split(&self, test_fraction: f64, seed: u64) -> (TrainingSet, TrainingSet) {
        let mut shuffled = self.records.clone();
        shuffled.shuffle(&mut StdRng::seed_from_u64(seed));

        let test_len = ((shuffled.len() as f64 * test_fraction.clamp(0.0, 1.0)).ceil() as usize)
            .min(shuffled.len());
        let train = shuffled.split_off(test_len);
        (TrainingSet::new(train), TrainingSet::new(shuffled))
    }
}
