use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Physical constants of the projectile model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallisticsSettings {
    /// Height the arrow is released at, relative to the shooter's footing.
    pub eye_height: f64,
    /// Factor both velocity components are multiplied by every tick.
    pub drag: f64,
    /// Vertical speed lost every tick.
    pub gravity: f64,
    /// Flight stops once the horizontal speed drops below this.
    pub min_horizontal_speed: f64,
    /// How far above an obstacle's top the arrow still counts as blocked.
    pub obstacle_clearance: f64,
    /// Part of the target's bottom that does not count as a hit.
    pub hit_margin_bottom: f64,
    /// Part of the target's top that does not count as a hit.
    pub hit_margin_top: f64,
    /// Upper bound on simulated ticks for a single shot.
    pub max_steps: usize,
}

impl Default for BallisticsSettings {
    fn default() -> Self {
        Self {
            eye_height: 1.62,
            drag: 0.99,
            gravity: 0.05,
            min_horizontal_speed: 0.01,
            obstacle_clearance: 0.5,
            hit_margin_bottom: 0.25,
            hit_margin_top: 0.25,
            max_steps: 10_000,
        }
    }
}

/// Search space of the exhaustive angle/power solver.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    /// First (strongest) draw power tried.
    pub max_power: f64,
    /// Weakest draw power tried.
    pub min_power: f64,
    /// Decrement between power levels.
    pub power_step: f64,
    /// First launch angle of each sweep, degrees above the horizon.
    pub min_launch_angle: i32,
    /// Last launch angle of each sweep, inclusive.
    pub max_launch_angle: i32,
}

impl SolverSettings {
    /// The power levels in the order they are tried, strongest first.
    pub fn power_levels(&self) -> Vec<f64> {
        if self.power_step <= 0.0 {
            return vec![self.max_power];
        }
        let count = ((self.max_power - self.min_power) / self.power_step + 1e-9).floor() as usize;
        (0..=count)
            .map(|i| self.max_power - i as f64 * self.power_step)
            .collect()
    }
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            max_power: 1.0,
            min_power: 0.1,
            power_step: 0.1,
            min_launch_angle: -90,
            max_launch_angle: 89,
        }
    }
}

/// Settings for the orientation controller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringSettings {
    /// Angular difference, in degrees, at which the turn rate reaches ~46% of
    /// its maximum. Larger values steer more gently.
    pub scale: f64,
    /// Sum of the absolute pitch and yaw errors below which the agent counts
    /// as on target, in degrees.
    pub tolerance: f64,
}

impl Default for SteeringSettings {
    fn default() -> Self {
        Self {
            scale: 50.0,
            tolerance: 0.1,
        }
    }
}

/// Settings for a single shot cycle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShotSettings {
    /// Number of arrows fired at one acquired target.
    pub shots_per_target: usize,
    /// Pause between releasing the trigger and aiming again, in seconds.
    pub cooldown: f64,
}

impl Default for ShotSettings {
    fn default() -> Self {
        Self {
            shots_per_target: 1,
            cooldown: 0.5,
        }
    }
}

/// Hyperparameters of the learned predictor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorSettings {
    /// Width of the hidden layer.
    pub hidden_units: usize,
    /// L2 penalty on the weights.
    pub alpha: f64,
    pub learning_rate: f64,
    pub epochs: usize,
    /// Seed for the weight initialization.
    pub seed: u64,
    /// Share of the rows held out for evaluation.
    pub test_fraction: f64,
    /// Seed for the train/test shuffle.
    pub split_seed: u64,
}

impl Default for PredictorSettings {
    fn default() -> Self {
        Self {
            hidden_units: 70,
            alpha: 10.0,
            learning_rate: 0.01,
            epochs: 3000,
            seed: 1,
            test_fraction: 0.33,
            split_seed: 42,
        }
    }
}

/// All tunables of the targeting stack.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FletchSettings {
    pub ballistics: BallisticsSettings,
    pub solver: SolverSettings,
    pub steering: SteeringSettings,
    pub shot: ShotSettings,
    pub predictor: PredictorSettings,
}

impl FletchSettings {
    /// Load the settings from a JSON file, writing the defaults there if the file
    /// does not exist yet.
    pub fn load_or_insert(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse settings at {}", path.display())),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No settings at {}, writing defaults", path.display());
                let settings = Self::default();
                settings.store(path)?;
                Ok(settings)
            }
            Err(err) => {
                Err(err).with_context(|| format!("Failed to read settings at {}", path.display()))
            }
        }
    }

    /// Store the settings as pretty JSON.
    pub fn store(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write settings to {}", path.display()))
    }
}
