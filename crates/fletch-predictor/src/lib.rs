//! Learned shortcut for the exhaustive solver.
//!
//! Episodes recorded while the solver runs become training data for a small
//! regressor that maps what the agent sees to a draw power and pitch in a
//! single forward pass. It is an approximation: the solver remains the
//! source of truth for whether a shot hits.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use fletch_ballistics::{estimate_height_at, Aim, ShotProblem};
use fletch_core::{BallisticsSettings, PredictorSettings, ShotSolution, SolverSettings};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

mod dataset;
mod error;
mod mlp;

pub use dataset::*;
pub use error::PredictorError;
pub use mlp::{Mlp, Scaler};

const MIN_PITCH: f64 = -90.0;
const MAX_PITCH: f64 = 90.0;

/// How well a predictor does on held out records.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub train_samples: usize,
    pub test_samples: usize,
    /// Coefficient of determination on the test records.
    pub score: Option<f64>,
    pub mean_squared_error: Option<f64>,
}

/// A fitted model predicting `(power, pitch)` from [`Features`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predictor {
    model: Mlp,
    min_power: f64,
    max_power: f64,
}

impl Predictor {
    /// Fit a model to the solved records of `set`.
    pub fn train(
        set: &TrainingSet,
        settings: &PredictorSettings,
        solver: &SolverSettings,
    ) -> Result<Self, PredictorError> {
        let samples = set.samples();
        if samples.is_empty() {
            return Err(PredictorError::EmptyTrainingSet);
        }

        let features = samples.iter().map(|(f, _)| *f).collect::<Vec<_>>();
        let targets = DMatrix::from_row_iterator(
            samples.len(),
            2,
            samples
                .iter()
                .flat_map(|(_, (power, pitch))| [*power, *pitch]),
        );
        let model = Mlp::fit(&feature_matrix(&features), &targets, settings)?;
        Ok(Self {
            model,
            min_power: solver.min_power,
            max_power: solver.max_power,
        })
    }

    /// Split `set` by the settings' test fraction, train on one part and
    /// evaluate on the other.
    pub fn train_and_evaluate(
        set: &TrainingSet,
        settings: &PredictorSettings,
        solver: &SolverSettings,
    ) -> Result<(Self, Evaluation), PredictorError> {
        let (train, test) = set.split(settings.test_fraction, settings.split_seed);
        let predictor = Self::train(&train, settings, solver)?;
        let evaluation = Evaluation {
            train_samples: train.samples().len(),
            test_samples: test.samples().len(),
            score: predictor.score(&test),
            mean_squared_error: predictor.mean_squared_error(&test),
        };
        log::info!(
            "Predictor trained on {} samples, tested on {}: score {:?}, mse {:?}",
            evaluation.train_samples,
            evaluation.test_samples,
            evaluation.score,
            evaluation.mean_squared_error
        );
        Ok((predictor, evaluation))
    }

    /// `(power, pitch)` for the given features, clamped to the range the
    /// solver would search.
    pub fn predict(&self, features: &Features) -> (f64, f64) {
        self.predict_many(std::slice::from_ref(features))[0]
    }

    pub fn predict_many(&self, features: &[Features]) -> Vec<(f64, f64)> {
        if features.is_empty() {
            return Vec::new();
        }
        let output = self.model.predict(&feature_matrix(features));
        output
            .row_iter()
            .map(|row| {
                (
                    row[0].clamp(self.min_power, self.max_power),
                    row[1].clamp(MIN_PITCH, MAX_PITCH),
                )
            })
            .collect()
    }

    /// Coefficient of determination of the predictions on the solved records
    /// of `set`, averaged over power and pitch. `None` without solved records.
    pub fn score(&self, set: &TrainingSet) -> Option<f64> {
        let (labels, predictions) = self.labels_and_predictions(set)?;
        let n = labels.len() as f64;
        let mut total = 0.0;
        for output in 0..2 {
            let pick = |p: &(f64, f64)| if output == 0 { p.0 } else { p.1 };
            let mean = labels.iter().map(pick).sum::<f64>() / n;
            let residual = labels
                .iter()
                .zip(&predictions)
                .map(|(l, p)| (pick(l) - pick(p)).powi(2))
                .sum::<f64>();
            let spread = labels
                .iter()
                .map(|l| (pick(l) - mean).powi(2))
                .sum::<f64>();
            total += if spread == 0.0 {
                if residual == 0.0 {
                    1.0
                } else {
                    0.0
                }
            } else {
                1.0 - residual / spread
            };
        }
        Some(total / 2.0)
    }

    /// Mean squared error over power and pitch of the solved records of `set`.
    pub fn mean_squared_error(&self, set: &TrainingSet) -> Option<f64> {
        let (labels, predictions) = self.labels_and_predictions(set)?;
        let sum = labels
            .iter()
            .zip(&predictions)
            .map(|(l, p)| (l.0 - p.0).powi(2) + (l.1 - p.1).powi(2))
            .sum::<f64>();
        Some(sum / (2 * labels.len()) as f64)
    }

    /// How far above or below the target's center the predicted shot passes,
    /// going by the drag-free flight estimate.
    pub fn height_error(&self, problem: &ShotProblem, ballistics: &BallisticsSettings) -> Option<f64> {
        let solution = self.aim(problem)?;
        let height = estimate_height_at(problem.target.distance, &solution, ballistics)?;
        Some(height - problem.target.center().y)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let contents = serde_json::to_string(self)?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write predictor to {}", path.display()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read predictor at {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse predictor at {}", path.display()))
    }

    fn labels_and_predictions(
        &self,
        set: &TrainingSet,
    ) -> Option<(Vec<(f64, f64)>, Vec<(f64, f64)>)> {
        let samples = set.samples();
        if samples.is_empty() {
            return None;
        }
        let features = samples.iter().map(|(f, _)| *f).collect::<Vec<_>>();
        let labels = samples.into_iter().map(|(_, l)| l).collect();
        Some((labels, self.predict_many(&features)))
    }
}

impl Aim for Predictor {
    fn aim(&self, problem: &ShotProblem) -> Option<ShotSolution> {
        let (power, pitch) = self.predict(&Features::from_problem(problem));
        if !power.is_finite() || !pitch.is_finite() {
            return None;
        }
        Some(ShotSolution::new(power, pitch, problem.yaw))
    }
}

fn feature_matrix(features: &[Features]) -> DMatrix<f64> {
    DMatrix::from_row_iterator(
        features.len(),
        Features::LEN,
        features.iter().flat_map(|f| f.to_array()),
    )
}
