use fletch_core::PredictorSettings;
use nalgebra::{DMatrix, DVector};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::PredictorError;

const BETA1: f64 = 0.9;
const BETA2: f64 = 0.999;
const EPSILON: f64 = 1e-8;

/// Per-column standardization to zero mean and unit variance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scaler {
    mean: DVector<f64>,
    scale: DVector<f64>,
}

impl Scaler {
    /// Fit to the columns of `data`. Constant columns keep a scale of 1.
    pub fn fit(data: &DMatrix<f64>) -> Self {
        let mean = DVector::from_iterator(data.ncols(), data.column_iter().map(|c| c.mean()));
        let scale = DVector::from_iterator(
            data.ncols(),
            data.column_iter().map(|c| {
                let std = c.variance().sqrt();
                if std > 1e-12 {
                    std
                } else {
                    1.0
                }
            }),
        );
        Self { mean, scale }
    }

    pub fn transform(&self, data: &DMatrix<f64>) -> DMatrix<f64> {
        DMatrix::from_fn(data.nrows(), data.ncols(), |i, j| {
            (data[(i, j)] - self.mean[j]) / self.scale[j]
        })
    }

    pub fn inverse_transform(&self, data: &DMatrix<f64>) -> DMatrix<f64> {
        DMatrix::from_fn(data.nrows(), data.ncols(), |i, j| {
            data[(i, j)] * self.scale[j] + self.mean[j]
        })
    }
}

/// A regressor with one logistic hidden layer and a linear output layer.
///
/// Samples are rows. Inputs and targets are standardized before training and
/// predictions are mapped back to the target scale. Training is full-batch
/// Adam on the mean squared error plus an L2 penalty on the weights, starting
/// from weights drawn with a seeded RNG, so the same data and settings always
/// produce the same model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mlp {
    hidden_weights: DMatrix<f64>,
    hidden_bias: DVector<f64>,
    output_weights: DMatrix<f64>,
    output_bias: DVector<f64>,
    input_scaler: Scaler,
    output_scaler: Scaler,
}

impl Mlp {
    pub fn fit(
        inputs: &DMatrix<f64>,
        targets: &DMatrix<f64>,
        settings: &PredictorSettings,
    ) -> Result<Self, PredictorError> {
        if inputs.nrows() == 0 {
            return Err(PredictorError::EmptyTrainingSet);
        }

        let mut rng = StdRng::seed_from_u64(settings.seed);
        let hidden = settings.hidden_units;
        let (hidden_weights, hidden_bias) = init_layer(&mut rng, inputs.ncols(), hidden);
        let (output_weights, output_bias) = init_layer(&mut rng, hidden, targets.ncols());

        let mut mlp = Self {
            hidden_weights,
            hidden_bias,
            output_weights,
            output_bias,
            input_scaler: Scaler::fit(inputs),
            output_scaler: Scaler::fit(targets),
        };
        let x = mlp.input_scaler.transform(inputs);
        let y = mlp.output_scaler.transform(targets);
        mlp.train(&x, &y, settings)?;
        Ok(mlp)
    }

    pub fn input_len(&self) -> usize {
        self.hidden_weights.ncols()
    }

    pub fn output_len(&self) -> usize {
        self.output_weights.nrows()
    }

    pub fn predict(&self, inputs: &DMatrix<f64>) -> DMatrix<f64> {
        let x = self.input_scaler.transform(inputs);
        let (_, output) = self.forward(&x);
        self.output_scaler.inverse_transform(&output)
    }

    fn forward(&self, x: &DMatrix<f64>) -> (DMatrix<f64>, DMatrix<f64>) {
        let mut hidden = x * self.hidden_weights.transpose();
        add_bias(&mut hidden, &self.hidden_bias);
        let hidden = hidden.map(logistic);

        let mut output = &hidden * self.output_weights.transpose();
        add_bias(&mut output, &self.output_bias);
        (hidden, output)
    }

    fn train(
        &mut self,
        x: &DMatrix<f64>,
        y: &DMatrix<f64>,
        settings: &PredictorSettings,
    ) -> Result<(), PredictorError> {
        let n = x.nrows() as f64;
        let penalty = settings.alpha / n;
        let report_every = (settings.epochs / 10).max(1);

        let mut hidden_weights_state = AdamState::new(self.hidden_weights.len());
        let mut hidden_bias_state = AdamState::new(self.hidden_bias.len());
        let mut output_weights_state = AdamState::new(self.output_weights.len());
        let mut output_bias_state = AdamState::new(self.output_bias.len());

        for epoch in 0..settings.epochs {
            let (hidden, output) = self.forward(x);
            let error = output - y;

            let loss = error.norm_squared() / (2.0 * n)
                + penalty / 2.0
                    * (self.hidden_weights.norm_squared() + self.output_weights.norm_squared());
            if !loss.is_finite() {
                return Err(PredictorError::NonFiniteLoss { epoch });
            }
            if epoch % report_every == 0 {
                log::debug!("Epoch {}: loss {:.6}", epoch, loss);
            }

            let d_output = error / n;
            let output_weights_grad =
                d_output.transpose() * &hidden + &self.output_weights * penalty;
            let output_bias_grad = column_sums(&d_output);

            let d_hidden = (&d_output * &self.output_weights)
                .component_mul(&hidden.map(|h| h * (1.0 - h)));
            let hidden_weights_grad = d_hidden.transpose() * x + &self.hidden_weights * penalty;
            let hidden_bias_grad = column_sums(&d_hidden);

            let step = (epoch + 1) as i32;
            let lr = settings.learning_rate;
            output_weights_state.update(
                self.output_weights.as_mut_slice(),
                output_weights_grad.as_slice(),
                lr,
                step,
            );
            output_bias_state.update(
                self.output_bias.as_mut_slice(),
                output_bias_grad.as_slice(),
                lr,
                step,
            );
            hidden_weights_state.update(
                self.hidden_weights.as_mut_slice(),
                hidden_weights_grad.as_slice(),
                lr,
                step,
            );
            hidden_bias_state.update(
                self.hidden_bias.as_mut_slice(),
                hidden_bias_grad.as_slice(),
                lr,
                step,
            );
        }

        log::info!(
            "Trained {} hidden units on {} samples for {} epochs",
            settings.hidden_units,
            x.nrows(),
            settings.epochs
        );
        Ok(())
    }
}

/// Glorot-uniform weights and biases for a layer, scaled for a logistic
/// activation.
fn init_layer(rng: &mut StdRng, inputs: usize, outputs: usize) -> (DMatrix<f64>, DVector<f64>) {
    let bound = (2.0 / (inputs + outputs).max(1) as f64).sqrt();
    let weights = DMatrix::from_fn(outputs, inputs, |_, _| rng.gen_range(-bound..=bound));
    let bias = DVector::from_fn(outputs, |_, _| rng.gen_range(-bound..=bound));
    (weights, bias)
}

fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn add_bias(m: &mut DMatrix<f64>, bias: &DVector<f64>) {
    for (j, mut column) in m.column_iter_mut().enumerate() {
        column.add_scalar_mut(bias[j]);
    }
}

fn column_sums(m: &DMatrix<f64>) -> DVector<f64> {
    DVector::from_iterator(m.ncols(), m.column_iter().map(|c| c.sum()))
}

struct AdamState {
    m: Vec<f64>,
    v: Vec<f64>,
}

impl AdamState {
    fn new(len: usize) -> Self {
        Self {
            m: vec![0.0; len],
            v: vec![0.0; len],
        }
    }

    fn update(&mut self, params: &mut [f64], grads: &[f64], lr: f64, step: i32) {
        let m_correction = 1.0 - BETA1.powi(step);
        let v_correction = 1.0 - BETA2.powi(step);
        for (i, (param, grad)) in params.iter_mut().zip(grads).enumerate() {
            self.m[i] = BETA1 * self.m[i] + (1.0 - BETA1) * grad;
            self.v[i] = BETA2 * self.v[i] + (1.0 - BETA2) * grad * grad;
            let m_hat = self.m[i] / m_correction;
            let v_hat = self.v[i] / v_correction;
            *param -= lr * m_hat / (v_hat.sqrt() + EPSILON);
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn settings() -> PredictorSettings {
        PredictorSettings {
            hidden_units: 16,
            alpha: 1e-4,
            epochs: 2000,
            ..Default::default()
        }
    }

    fn linear_data() -> (DMatrix<f64>, DMatrix<f64>) {
        let mut inputs = Vec::new();
        let mut targets = Vec::new();
        for d in (4..=20).step_by(2) {
            for h in -2..=2 {
                let (d, h) = (d as f64, h as f64);
                inputs.extend([d, h, 0.0, 0.0]);
                targets.extend([0.3 + 0.02 * d, -2.0 * h + 0.5 * d]);
            }
        }
        (
            DMatrix::from_row_slice(inputs.len() / 4, 4, &inputs),
            DMatrix::from_row_slice(targets.len() / 2, 2, &targets),
        )
    }

    #[test]
    fn test_scaler() {
        let data = DMatrix::from_row_slice(3, 2, &[1.0, 5.0, 2.0, 5.0, 3.0, 5.0]);
        let scaler = Scaler::fit(&data);
        let scaled = scaler.transform(&data);

        assert_relative_eq!(scaled.column(0).mean(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(scaled.column(0).variance(), 1.0, epsilon = 1e-12);
        // Constant columns are only centered
        assert_eq!(scaled.column(1).sum(), 0.0);
        assert_relative_eq!(scaler.inverse_transform(&scaled), data, epsilon = 1e-12);
    }

    #[test_log::test]
    fn test_fits_linear_targets() {
        let (inputs, targets) = linear_data();
        let mlp = Mlp::fit(&inputs, &targets, &settings()).unwrap();
        let predictions = mlp.predict(&inputs);

        assert_eq!(mlp.input_len(), 4);
        assert_eq!(mlp.output_len(), 2);
        let mse = (predictions - &targets).norm_squared() / targets.len() as f64;
        assert!(mse < 0.05, "mse {}", mse);
    }

    #[test]
    fn test_same_seed_same_model() {
        let (inputs, targets) = linear_data();
        let settings = PredictorSettings {
            epochs: 200,
            ..settings()
        };
        let a = Mlp::fit(&inputs, &targets, &settings).unwrap();
        let b = Mlp::fit(&inputs, &targets, &settings).unwrap();
        assert_eq!(a, b);

        let c = Mlp::fit(
            &inputs,
            &targets,
            &PredictorSettings {
                seed: 7,
                ..settings
            },
        )
        .unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_empty_input() {
        let inputs = DMatrix::<f64>::zeros(0, 4);
        let targets = DMatrix::<f64>::zeros(0, 2);
        assert_eq!(
            Mlp::fit(&inputs, &targets, &settings()),
            Err(PredictorError::EmptyTrainingSet)
        );
    }

    #[test]
    fn test_nan_targets_diverge() {
        let (inputs, mut targets) = linear_data();
        targets[(0, 0)] = f64::NAN;
        assert_eq!(
            Mlp::fit(&inputs, &targets, &settings()),
            Err(PredictorError::NonFiniteLoss { epoch: 0 })
        );
    }
}
