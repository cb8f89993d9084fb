use crate::classifier::adam::{AdamConfig, Moments};
use crate::classifier::Classifier;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, Ix1, Ix2, Zip};
use rand::distr::{Distribution, Uniform};
use rand::Rng;

#[derive(Debug, Clone, PartialEq)]
pub struct Dense {
    pub weights: Array2<f32>,
    pub bias: Array1<f32>,
}

impl Dense {
    /// Glorot-uniform weights, zero bias.
    fn glorot<R: Rng + ?Sized>(inputs: usize, outputs: usize, rng: &mut R) -> Self {
        let limit = (6.0 / (inputs + outputs) as f32).sqrt();
        let weights = match Uniform::new(-limit, limit) {
            Ok(dist) => Array2::from_shape_fn((inputs, outputs), |_| dist.sample(rng)),
            Err(_) => Array2::zeros((inputs, outputs)),
        };
        Self {
            weights,
            bias: Array1::zeros(outputs),
        }
    }

    fn forward(&self, inputs: ArrayView2<f32>) -> Array2<f32> {
        inputs.dot(&self.weights) + &self.bias
    }

    fn parameter_count(&self) -> usize {
        self.weights.len() + self.bias.len()
    }
}

/// Intermediate activations of one forward pass, kept for backpropagation.
struct Activations {
    hidden_pre: Array2<f32>,
    hidden: Array2<f32>,
    probabilities: Array2<f32>,
}

/// Optimiser state for every parameter of a head.
#[derive(Debug, Clone)]
pub struct HeadOptimizer {
    config: AdamConfig,
    step: i32,
    hidden_weights: Moments<Ix2>,
    hidden_bias: Moments<Ix1>,
    output_weights: Moments<Ix2>,
    output_bias: Moments<Ix1>,
}

/// Dense(ReLU) followed by Dense(softmax).
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierHead {
    hidden: Dense,
    output: Dense,
}

impl ClassifierHead {
    pub fn new<R: Rng + ?Sized>(
        input_dim: usize,
        hidden_units: usize,
        class_count: usize,
        rng: &mut R,
    ) -> Self {
        Self {
            hidden: Dense::glorot(input_dim, hidden_units, rng),
            output: Dense::glorot(hidden_units, class_count, rng),
        }
    }

    pub fn input_dim(&self) -> usize {
        self.hidden.weights.nrows()
    }

    pub fn parameter_count(&self) -> usize {
        self.hidden.parameter_count() + self.output.parameter_count()
    }

    pub fn summary(&self) -> String {
        format!(
            "dense_relu [{} -> {}] ({} params), dense_softmax [{} -> {}] ({} params), total {}",
            self.hidden.weights.nrows(),
            self.hidden.weights.ncols(),
            self.hidden.parameter_count(),
            self.output.weights.nrows(),
            self.output.weights.ncols(),
            self.output.parameter_count(),
            self.parameter_count()
        )
    }

    pub fn optimizer(&self, config: AdamConfig) -> HeadOptimizer {
        HeadOptimizer {
            config,
            step: 0,
            hidden_weights: Moments::zeros_like(&self.hidden.weights),
            hidden_bias: Moments::zeros_like(&self.hidden.bias),
            output_weights: Moments::zeros_like(&self.output.weights),
            output_bias: Moments::zeros_like(&self.output.bias),
        }
    }

    fn forward(&self, inputs: ArrayView2<f32>) -> Activations {
        let hidden_pre = self.hidden.forward(inputs);
        let hidden = hidden_pre.mapv(|v| v.max(0.0));
        let probabilities = softmax_rows(self.output.forward(hidden.view()));
        Activations {
            hidden_pre,
            hidden,
            probabilities,
        }
    }

    pub fn predict_batch(&self, inputs: ArrayView2<f32>) -> Array2<f32> {
        self.forward(inputs).probabilities
    }

    /// One optimiser step on a batch. `targets` are per-class rows matching the softmax output.
    /// Returns the batch probabilities from before the update.
    pub fn train_step(
        &mut self,
        optimizer: &mut HeadOptimizer,
        inputs: ArrayView2<f32>,
        targets: ArrayView2<f32>,
    ) -> Array2<f32> {
        let Activations {
            hidden_pre,
            hidden,
            probabilities,
        } = self.forward(inputs);
        let rows = inputs.nrows().max(1) as f32;

        // Softmax with cross-entropy collapses to (p - y).
        let d_logits = (&probabilities - &targets) / rows;
        let grad_output_weights = hidden.t().dot(&d_logits);
        let grad_output_bias = d_logits.sum_axis(Axis(0));

        let mut d_hidden = d_logits.dot(&self.output.weights.t());
        Zip::from(&mut d_hidden)
            .and(&hidden_pre)
            .for_each(|d, &z| {
                if z <= 0.0 {
                    *d = 0.0;
                }
            });
        let grad_hidden_weights = inputs.t().dot(&d_hidden);
        let grad_hidden_bias = d_hidden.sum_axis(Axis(0));

        optimizer.step += 1;
        let (config, step) = (optimizer.config, optimizer.step);
        optimizer.output_weights.update(
            &config,
            step,
            &mut self.output.weights,
            &grad_output_weights,
        );
        optimizer
            .output_bias
            .update(&config, step, &mut self.output.bias, &grad_output_bias);
        optimizer.hidden_weights.update(
            &config,
            step,
            &mut self.hidden.weights,
            &grad_hidden_weights,
        );
        optimizer
            .hidden_bias
            .update(&config, step, &mut self.hidden.bias, &grad_hidden_bias);

        probabilities
    }
}

impl Classifier for ClassifierHead {
    fn class_count(&self) -> usize {
        self.output.weights.ncols()
    }

    fn predict(
        &self,
        embedding: ArrayView1<f32>,
    ) -> Result<Array1<f32>, Box<dyn std::error::Error + Send + Sync>> {
        if embedding.len() != self.input_dim() {
            return Err(format!(
                "embedding has {} values, classifier expects {}",
                embedding.len(),
                self.input_dim()
            )
            .into());
        }
        let batch = embedding.insert_axis(Axis(0));
        let probabilities = self.predict_batch(batch);
        Ok(probabilities.row(0).to_owned())
    }
}

fn softmax_rows(mut logits: Array2<f32>) -> Array2<f32> {
    for mut row in logits.rows_mut() {
        let max = row.fold(f32::NEG_INFINITY, |acc, &v| acc.max(v));
        row.mapv_inplace(|v| (v - max).exp());
        let sum = row.sum();
        row.mapv_inplace(|v| v / sum);
    }
    logits
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_softmax_rows_sum_to_one() {
        let probabilities = softmax_rows(array![[1.0, 2.0, 3.0], [1000.0, 1000.0, 1000.0]]);
        for row in probabilities.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-5);
        }
        assert!((probabilities[[1, 0]] - 1.0 / 3.0).abs() < 1e-5);
        assert!(probabilities[[0, 2]] > probabilities[[0, 1]]);
    }

    #[test]
    fn test_predict_returns_distribution() {
        let mut rng = StdRng::seed_from_u64(3);
        let head = ClassifierHead::new(4, 8, 3, &mut rng);

        let probabilities = head.predict(array![0.1, 0.2, 0.3, 0.4].view()).unwrap();

        assert_eq!(probabilities.len(), 3);
        assert!((probabilities.sum() - 1.0).abs() < 1e-5);
        assert_eq!(head.class_count(), 3);
        assert_eq!(head.parameter_count(), 4 * 8 + 8 + 8 * 3 + 3);
    }

    #[test]
    fn test_predict_rejects_wrong_dimension() {
        let mut rng = StdRng::seed_from_u64(3);
        let head = ClassifierHead::new(4, 8, 2, &mut rng);
        assert!(head.predict(array![1.0, 2.0].view()).is_err());
    }

    #[test]
    fn test_train_steps_reduce_loss() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut head = ClassifierHead::new(2, 16, 2, &mut rng);
        let mut optimizer = head.optimizer(AdamConfig::with_learning_rate(0.05));

        let inputs = array![[1.0, 0.0], [0.0, 1.0]];
        let targets = array![[1.0, 0.0], [0.0, 1.0]];
        let error = |p: &Array2<f32>| (p - &targets).mapv(f32::abs).sum();

        let before = error(&head.predict_batch(inputs.view()));
        for _ in 0..50 {
            head.train_step(&mut optimizer, inputs.view(), targets.view());
        }
        let after = error(&head.predict_batch(inputs.view()));

        assert!(after < before);
        assert!(after < 0.5);
    }
}
