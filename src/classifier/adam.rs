use ndarray::{Array, Dimension, Zip};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdamConfig {
    pub learning_rate: f32,
    pub beta1: f32,
    pub beta2: f32,
    pub epsilon: f32,
}

impl AdamConfig {
    pub fn with_learning_rate(learning_rate: f32) -> Self {
        Self {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-7,
        }
    }
}

/// First and second moment estimates for one parameter array.
#[derive(Debug, Clone)]
pub struct Moments<D: Dimension> {
    first: Array<f32, D>,
    second: Array<f32, D>,
}

impl<D: Dimension> Moments<D> {
    pub fn zeros_like(parameter: &Array<f32, D>) -> Self {
        Self {
            first: Array::zeros(parameter.raw_dim()),
            second: Array::zeros(parameter.raw_dim()),
        }
    }

    /// `step` counts from 1.
    pub fn update(
        &mut self,
        config: &AdamConfig,
        step: i32,
        parameter: &mut Array<f32, D>,
        gradient: &Array<f32, D>,
    ) {
        let AdamConfig {
            learning_rate,
            beta1,
            beta2,
            epsilon,
        } = *config;

        self.first
            .zip_mut_with(gradient, |m, &g| *m = beta1 * *m + (1.0 - beta1) * g);
        self.second
            .zip_mut_with(gradient, |v, &g| *v = beta2 * *v + (1.0 - beta2) * g * g);

        let first_correction = 1.0 - beta1.powi(step);
        let second_correction = 1.0 - beta2.powi(step);

        Zip::from(parameter)
            .and(&self.first)
            .and(&self.second)
            .for_each(|p, &m, &v| {
                let m_hat = m / first_correction;
                let v_hat = v / second_correction;
                *p -= learning_rate * m_hat / (v_hat.sqrt() + epsilon);
            });
    }
}
