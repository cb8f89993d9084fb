use ndarray::{Array2, Axis};

const EPSILON: f32 = 1e-7;

/// Two classes train against a single 0/1 target; more classes against one-hot rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loss {
    Binary,
    Categorical,
}

impl Loss {
    pub fn for_class_count(class_count: usize) -> Self {
        if class_count == 2 {
            Loss::Binary
        } else {
            Loss::Categorical
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Loss::Binary => "binaryCrossentropy",
            Loss::Categorical => "categoricalCrossentropy",
        }
    }

    /// Binary: shape `(n, 1)` holding 1.0 for class 1. Categorical: shape `(n, class_count)` one-hot.
    pub fn encode_labels(&self, labels: &[usize], class_count: usize) -> Array2<f32> {
        match self {
            Loss::Binary => Array2::from_shape_fn((labels.len(), 1), |(row, _)| {
                if labels[row] == 1 {
                    1.0
                } else {
                    0.0
                }
            }),
            Loss::Categorical => {
                Array2::from_shape_fn((labels.len(), class_count), |(row, column)| {
                    if labels[row] == column {
                        1.0
                    } else {
                        0.0
                    }
                })
            }
        }
    }

    /// Per-class targets matching the softmax output, used for the gradient.
    pub fn softmax_targets(&self, encoded: &Array2<f32>) -> Array2<f32> {
        match self {
            Loss::Binary => Array2::from_shape_fn((encoded.nrows(), 2), |(row, column)| {
                let positive = encoded[[row, 0]];
                if column == 1 {
                    positive
                } else {
                    1.0 - positive
                }
            }),
            Loss::Categorical => encoded.clone(),
        }
    }

    /// Mean loss over the rows of `probabilities`.
    pub fn value(&self, probabilities: &Array2<f32>, encoded: &Array2<f32>) -> f32 {
        let rows = probabilities.nrows().max(1) as f32;
        match self {
            Loss::Binary => {
                let positive = probabilities.column(1);
                positive
                    .iter()
                    .zip(encoded.column(0).iter())
                    .map(|(&p, &y)| {
                        let p = p.clamp(EPSILON, 1.0 - EPSILON);
                        -(y * p.ln() + (1.0 - y) * (1.0 - p).ln())
                    })
                    .sum::<f32>()
                    / rows
            }
            Loss::Categorical => {
                let clipped = probabilities.mapv(|p| p.clamp(EPSILON, 1.0).ln());
                -(clipped * encoded).sum_axis(Axis(1)).sum() / rows
            }
        }
    }
}
