pub mod adam;
pub mod head;
pub mod loss;
pub mod trainer;

use ndarray::{Array1, ArrayView1};
use std::fmt;
use std::sync::Arc;

pub trait Classifier: Send + Sync {
    fn class_count(&self) -> usize;

    /// Probability distribution over classes for one embedding.
    fn predict(
        &self,
        embedding: ArrayView1<f32>,
    ) -> Result<Array1<f32>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Shared handle to a fitted classifier. Two handles are equal when they point at the same model.
#[derive(Clone)]
pub struct ClassifierHandle(Arc<dyn Classifier>);

impl ClassifierHandle {
    pub fn new(classifier: impl Classifier + 'static) -> Self {
        Self(Arc::new(classifier))
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.0.as_ref()
    }
}

impl PartialEq for ClassifierHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ClassifierHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassifierHandle({} classes)", self.0.class_count())
    }
}

/// Index of the largest value; ties go to the lowest index. `None` when empty or all NaN.
pub fn argmax(values: ArrayView1<f32>) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &value) in values.iter().enumerate() {
        if value.is_nan() {
            continue;
        }
        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((i, value)),
        }
    }
    best.map(|(i, _)| i)
}
