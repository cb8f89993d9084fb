use crate::classifier::adam::AdamConfig;
use crate::classifier::argmax;
use crate::classifier::head::ClassifierHead;
use crate::classifier::loss::Loss;
use crate::config::TrainerConfig;
use crate::sample_buffer::SampleBuffer;
use ndarray::{Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrainError {
    #[error("no samples collected")]
    NoSamples,
    #[error("need at least two classes, got {0}")]
    TooFewClasses(usize),
    #[error("no samples collected for {}", .0.join(", "))]
    MissingClassSamples(Vec<String>),
    #[error("embeddings have mixed lengths ({expected} and {found})")]
    DimensionMismatch { expected: usize, found: usize },
}

/// The whole buffer stacked into dense arrays, in shuffled order.
/// Owned by a single training run and dropped as soon as the run ends.
#[derive(Debug)]
pub struct TrainingSet {
    inputs: Array2<f32>,
    encoded_labels: Array2<f32>,
    labels: Vec<usize>,
    loss: Loss,
    class_count: usize,
}

impl TrainingSet {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn input_dim(&self) -> usize {
        self.inputs.ncols()
    }

    pub fn loss(&self) -> Loss {
        self.loss
    }

    pub fn encoded_labels(&self) -> &Array2<f32> {
        &self.encoded_labels
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EpochLog {
    pub epoch: usize,
    pub loss: f32,
    pub accuracy: f32,
}

pub struct Trainer {
    config: TrainerConfig,
    rng: StdRng,
}

impl Trainer {
    pub fn new(config: TrainerConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        Self { config, rng }
    }

    /// Checks the buffer can be trained on and stacks a shuffled copy of it.
    pub fn prepare(
        &mut self,
        buffer: &SampleBuffer,
        class_names: &[String],
    ) -> Result<TrainingSet, TrainError> {
        let class_count = buffer.class_count();
        if class_count < 2 {
            return Err(TrainError::TooFewClasses(class_count));
        }
        if buffer.is_empty() {
            return Err(TrainError::NoSamples);
        }

        let missing: Vec<String> = (0..class_count)
            .filter(|&class| buffer.count(class) == 0)
            .map(|class| {
                class_names
                    .get(class)
                    .cloned()
                    .unwrap_or_else(|| format!("class {}", class))
            })
            .collect();
        if !missing.is_empty() {
            return Err(TrainError::MissingClassSamples(missing));
        }

        let view = buffer.shuffled_view(&mut self.rng);
        let input_dim = view.embeddings[0].len();
        let mut inputs = Array2::zeros((view.embeddings.len(), input_dim));
        for (mut row, embedding) in inputs.rows_mut().into_iter().zip(&view.embeddings) {
            if embedding.len() != input_dim {
                return Err(TrainError::DimensionMismatch {
                    expected: input_dim,
                    found: embedding.len(),
                });
            }
            row.assign(*embedding);
        }

        let loss = Loss::for_class_count(class_count);
        let encoded_labels = loss.encode_labels(&view.labels, class_count);

        Ok(TrainingSet {
            inputs,
            encoded_labels,
            labels: view.labels,
            loss,
            class_count,
        })
    }

    /// Trains a fresh head on `set`, reporting each pass to `on_epoch`.
    /// The set is consumed; its arrays are freed before this returns.
    pub fn fit(
        &mut self,
        set: TrainingSet,
        mut on_epoch: impl FnMut(&EpochLog),
    ) -> ClassifierHead {
        let mut head = ClassifierHead::new(
            set.input_dim(),
            self.config.hidden_units,
            set.class_count,
            &mut self.rng,
        );
        let mut optimizer = head.optimizer(AdamConfig::with_learning_rate(self.config.learning_rate));
        let targets = set.loss.softmax_targets(&set.encoded_labels);
        let batch_size = self.config.batch_size.max(1);
        let mut order: Vec<usize> = (0..set.len()).collect();

        for epoch in 0..self.config.epochs {
            self.shuffle_order(&mut order);

            let mut loss_sum = 0.0;
            let mut correct = 0;
            for batch in order.chunks(batch_size) {
                let inputs = set.inputs.select(Axis(0), batch);
                let batch_targets = targets.select(Axis(0), batch);
                let batch_encoded = set.encoded_labels.select(Axis(0), batch);

                let probabilities =
                    head.train_step(&mut optimizer, inputs.view(), batch_targets.view());

                loss_sum += set.loss.value(&probabilities, &batch_encoded) * batch.len() as f32;
                correct += probabilities
                    .rows()
                    .into_iter()
                    .zip(batch)
                    .filter(|(row, &index)| argmax(*row) == Some(set.labels[index]))
                    .count();
            }

            let samples = set.len().max(1) as f32;
            let log = EpochLog {
                epoch,
                loss: loss_sum / samples,
                accuracy: correct as f32 / samples,
            };
            on_epoch(&log);
        }

        drop(targets);
        drop(set);
        head
    }

    /// Reorders one epoch's sample indices; left alone when shuffling is off.
    fn shuffle_order(&mut self, order: &mut [usize]) {
        if self.config.shuffle {
            order.shuffle(&mut self.rng);
        }
    }
}
