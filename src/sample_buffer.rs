use crate::feature_extractor::interface::Embedding;
use rand::seq::SliceRandom;
use rand::Rng;

/// Collected (embedding, class) pairs plus the per-class counters shown to the user.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    embeddings: Vec<Embedding>,
    labels: Vec<usize>,
    counts: Vec<usize>,
}

/// Borrowed, permuted view of a buffer. `embeddings[i]` still belongs to `labels[i]`.
#[derive(Debug)]
pub struct ShuffledView<'a> {
    pub embeddings: Vec<&'a Embedding>,
    pub labels: Vec<usize>,
}

impl SampleBuffer {
    pub fn new(class_count: usize) -> Self {
        Self {
            embeddings: Vec::new(),
            labels: Vec::new(),
            counts: vec![0; class_count],
        }
    }

    /// Returns the new count for `class`.
    ///
    /// Panics if `class` is not one of the classes the buffer was created with.
    pub fn append(&mut self, embedding: Embedding, class: usize) -> usize {
        self.counts[class] += 1;
        self.embeddings.push(embedding);
        self.labels.push(class);
        self.counts[class]
    }

    /// Drops every embedding and zeroes all counters. Returns how many samples were released.
    pub fn clear(&mut self) -> usize {
        let released = self.embeddings.len();
        self.embeddings = Vec::new();
        self.labels = Vec::new();
        self.counts.iter_mut().for_each(|count| *count = 0);
        released
    }

    pub fn shuffled_view<R: Rng + ?Sized>(&self, rng: &mut R) -> ShuffledView<'_> {
        let mut order: Vec<usize> = (0..self.embeddings.len()).collect();
        order.shuffle(rng);

        ShuffledView {
            embeddings: order.iter().map(|&i| &self.embeddings[i]).collect(),
            labels: order.iter().map(|&i| self.labels[i]).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.embeddings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.embeddings.is_empty()
    }

    pub fn class_count(&self) -> usize {
        self.counts.len()
    }

    pub fn count(&self, class: usize) -> usize {
        self.counts.get(class).copied().unwrap_or(0)
    }

    pub fn counts(&self) -> &[usize] {
        &self.counts
    }
}
