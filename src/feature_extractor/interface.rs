use image::RgbImage;
use ndarray::Array1;

pub type Embedding = Array1<f32>;

/// A frozen, pretrained mapping from a frame to a fixed-length embedding.
pub trait FeatureExtractor {
    fn dimension(&self) -> usize;
    fn extract(&self, frame: &RgbImage) -> Result<Embedding, Box<dyn std::error::Error + Send + Sync>>;
}
