use crate::feature_extractor::interface::{Embedding, FeatureExtractor};
use image::RgbImage;
use ndarray::Array1;

/// Averages each channel over a `grid` x `grid` layout of cells.
/// Frames of different colours land far apart, which is all tests and offline runs need.
pub struct FeatureExtractorFake {
    grid: u32,
}

impl FeatureExtractorFake {
    pub fn new(grid: u32) -> Self {
        Self { grid: grid.max(1) }
    }
}

impl FeatureExtractor for FeatureExtractorFake {
    fn dimension(&self) -> usize {
        (self.grid * self.grid * 3) as usize
    }

    fn extract(&self, frame: &RgbImage) -> Result<Embedding, Box<dyn std::error::Error + Send + Sync>> {
        let (width, height) = frame.dimensions();
        if width < self.grid || height < self.grid {
            return Err(format!(
                "frame {}x{} is smaller than the {}x{} grid",
                width, height, self.grid, self.grid
            )
            .into());
        }

        let mut sums = vec![0.0f32; self.dimension()];
        let mut counts = vec![0u32; (self.grid * self.grid) as usize];

        for (x, y, pixel) in frame.enumerate_pixels() {
            let cell = ((y * self.grid / height) * self.grid + x * self.grid / width) as usize;
            counts[cell] += 1;
            for c in 0..3 {
                sums[cell * 3 + c] += pixel[c] as f32 / 255.0;
            }
        }

        let embedding = sums
            .iter()
            .enumerate()
            .map(|(i, sum)| sum / counts[i / 3].max(1) as f32)
            .collect::<Vec<f32>>();

        Ok(Array1::from(embedding))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_solid_frame_gives_channel_means() {
        let extractor = FeatureExtractorFake::new(2);
        let frame = RgbImage::from_pixel(8, 6, Rgb([255, 0, 51]));

        let embedding = extractor.extract(&frame).unwrap();

        assert_eq!(embedding.len(), extractor.dimension());
        for cell in 0..4 {
            assert!((embedding[cell * 3] - 1.0).abs() < 1e-6);
            assert!(embedding[cell * 3 + 1].abs() < 1e-6);
            assert!((embedding[cell * 3 + 2] - 0.2).abs() < 1e-6);
        }
    }

    #[test]
    fn test_frame_smaller_than_grid_is_rejected() {
        let extractor = FeatureExtractorFake::new(4);
        assert!(extractor.extract(&RgbImage::new(2, 2)).is_err());
    }
}
