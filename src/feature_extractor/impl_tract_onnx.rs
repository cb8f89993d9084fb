use crate::feature_extractor::image::resize_frame_to_tensor;
use crate::feature_extractor::interface::{Embedding, FeatureExtractor};
use crate::library::logger::interface::Logger;
use image::RgbImage;
use std::path::Path;
use std::sync::Arc;
use tract_onnx::prelude::*;

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractorConfig {
    pub input_width: u32,
    pub input_height: u32,
    /// Graph node whose output is the embedding. The classifier layers after it are cut off.
    pub output_name: String,
    pub dimension: usize,
}

/// Runs an ONNX image model up to its pooled features and uses them as the embedding.
pub struct FeatureExtractorTractOnnx {
    model: SimplePlan<TypedFact, Box<dyn TypedOp>, TypedModel>,
    config: ExtractorConfig,
    dimension: usize,
}

impl FeatureExtractorTractOnnx {
    pub fn load(
        model_path: &Path,
        config: ExtractorConfig,
        logger: Arc<dyn Logger + Send + Sync>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let logger = logger.with_namespace("feature_extractor");
        logger.info(&format!("Loading {}", model_path.display()))?;

        let input_shape = [
            1,
            3,
            config.input_height as usize,
            config.input_width as usize,
        ];
        let model = tract_onnx::onnx()
            .model_for_path(model_path)?
            .with_input_fact(0, f32::fact(input_shape).into())?
            .with_output_names([config.output_name.as_str()])?
            .into_optimized()?
            .into_runnable()?;

        let mut extractor = Self {
            model,
            config,
            dimension: 0,
        };

        // Warm up on an all-black frame; this also fixes the embedding length.
        let blank = RgbImage::new(extractor.config.input_width, extractor.config.input_height);
        let warm_up = extractor.run(&blank)?;
        check_dimension(&extractor.config, warm_up.len())?;
        extractor.dimension = warm_up.len();
        logger.info(&format!(
            "Warm-up output shape of {}: [1, {}]",
            extractor.config.output_name, extractor.dimension
        ))?;

        Ok(extractor)
    }

    fn run(&self, frame: &RgbImage) -> Result<Embedding, Box<dyn std::error::Error + Send + Sync>> {
        let input =
            resize_frame_to_tensor(frame, self.config.input_width, self.config.input_height);
        let outputs = self.model.run(tvec!(input.into_tvalue()))?;
        let output = outputs
            .first()
            .ok_or("feature extractor produced no output")?
            .to_array_view::<f32>()?;
        Ok(output.iter().copied().collect())
    }
}

impl FeatureExtractor for FeatureExtractorTractOnnx {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn extract(&self, frame: &RgbImage) -> Result<Embedding, Box<dyn std::error::Error + Send + Sync>> {
        self.run(frame)
    }
}

fn check_dimension(
    config: &ExtractorConfig,
    found: usize,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    if found != config.dimension {
        return Err(format!(
            "{} produced {} values, expected a {}-value feature vector",
            config.output_name, found, config.dimension
        )
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn default_config() -> ExtractorConfig {
        let config = Config::default();
        ExtractorConfig {
            input_width: config.extractor_input_width,
            input_height: config.extractor_input_height,
            output_name: config.extractor_output_name,
            dimension: config.extractor_dimension,
        }
    }

    #[test]
    fn test_default_reads_pooled_features() {
        let config = default_config();
        assert_eq!(config.output_name, "mobilenetv20_features_pool0_fwd");
        assert_eq!(config.dimension, 1280);
    }

    #[test]
    fn test_class_scores_are_rejected() {
        let config = default_config();
        assert!(check_dimension(&config, 1280).is_ok());

        let err = check_dimension(&config, 1000).unwrap_err();
        assert!(err.to_string().contains("produced 1000 values"));
    }
}
