use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct TrainerConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub hidden_units: usize,
    pub learning_rate: f32,
    pub shuffle: bool,
    pub seed: Option<u64>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            epochs: 10,
            batch_size: 5,
            hidden_units: 128,
            learning_rate: 0.001,
            shuffle: true,
            seed: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub class_names: Vec<String>,
    pub camera_width: u32,
    pub camera_height: u32,
    pub extractor_input_width: u32,
    pub extractor_input_height: u32,
    pub extractor_model_url: String,
    pub extractor_model_path: PathBuf,
    pub extractor_output_name: String,
    pub extractor_dimension: usize,
    pub refresh_rate: Duration,
    pub logger_timezone: chrono::FixedOffset,
    pub trainer: TrainerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            class_names: vec!["Class 1".to_string(), "Class 2".to_string()],
            camera_width: 640,
            camera_height: 480,
            extractor_input_width: 224,
            extractor_input_height: 224,
            extractor_model_url: "https://github.com/onnx/models/raw/main/validated/vision/classification/mobilenet/model/mobilenetv2-7.onnx".to_string(),
            extractor_model_path: PathBuf::from("models/mobilenetv2-7.onnx"),
            // Global average pool, ahead of the 1000-way ImageNet head.
            extractor_output_name: "mobilenetv20_features_pool0_fwd".to_string(),
            extractor_dimension: 1280,
            refresh_rate: Duration::from_millis(16),
            logger_timezone: local_timezone(),
            trainer: TrainerConfig::default(),
        }
    }
}

impl Config {
    pub fn class_count(&self) -> usize {
        self.class_names.len()
    }
}

fn local_timezone() -> chrono::FixedOffset {
    *chrono::Local::now().offset()
}
