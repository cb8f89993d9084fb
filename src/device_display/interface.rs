use std::error::Error;

/// The text surfaces of the studio: a status line, one counter per class and the prediction line.
pub trait DeviceDisplay: Send + Sync {
    fn write_status(&mut self, text: &str) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Shows the number of samples collected for `class`.
    fn write_class_count(
        &mut self,
        class: usize,
        count: usize,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;

    fn write_prediction(&mut self, text: &str) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// The camera is streaming, so there is nothing left to enable.
    fn write_camera_enabled(&mut self) -> Result<(), Box<dyn Error + Send + Sync>>;
}
