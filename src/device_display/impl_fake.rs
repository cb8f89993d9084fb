use crate::device_display::interface::DeviceDisplay;
use std::error::Error;

#[derive(Debug, Default)]
pub struct DeviceDisplayFake {
    pub statuses: Vec<String>,
    pub counts: Vec<usize>,
    pub predictions: Vec<String>,
    pub camera_enabled: bool,
}

impl DeviceDisplayFake {
    pub fn new(class_count: usize) -> Self {
        Self {
            statuses: Vec::new(),
            counts: vec![0; class_count],
            predictions: Vec::new(),
            camera_enabled: false,
        }
    }

    pub fn last_status(&self) -> Option<&str> {
        self.statuses.last().map(String::as_str)
    }

    pub fn last_prediction(&self) -> Option<&str> {
        self.predictions.last().map(String::as_str)
    }
}

impl DeviceDisplay for DeviceDisplayFake {
    fn write_status(&mut self, text: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.statuses.push(text.to_string());
        Ok(())
    }

    fn write_class_count(
        &mut self,
        class: usize,
        count: usize,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let slot = self
            .counts
            .get_mut(class)
            .ok_or_else(|| format!("Invalid class index {}", class))?;
        *slot = count;
        Ok(())
    }

    fn write_prediction(&mut self, text: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.predictions.push(text.to_string());
        Ok(())
    }

    fn write_camera_enabled(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.camera_enabled = true;
        Ok(())
    }
}
