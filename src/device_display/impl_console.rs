use crate::device_display::interface::DeviceDisplay;
use crate::studio::render::class_count_text;
use std::error::Error;

pub struct DeviceDisplayConsole {
    class_names: Vec<String>,
    status: String,
    counts: Vec<usize>,
    prediction: String,
}

impl DeviceDisplayConsole {
    pub fn new(class_names: Vec<String>) -> Self {
        let counts = vec![0; class_names.len()];
        Self {
            class_names,
            status: String::new(),
            counts,
            prediction: String::new(),
        }
    }

    fn render_display(&self) {
        println!("┌────────────────────────────────────────┐");
        println!("│ {:<38} │", self.status);
        for (name, count) in self.class_names.iter().zip(&self.counts) {
            println!("│ {:<38} │", format!("{}: {}", name, class_count_text(*count)));
        }
        println!("│ {:<38} │", self.prediction);
        println!("└────────────────────────────────────────┘");
    }
}

impl DeviceDisplay for DeviceDisplayConsole {
    fn write_status(&mut self, text: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.status = text.to_string();
        self.render_display();
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
        self.render_display();
        Ok(())
    }

    fn write_prediction(&mut self, text: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        // The prediction line changes every frame; only redraw when it does.
        if self.prediction != text {
            self.prediction = text.to_string();
            self.render_display();
        }
        Ok(())
    }

    fn write_camera_enabled(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        println!("Webcam enabled");
        Ok(())
    }
}
