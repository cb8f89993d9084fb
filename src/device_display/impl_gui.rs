use crate::device_display::interface::DeviceDisplay;
use crate::studio::core::Event;
use crate::studio::render::class_count_text;
use eframe::egui;
use std::error::Error;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, Default)]
struct Panel {
    status: String,
    counts: Vec<usize>,
    prediction: String,
    camera_enabled: bool,
}

/// Window that doubles as the studio's input surface.
pub struct StudioWindow {
    class_names: Vec<String>,
    panel: Arc<Mutex<Panel>>,
    events: Sender<Event>,
    held: Vec<bool>,
}

impl eframe::App for StudioWindow {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let panel = match self.panel.lock() {
            Ok(panel) => panel.clone(),
            Err(_) => return,
        };

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Webcam transfer learning");
            ui.label(&panel.status);
            ui.add_space(8.0);

            if !panel.camera_enabled && ui.button("Enable webcam").clicked() {
                let _ = self.events.send(Event::EnableCameraPressed);
            }

            ui.add_space(8.0);
            for class in 0..self.class_names.len() {
                ui.horizontal(|ui| {
                    let response = ui.button(format!("Gather {}", self.class_names[class]));

                    // Press starts gathering and release stops it; both are the same toggle.
                    let down = response.is_pointer_button_down_on();
                    if down != self.held[class] {
                        self.held[class] = down;
                        let _ = self.events.send(Event::CaptureToggled(class));
                    }

                    let count = panel.counts.get(class).copied().unwrap_or(0);
                    ui.label(class_count_text(count));
                });
            }

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("Train & Predict!").clicked() {
                    let _ = self.events.send(Event::TrainPressed);
                }
                if ui.button("Reset").clicked() {
                    let _ = self.events.send(Event::ResetPressed);
                }
            });

            ui.add_space(12.0);
            ui.label(egui::RichText::new(&panel.prediction).strong().size(20.0));
        });

        ctx.request_repaint_after(Duration::from_millis(33));
    }
}

/// Clones share one panel, so a clone can drive the window while the studio writes to another.
#[derive(Clone)]
pub struct DeviceDisplayGui {
    class_names: Vec<String>,
    panel: Arc<Mutex<Panel>>,
}

impl DeviceDisplayGui {
    pub fn new(class_names: Vec<String>) -> Self {
        let panel = Panel {
            counts: vec![0; class_names.len()],
            ..Panel::default()
        };
        Self {
            class_names,
            panel: Arc::new(Mutex::new(panel)),
        }
    }

    pub fn window(&self, events: Sender<Event>) -> StudioWindow {
        StudioWindow {
            class_names: self.class_names.clone(),
            panel: self.panel.clone(),
            events,
            held: vec![false; self.class_names.len()],
        }
    }

    /// Blocks the calling thread until the window is closed.
    pub fn run_window(&self, events: Sender<Event>) -> Result<(), Box<dyn Error + Send + Sync>> {
        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default().with_inner_size([420.0, 320.0]),
            ..Default::default()
        };
        let window = self.window(events);

        eframe::run_native(
            "Webcam Transfer Studio",
            options,
            Box::new(|_cc| Box::new(window)),
        )
        .map_err(|e| e.to_string())?;
        Ok(())
    }
}

impl DeviceDisplay for DeviceDisplayGui {
    fn write_status(&mut self, text: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut panel = self.panel.lock().map_err(|e| e.to_string())?;
        panel.status = text.to_string();
        Ok(())
    }

    fn write_class_count(
        &mut self,
        class: usize,
        count: usize,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut panel = self.panel.lock().map_err(|e| e.to_string())?;
        let slot = panel
            .counts
            .get_mut(class)
            .ok_or_else(|| format!("Invalid class index {}", class))?;
        *slot = count;
        Ok(())
    }

    fn write_prediction(&mut self, text: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut panel = self.panel.lock().map_err(|e| e.to_string())?;
        panel.prediction = text.to_string();
        Ok(())
    }

    fn write_camera_enabled(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut panel = self.panel.lock().map_err(|e| e.to_string())?;
        panel.camera_enabled = true;
        Ok(())
    }
}
