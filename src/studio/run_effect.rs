use super::main::Studio;
use crate::classifier::trainer::Trainer;
use crate::classifier::ClassifierHandle;
use crate::device_camera::interface::{CameraError, DeviceCamera, DeviceCameraEvent};
use crate::device_display::interface::DeviceDisplay;
use crate::studio::core::{Effect, Event, Source};
use crate::studio::render::prediction_text;
use std::error::Error;
use std::sync::Arc;

impl Studio {
    pub(super) fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::EnableCamera => self.enable_camera(),
            Effect::WatchSource(source) => self.watch_source(source),
            Effect::RequestFrame(task) => {
                let sender = self.event_sender.clone();
                self.frame_scheduler.request_frame(Box::new(move || {
                    let _ = sender.send(Event::Frame(task));
                }));
            }
            Effect::CaptureSample { class } => self.capture_sample(class),
            Effect::Predict => self.predict(),
            Effect::Train => self.train(),
            Effect::InstallClassifier(classifier) => {
                self.classifier = Some(classifier);
            }
            Effect::ClearSamples => {
                let released = self.samples.clear();
                for class in 0..self.samples.class_count() {
                    self.render_class_count(class, 0);
                }
                let _ = self
                    .logger
                    .info(&format!("Released {} buffered embeddings", released));
            }
            Effect::RenderStatus(text) => {
                self.write_display("status", |display| display.write_status(&text));
            }
            Effect::RenderCameraEnabled => {
                self.write_display("camera state", |display| display.write_camera_enabled());
            }
            Effect::Warn(message) => {
                let _ = self.logger.warn(&message);
            }
            Effect::StopCameras => {
                for camera in self.all_cameras() {
                    if let Err(e) = camera.stop() {
                        let _ = self.logger.warn(&format!("Failed to stop camera: {}", e));
                    }
                }
            }
        }
    }

    fn all_cameras(&self) -> Vec<Arc<dyn DeviceCamera + Send + Sync>> {
        let mut cameras = self.class_cameras.clone();
        cameras.push(self.prediction_camera.clone());
        cameras
    }

    fn camera_for(&self, source: Source) -> Option<Arc<dyn DeviceCamera + Send + Sync>> {
        match source {
            Source::Class(class) => self.class_cameras.get(class).cloned(),
            Source::Prediction => Some(self.prediction_camera.clone()),
        }
    }

    fn enable_camera(&self) {
        let cameras = self.all_cameras();
        let sender = self.event_sender.clone();

        // Opening a device can block on permission prompts; keep it off the studio thread.
        std::thread::spawn(move || {
            let result = if cameras.iter().all(|camera| camera.is_supported()) {
                cameras
                    .iter()
                    .try_for_each(|camera| camera.open())
            } else {
                Err(CameraError::Unsupported)
            };
            let _ = sender.send(Event::CameraEnableDone(result));
        });
    }

    fn watch_source(&self, source: Source) {
        let Some(camera) = self.camera_for(source) else {
            return;
        };
        let sender = self.event_sender.clone();
        let events = camera.events();

        std::thread::spawn(move || {
            for event in events {
                if event == DeviceCameraEvent::DataLoaded {
                    let _ = sender.send(Event::SourceReady(source));
                    return;
                }
            }
        });
    }

    fn write_display(
        &self,
        what: &str,
        write: impl FnOnce(&mut (dyn DeviceDisplay + Send + Sync)) -> Result<(), Box<dyn Error + Send + Sync>>,
    ) {
        let result = match self.device_display.lock() {
            Ok(mut display) => write(&mut *display),
            Err(e) => Err(e.to_string().into()),
        };
        if let Err(e) = result {
            let _ = self.logger.warn(&format!("Failed to render {}: {}", what, e));
        }
    }

    pub(super) fn render_class_count(&self, class: usize, count: usize) {
        self.write_display("class count", |display| display.write_class_count(class, count));
    }

    fn capture_sample(&mut self, class: usize) {
        let Some(camera) = self.class_cameras.get(class).cloned() else {
            return;
        };

        let embedding = camera
            .capture_frame()
            .and_then(|frame| self.feature_extractor.extract(&frame));

        match embedding {
            Ok(embedding) => {
                let count = self.samples.append(embedding, class);
                self.render_class_count(class, count);
            }
            Err(e) => {
                let _ = self
                    .logger
                    .warn(&format!("Skipped sample for class {}: {}", class, e));
            }
        }
    }

    /// Everything allocated for a prediction is dropped when this returns.
    fn predict(&mut self) {
        let Some(classifier) = self.classifier.clone() else {
            return;
        };

        let probabilities = self
            .prediction_camera
            .capture_frame()
            .and_then(|frame| self.feature_extractor.extract(&frame))
            .and_then(|embedding| classifier.classifier().predict(embedding.view()));

        let probabilities = match probabilities {
            Ok(probabilities) => probabilities,
            Err(e) => {
                let _ = self.logger.warn(&format!("Skipped prediction: {}", e));
                return;
            }
        };

        let Some(text) = prediction_text(&self.config.class_names, probabilities.view()) else {
            return;
        };
        self.write_display("prediction", |display| display.write_prediction(&text));
    }

    fn train(&mut self) {
        let mut trainer = Trainer::new(self.config.trainer.clone());
        let set = match trainer.prepare(&self.samples, &self.config.class_names) {
            Ok(set) => set,
            Err(e) => {
                let _ = self.event_sender.send(Event::TrainDone(Err(e)));
                return;
            }
        };

        let logger = self.logger.with_namespace("trainer");
        let _ = logger.info(&format!(
            "Fitting {} samples of {} values with {} for {} epochs, batch size {}",
            set.len(),
            set.input_dim(),
            set.loss().name(),
            self.config.trainer.epochs,
            self.config.trainer.batch_size
        ));

        let sender = self.event_sender.clone();
        std::thread::spawn(move || {
            let head = trainer.fit(set, |log| {
                let _ = logger.info(&format!(
                    "Data for epoch {}: loss {:.4}, accuracy {:.3}",
                    log.epoch, log.loss, log.accuracy
                ));
            });
            let _ = logger.info(&head.summary());
            let _ = sender.send(Event::TrainDone(Ok(ClassifierHandle::new(head))));
        });
    }
}
