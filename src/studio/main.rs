use crate::classifier::ClassifierHandle;
use crate::config::Config;
use crate::device_camera::interface::DeviceCamera;
use crate::device_display::interface::DeviceDisplay;
use crate::feature_extractor::interface::FeatureExtractor;
use crate::library::frame_scheduler::interface::FrameScheduler;
use crate::library::logger::interface::Logger;
use crate::sample_buffer::SampleBuffer;
use crate::studio::core::{init, transition, Event, Model};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Owns every piece of mutable studio state. Events from the window, the
/// frame scheduler and background work all funnel through one channel, so
/// the sample buffer and classifier are only touched from `dispatch`.
pub struct Studio {
    pub(super) model: Model,
    pub(super) config: Config,
    pub(super) logger: Arc<dyn Logger + Send + Sync>,
    pub(super) class_cameras: Vec<Arc<dyn DeviceCamera + Send + Sync>>,
    pub(super) prediction_camera: Arc<dyn DeviceCamera + Send + Sync>,
    pub(super) feature_extractor: Arc<dyn FeatureExtractor + Send + Sync>,
    pub(super) device_display: Arc<Mutex<dyn DeviceDisplay + Send + Sync>>,
    pub(super) frame_scheduler: Arc<dyn FrameScheduler + Send + Sync>,
    pub(super) samples: SampleBuffer,
    pub(super) classifier: Option<ClassifierHandle>,
    pub(super) event_sender: Sender<Event>,
    event_receiver: Receiver<Event>,
}

impl Studio {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: Config,
        logger: Arc<dyn Logger + Send + Sync>,
        class_cameras: Vec<Arc<dyn DeviceCamera + Send + Sync>>,
        prediction_camera: Arc<dyn DeviceCamera + Send + Sync>,
        feature_extractor: Arc<dyn FeatureExtractor + Send + Sync>,
        device_display: Arc<Mutex<dyn DeviceDisplay + Send + Sync>>,
        frame_scheduler: Arc<dyn FrameScheduler + Send + Sync>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let class_count = config.class_count();
        if class_cameras.len() != class_count {
            return Err(format!(
                "{} classes need {} capture sources, got {}",
                class_count,
                class_count,
                class_cameras.len()
            )
            .into());
        }

        let (event_sender, event_receiver) = channel();
        let (model, effects) = init(class_count);

        let mut studio = Self {
            model,
            logger: logger.with_namespace("studio"),
            class_cameras,
            prediction_camera,
            feature_extractor,
            device_display,
            frame_scheduler,
            samples: SampleBuffer::new(class_count),
            classifier: None,
            event_sender,
            event_receiver,
            config,
        };

        for class in 0..class_count {
            studio.render_class_count(class, 0);
        }
        for effect in effects {
            studio.run_effect(effect);
        }

        Ok(studio)
    }

    pub fn sender(&self) -> Sender<Event> {
        self.event_sender.clone()
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn samples(&self) -> &SampleBuffer {
        &self.samples
    }

    pub fn classifier(&self) -> Option<&ClassifierHandle> {
        self.classifier.as_ref()
    }

    /// Applies one event and runs the resulting effects to completion.
    pub fn dispatch(&mut self, event: Event) {
        let (model, effects) = transition(self.model.clone(), event);
        self.model = model;

        for effect in effects {
            if !effect.is_per_frame() {
                let _ = self.logger.info(&format!("Running effect: {:?}", effect));
            }
            self.run_effect(effect);
        }
    }

    /// Waits for the next queued event and dispatches it.
    pub fn step(&mut self) -> bool {
        match self.event_receiver.recv() {
            Ok(event) => {
                self.dispatch(event);
                true
            }
            Err(_) => false,
        }
    }

    /// Like `step`, but gives up after `timeout`. Returns whether an event was handled.
    pub fn step_timeout(&mut self, timeout: Duration) -> bool {
        match self.event_receiver.recv_timeout(timeout) {
            Ok(event) => {
                self.dispatch(event);
                true
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => false,
        }
    }

    /// Handles events until `Shutdown` arrives.
    pub fn run(&mut self) {
        let _ = self.logger.info("Studio running");
        while self.model.running {
            if !self.step() {
                break;
            }
        }
        let _ = self.logger.info("Studio stopped");
    }

    /// Stops both loops and drops all collected samples. The classifier is kept.
    pub fn reset(&mut self) {
        self.dispatch(Event::ResetPressed);
    }

    pub fn teardown(&mut self) {
        self.dispatch(Event::Shutdown);
    }
}
