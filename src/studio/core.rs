use crate::classifier::trainer::TrainError;
use crate::classifier::ClassifierHandle;
use crate::device_camera::interface::CameraError;
use crate::studio::render;

#[derive(Debug, Clone, PartialEq)]
pub enum CameraState {
    Off,
    Requesting,
    On,
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Capturing(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Class(usize),
    Prediction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameTask {
    Capture,
    Predict,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub class_count: usize,
    pub camera: CameraState,
    pub class_sources_ready: Vec<bool>,
    pub prediction_source_ready: bool,
    pub capture: CaptureState,
    pub predicting: bool,
    pub training: bool,
    pub running: bool,
    pub capture_frame_pending: bool,
    pub predict_frame_pending: bool,
}

impl Model {
    fn source_ready(&self, source: Source) -> bool {
        match source {
            Source::Class(class) => self.class_sources_ready.get(class).copied().unwrap_or(false),
            Source::Prediction => self.prediction_source_ready,
        }
    }
}

#[derive(Debug)]
pub enum Event {
    EnableCameraPressed,
    CameraEnableDone(Result<(), CameraError>),
    SourceReady(Source),
    /// Fired on both press and release of a class's gather control.
    CaptureToggled(usize),
    TrainPressed,
    TrainDone(Result<ClassifierHandle, TrainError>),
    ResetPressed,
    Frame(FrameTask),
    Shutdown,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    EnableCamera,
    WatchSource(Source),
    RequestFrame(FrameTask),
    CaptureSample { class: usize },
    Predict,
    Train,
    InstallClassifier(ClassifierHandle),
    ClearSamples,
    RenderStatus(String),
    RenderCameraEnabled,
    Warn(String),
    StopCameras,
}

impl Effect {
    /// Effects that fire on every display refresh while a loop is active.
    pub fn is_per_frame(&self) -> bool {
        matches!(
            self,
            Effect::RequestFrame(_) | Effect::CaptureSample { .. } | Effect::Predict
        )
    }
}

pub fn init(class_count: usize) -> (Model, Vec<Effect>) {
    (
        Model {
            class_count,
            camera: CameraState::Off,
            class_sources_ready: vec![false; class_count],
            prediction_source_ready: false,
            capture: CaptureState::Idle,
            predicting: false,
            training: false,
            running: true,
            capture_frame_pending: false,
            predict_frame_pending: false,
        },
        vec![Effect::RenderStatus(render::STATUS_LOADED.to_string())],
    )
}

/// Arms the capture loop unless a tick is already outstanding.
fn arm_capture(model: &mut Model, effects: &mut Vec<Effect>) {
    if !model.capture_frame_pending {
        model.capture_frame_pending = true;
        effects.push(Effect::RequestFrame(FrameTask::Capture));
    }
}

fn arm_predict(model: &mut Model, effects: &mut Vec<Effect>) {
    if !model.predict_frame_pending {
        model.predict_frame_pending = true;
        effects.push(Effect::RequestFrame(FrameTask::Predict));
    }
}

pub fn transition(model: Model, event: Event) -> (Model, Vec<Effect>) {
    let mut model = model;
    let mut effects = vec![];

    if !model.running {
        return (model, effects);
    }

    match event {
        Event::EnableCameraPressed => match model.camera {
            CameraState::Off | CameraState::Unavailable => {
                model.camera = CameraState::Requesting;
                effects.push(Effect::EnableCamera);
            }
            CameraState::Requesting | CameraState::On => {}
        },

        Event::CameraEnableDone(Ok(())) => {
            model.camera = CameraState::On;
            effects.push(Effect::RenderCameraEnabled);
            for class in 0..model.class_count {
                effects.push(Effect::WatchSource(Source::Class(class)));
            }
            effects.push(Effect::WatchSource(Source::Prediction));
        }
        Event::CameraEnableDone(Err(CameraError::Unsupported)) => {
            model.camera = CameraState::Unavailable;
            let message = CameraError::Unsupported.to_string();
            effects.push(Effect::Warn(message.clone()));
            effects.push(Effect::RenderStatus(message));
        }
        Event::CameraEnableDone(Err(error)) => {
            model.camera = CameraState::Unavailable;
            effects.push(Effect::Warn(error.to_string()));
            effects.push(Effect::RenderStatus(format!("Camera unavailable: {}", error)));
        }

        // Readiness is one-shot per source.
        Event::SourceReady(source) => match source {
            Source::Class(class) => {
                if let Some(ready) = model.class_sources_ready.get_mut(class) {
                    *ready = true;
                }
            }
            Source::Prediction => model.prediction_source_ready = true,
        },

        Event::CaptureToggled(class) if class < model.class_count => {
            model.capture = match model.capture {
                CaptureState::Capturing(active) if active == class => CaptureState::Idle,
                // Any other active class is forced idle by the switch.
                _ => CaptureState::Capturing(class),
            };
            if let CaptureState::Capturing(_) = model.capture {
                arm_capture(&mut model, &mut effects);
            }
        }
        Event::CaptureToggled(class) => {
            effects.push(Effect::Warn(format!("No class with index {}", class)));
        }

        Event::Frame(FrameTask::Capture) => {
            model.capture_frame_pending = false;
            if let CaptureState::Capturing(class) = model.capture {
                if model.source_ready(Source::Class(class)) {
                    effects.push(Effect::CaptureSample { class });
                }
                arm_capture(&mut model, &mut effects);
            }
        }

        Event::Frame(FrameTask::Predict) => {
            model.predict_frame_pending = false;
            if model.predicting {
                if model.source_ready(Source::Prediction) {
                    effects.push(Effect::Predict);
                }
                arm_predict(&mut model, &mut effects);
            }
        }

        Event::TrainPressed => {
            if !model.training {
                model.capture = CaptureState::Idle;
                model.predicting = false;
                model.training = true;
                effects.push(Effect::RenderStatus(render::STATUS_TRAINING.to_string()));
                effects.push(Effect::Train);
            }
        }

        Event::TrainDone(Ok(classifier)) => {
            model.training = false;
            model.predicting = true;
            effects.push(Effect::InstallClassifier(classifier));
            effects.push(Effect::RenderStatus(render::STATUS_PREDICTING.to_string()));
            arm_predict(&mut model, &mut effects);
        }
        Event::TrainDone(Err(error)) => {
            model.training = false;
            effects.push(Effect::Warn(error.to_string()));
            effects.push(Effect::RenderStatus(format!("Training failed: {}", error)));
        }

        Event::ResetPressed => {
            // Capture must be idle before the buffer is cleared.
            model.capture = CaptureState::Idle;
            model.predicting = false;
            effects.push(Effect::ClearSamples);
            effects.push(Effect::RenderStatus(render::STATUS_NO_DATA.to_string()));
        }

        Event::Shutdown => {
            model.capture = CaptureState::Idle;
            model.predicting = false;
            model.running = false;
            effects.push(Effect::StopCameras);
        }
    }

    (model, effects)
}
