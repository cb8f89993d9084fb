use crate::device_camera::frame_retry::{FrameFailure, FrameRetry};
use crate::device_camera::interface::{CameraError, DeviceCamera, DeviceCameraEvent};
use crate::library::logger::interface::Logger;
use image::RgbImage;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    ApiBackend, CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType,
    Resolution,
};
use nokhwa::Camera;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

/// Consecutive failed reads before the device is considered unplugged.
const FRAME_FAILURE_LIMIT: u32 = 30;

#[derive(Debug, Clone)]
pub struct WebcamConfig {
    pub index: u32,
    pub width: u32,
    pub height: u32,
    pub framerate: u32,
}

#[derive(Default)]
struct Shared {
    latest_frame: Option<RgbImage>,
    subscribers: Vec<Sender<DeviceCameraEvent>>,
}

/// A host webcam. A capture thread owns the device and keeps the latest frame.
pub struct DeviceCameraNokhwa {
    config: WebcamConfig,
    logger: Arc<dyn Logger + Send + Sync>,
    shared: Arc<Mutex<Shared>>,
    streaming: Arc<AtomicBool>,
    capture_thread: Mutex<Option<JoinHandle<()>>>,
}

impl DeviceCameraNokhwa {
    pub fn new(config: WebcamConfig, logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            config,
            logger: logger.with_namespace("camera").with_namespace("webcam"),
            shared: Arc::new(Mutex::new(Shared::default())),
            streaming: Arc::new(AtomicBool::new(false)),
            capture_thread: Mutex::new(None),
        }
    }

    fn requested_format(&self) -> RequestedFormat<'static> {
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(CameraFormat::new(
            Resolution::new(self.config.width, self.config.height),
            FrameFormat::MJPEG,
            self.config.framerate,
        )))
    }
}

fn broadcast(shared: &Mutex<Shared>, event: DeviceCameraEvent) {
    if let Ok(mut shared) = shared.lock() {
        shared
            .subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }
}

impl DeviceCamera for DeviceCameraNokhwa {
    fn is_supported(&self) -> bool {
        nokhwa::query(ApiBackend::Auto)
            .map(|devices| !devices.is_empty())
            .unwrap_or(false)
    }

    fn open(&self) -> Result<(), CameraError> {
        if !self.is_supported() {
            return Err(CameraError::Unsupported);
        }

        let mut capture_thread = self
            .capture_thread
            .lock()
            .map_err(|e| CameraError::Acquisition(e.to_string()))?;
        if let Some(handle) = capture_thread.as_ref() {
            if !handle.is_finished() {
                return Ok(());
            }
        }
        // A stream that gave up on a dead device can be opened again.
        if let Some(finished) = capture_thread.take() {
            let _ = finished.join();
        }

        let index = CameraIndex::Index(self.config.index);
        let format = self.requested_format();
        let shared = self.shared.clone();
        let streaming = self.streaming.clone();
        let logger = self.logger.clone();
        let (opened_tx, opened_rx) = channel::<Result<(), String>>();

        streaming.store(true, Ordering::Relaxed);

        // nokhwa cameras are not Send, so the device lives and dies on this thread.
        let handle = std::thread::spawn(move || {
            let mut camera = match Camera::new(index, format) {
                Ok(camera) => camera,
                Err(e) => {
                    let _ = opened_tx.send(Err(e.to_string()));
                    return;
                }
            };
            if let Err(e) = camera.open_stream() {
                let _ = opened_tx.send(Err(e.to_string()));
                return;
            }
            let _ = opened_tx.send(Ok(()));

            let mut loaded = false;
            let mut retry = FrameRetry::new(
                FRAME_FAILURE_LIMIT,
                Duration::from_millis(10),
                Duration::from_millis(500),
            );
            while streaming.load(Ordering::Relaxed) {
                let frame = camera
                    .frame()
                    .and_then(|buffer| buffer.decode_image::<RgbFormat>())
                    .map_err(|e| e.to_string())
                    .and_then(|decoded| {
                        let (width, height) = (decoded.width(), decoded.height());
                        RgbImage::from_raw(width, height, decoded.into_raw())
                            .ok_or_else(|| "frame buffer does not match its size".to_string())
                    });

                let frame = match frame {
                    Ok(frame) => frame,
                    Err(e) => match retry.failed() {
                        FrameFailure::Retry(delay) => {
                            if retry.consecutive() == 1 {
                                let _ = logger.warn(&format!("Dropped frame: {}", e));
                            }
                            std::thread::sleep(delay);
                            continue;
                        }
                        FrameFailure::GiveUp => {
                            let _ = logger.warn(&format!(
                                "No frames after {} attempts, releasing camera: {}",
                                retry.consecutive(),
                                e
                            ));
                            break;
                        }
                    },
                };
                retry.succeeded();

                if let Ok(mut shared) = shared.lock() {
                    shared.latest_frame = Some(frame);
                }

                if !loaded {
                    loaded = true;
                    broadcast(&shared, DeviceCameraEvent::DataLoaded);
                }
            }

            streaming.store(false, Ordering::Relaxed);
            let _ = camera.stop_stream();
            if let Ok(mut shared) = shared.lock() {
                shared.latest_frame = None;
            }
            broadcast(&shared, DeviceCameraEvent::Disconnected);
        });

        match opened_rx.recv() {
            Ok(Ok(())) => {
                let _ = self.logger.info("Camera stream opened");
                *capture_thread = Some(handle);
                Ok(())
            }
            Ok(Err(message)) => {
                self.streaming.store(false, Ordering::Relaxed);
                let _ = handle.join();
                Err(CameraError::Acquisition(message))
            }
            Err(e) => {
                self.streaming.store(false, Ordering::Relaxed);
                Err(CameraError::Acquisition(e.to_string()))
            }
        }
    }

    fn stop(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.streaming.store(false, Ordering::Relaxed);
        let handle = self.capture_thread.lock().map_err(|e| e.to_string())?.take();
        if let Some(handle) = handle {
            self.logger.info("Stopping camera stream")?;
            handle.join().map_err(|_| "camera thread panicked")?;
        }
        Ok(())
    }

    fn capture_frame(&self) -> Result<RgbImage, Box<dyn std::error::Error + Send + Sync>> {
        let shared = self.shared.lock().map_err(|e| e.to_string())?;
        shared
            .latest_frame
            .clone()
            .ok_or_else(|| "camera has not produced a frame yet".into())
    }

    fn events(&self) -> Receiver<DeviceCameraEvent> {
        let (tx, rx) = channel();
        if let Ok(mut shared) = self.shared.lock() {
            if shared.latest_frame.is_some() {
                let _ = tx.send(DeviceCameraEvent::DataLoaded);
            }
            shared.subscribers.push(tx);
        }
        rx
    }
}

impl Drop for DeviceCameraNokhwa {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            eprintln!("Failed to stop camera during shutdown: {}", e);
        }
    }
}
