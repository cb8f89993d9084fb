use crate::device_camera::interface::{CameraError, DeviceCamera, DeviceCameraEvent};
use crate::library::logger::interface::Logger;
use image::{Rgb, RgbImage};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};

struct FakeState {
    supported: bool,
    deny_access: bool,
    open: bool,
    open_calls: usize,
    color: [u8; 3],
    subscribers: Vec<Sender<DeviceCameraEvent>>,
}

/// Produces solid-colour frames of a fixed size.
pub struct DeviceCameraFake {
    logger: Arc<dyn Logger + Send + Sync>,
    width: u32,
    height: u32,
    state: Mutex<FakeState>,
}

impl DeviceCameraFake {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>, width: u32, height: u32) -> Self {
        Self {
            logger: logger.with_namespace("camera").with_namespace("fake"),
            width,
            height,
            state: Mutex::new(FakeState {
                supported: true,
                deny_access: false,
                open: false,
                open_calls: 0,
                color: [0, 0, 0],
                subscribers: Vec::new(),
            }),
        }
    }

    #[allow(dead_code)]
    pub fn set_supported(&self, supported: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.supported = supported;
        }
    }

    #[allow(dead_code)]
    pub fn set_deny_access(&self, deny_access: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.deny_access = deny_access;
        }
    }

    pub fn set_color(&self, color: [u8; 3]) {
        if let Ok(mut state) = self.state.lock() {
            state.color = color;
        }
    }

    #[allow(dead_code)]
    pub fn open_calls(&self) -> usize {
        self.state.lock().map(|state| state.open_calls).unwrap_or(0)
    }
}

impl DeviceCamera for DeviceCameraFake {
    fn is_supported(&self) -> bool {
        self.state.lock().map(|state| state.supported).unwrap_or(false)
    }

    fn open(&self) -> Result<(), CameraError> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| CameraError::Acquisition(e.to_string()))?;
        state.open_calls += 1;

        if !state.supported {
            return Err(CameraError::Unsupported);
        }
        if state.deny_access {
            return Err(CameraError::Acquisition("permission denied".to_string()));
        }
        if state.open {
            return Ok(());
        }

        let _ = self.logger.info("Opening camera...");
        state.open = true;
        state
            .subscribers
            .retain(|subscriber| subscriber.send(DeviceCameraEvent::DataLoaded).is_ok());
        Ok(())
    }

    fn stop(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut state = self.state.lock().map_err(|e| e.to_string())?;
        if state.open {
            self.logger.info("Stopping camera...")?;
            state.open = false;
            state
                .subscribers
                .retain(|subscriber| subscriber.send(DeviceCameraEvent::Disconnected).is_ok());
        }
        Ok(())
    }

    fn capture_frame(&self) -> Result<RgbImage, Box<dyn std::error::Error + Send + Sync>> {
        let state = self.state.lock().map_err(|e| e.to_string())?;
        if !state.open {
            return Err("camera is not open".into());
        }
        Ok(RgbImage::from_pixel(
            self.width,
            self.height,
            Rgb(state.color),
        ))
    }

    fn events(&self) -> Receiver<DeviceCameraEvent> {
        let (tx, rx) = channel();
        if let Ok(mut state) = self.state.lock() {
            if state.open {
                let _ = tx.send(DeviceCameraEvent::DataLoaded);
            }
            state.subscribers.push(tx);
        }
        rx
    }
}
