use image::RgbImage;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCameraEvent {
    /// The stream produced its first frame.
    DataLoaded,
    Disconnected,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CameraError {
    #[error("camera capture is not supported on this host")]
    Unsupported,
    #[error("could not acquire camera: {0}")]
    Acquisition(String),
}

pub trait DeviceCamera {
    fn is_supported(&self) -> bool;
    /// Opening an already open camera is a no-op, so one device can back several sources.
    fn open(&self) -> Result<(), CameraError>;
    fn stop(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn capture_frame(&self) -> Result<RgbImage, Box<dyn std::error::Error + Send + Sync>>;
    /// Each call returns a fresh subscription.
    fn events(&self) -> std::sync::mpsc::Receiver<DeviceCameraEvent>;
}
