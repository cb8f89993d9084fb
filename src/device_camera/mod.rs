#[cfg(any(test, feature = "webcam"))]
pub mod frame_retry;
pub mod impl_fake;
#[cfg(feature = "webcam")]
pub mod impl_nokhwa;
pub mod interface;
