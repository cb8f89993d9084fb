pub type FrameCallback = Box<dyn FnOnce() + Send>;

/// Runs callbacks on the next display refresh, one shot per request.
pub trait FrameScheduler: Send + Sync {
    fn request_frame(&self, callback: FrameCallback);
}
