use crate::library::frame_scheduler::interface::{FrameCallback, FrameScheduler};
use std::sync::Mutex;

/// Fires pending callbacks only when a test calls `advance`.
pub struct FrameSchedulerFake {
    pending: Mutex<Vec<FrameCallback>>,
}

impl FrameSchedulerFake {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    /// Simulates one display refresh. Returns how many callbacks ran.
    pub fn advance(&self) -> usize {
        let due: Vec<FrameCallback> = self.pending.lock().unwrap().drain(..).collect();
        let count = due.len();
        for callback in due {
            callback();
        }
        count
    }
}

impl FrameScheduler for FrameSchedulerFake {
    fn request_frame(&self, callback: FrameCallback) {
        self.pending.lock().unwrap().push(callback);
    }
}
