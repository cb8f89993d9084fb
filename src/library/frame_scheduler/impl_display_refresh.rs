use crate::library::frame_scheduler::interface::{FrameCallback, FrameScheduler};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

pub struct FrameSchedulerDisplayRefresh {
    pending: Arc<Mutex<Vec<FrameCallback>>>,
    running: Arc<AtomicBool>,
    ticker: Option<JoinHandle<()>>,
}

impl FrameSchedulerDisplayRefresh {
    pub fn new(refresh_rate: Duration) -> Self {
        let pending: Arc<Mutex<Vec<FrameCallback>>> = Arc::new(Mutex::new(Vec::new()));
        let running = Arc::new(AtomicBool::new(true));

        let ticker = {
            let pending = pending.clone();
            let running = running.clone();
            std::thread::spawn(move || {
                while running.load(Ordering::Relaxed) {
                    std::thread::sleep(refresh_rate);

                    // Callbacks requested during this refresh wait for the next one.
                    let due: Vec<FrameCallback> = match pending.lock() {
                        Ok(mut pending) => pending.drain(..).collect(),
                        Err(_) => break,
                    };

                    for callback in due {
                        callback();
                    }
                }
            })
        };

        Self {
            pending,
            running,
            ticker: Some(ticker),
        }
    }
}

impl FrameScheduler for FrameSchedulerDisplayRefresh {
    fn request_frame(&self, callback: FrameCallback) {
        if let Ok(mut pending) = self.pending.lock() {
            pending.push(callback);
        }
    }
}

impl Drop for FrameSchedulerDisplayRefresh {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.ticker.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;

    #[test]
    fn test_callback_runs_once_on_next_refresh() {
        let scheduler = FrameSchedulerDisplayRefresh::new(Duration::from_millis(1));
        let (tx, rx) = channel();

        scheduler.request_frame(Box::new(move || {
            let _ = tx.send(42);
        }));

        assert_eq!(rx.recv_timeout(Duration::from_secs(2)), Ok(42));
        // The sender moved into the callback is gone once it ran.
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
    }
}
