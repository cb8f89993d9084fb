use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFailure {
    /// Wait this long before reading again.
    Retry(Duration),
    GiveUp,
}

/// Counts consecutive failed reads. Delays double up to `max_delay`, and after
/// `limit` failures in a row the device is treated as gone.
#[derive(Debug, Clone)]
pub struct FrameRetry {
    consecutive: u32,
    limit: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl FrameRetry {
    pub fn new(limit: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            consecutive: 0,
            limit: limit.max(1),
            base_delay,
            max_delay,
        }
    }

    pub fn succeeded(&mut self) {
        self.consecutive = 0;
    }

    pub fn failed(&mut self) -> FrameFailure {
        self.consecutive = self.consecutive.saturating_add(1);
        if self.consecutive >= self.limit {
            return FrameFailure::GiveUp;
        }
        let factor = 1u32 << (self.consecutive - 1).min(16);
        FrameFailure::Retry(self.base_delay.saturating_mul(factor).min(self.max_delay))
    }

    pub fn consecutive(&self) -> u32 {
        self.consecutive
    }
}
