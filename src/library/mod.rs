pub mod frame_scheduler;
pub mod logger;
