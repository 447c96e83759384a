//! 监控核心 - 状态、检测、路由和单周期执行

pub mod cycle;
pub mod detector;
pub mod router;
pub mod state;
pub mod status_line;
pub mod types;

pub use cycle::{CycleOutcome, FolderFrames, Monitor, MSG_MONITOR_START, MSG_MONITOR_STOP};
pub use detector::{classify, AnomalyDetector, FrameBrightness};
pub use router::{AlertRouter, MSG_BRIGHTNESS_DECREASE, MSG_BRIGHTNESS_INCREASE, MSG_NO_NEW_PHOTO};
pub use state::MonitorState;
pub use types::{BrightnessStatus, CycleResult, NewPhotoStatus, TimestampList};
