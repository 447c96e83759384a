//! BugCam - 监控延时摄影实验：检测照片停更和亮度突变，并发送告警

pub mod brightness;
pub mod calibrate;
pub mod config;
pub mod error;
pub mod monitor;
pub mod notification;
pub mod remote;
pub mod scheduler;

pub use brightness::{BrightnessProbe, ImageProbe};
pub use config::{ConfigFile, MonitorConfig, ThresholdConfig};
pub use error::MonitorError;
pub use monitor::{
    AlertRouter, AnomalyDetector, BrightnessStatus, CycleOutcome, CycleResult, Monitor,
    MonitorState, NewPhotoStatus, TimestampList,
};
pub use notification::{Notification, NotificationBuilder, NotificationDispatcher, SendResult, Severity};
pub use remote::{DropboxFolder, Entry, MemoryFolder, RemoteFolder};
pub use scheduler::{CycleTask, Scheduler, SchedulerState, SchedulerStats};
