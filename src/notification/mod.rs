//! 通知抽象层 - 统一管理所有通知渠道
//!
//! # 设计目标
//! 1. 统一接口：所有渠道实现 `NotificationChannel` trait
//! 2. 渠道解耦：每个渠道独立实现，互不影响
//! 3. 失败隔离：任何渠道发送失败只记录日志，不影响监控循环
//!
//! # 使用示例
//! ```ignore
//! use bugcam::notification::{Notification, NotificationBuilder};
//!
//! let dispatcher = NotificationBuilder::new()
//!     .slack(Some(token), "monitor_test")
//!     .build()?;
//!
//! dispatcher.send(&Notification::warning("plate-3", "no new photo", chrono::Local::now())).await;
//! ```

pub mod builder;
pub mod channel;
pub mod channels;
pub mod dispatcher;
pub mod severity;

pub use builder::NotificationBuilder;
pub use channel::{Notification, NotificationChannel, SendResult, TIME_FORMAT};
pub use dispatcher::NotificationDispatcher;
pub use severity::{severity_meets_threshold, Severity};
