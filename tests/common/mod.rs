//! 集成测试共用的假实现

#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use bugcam::notification::{Notification, NotificationChannel, NotificationDispatcher, SendResult};
use bugcam::{BrightnessProbe, Entry, MemoryFolder, MonitorError};
use chrono::{DateTime, TimeZone, Utc};
use std::sync::{Arc, Mutex};

/// 第一个字节即亮度值的探测器
pub struct FirstByteProbe;

impl BrightnessProbe for FirstByteProbe {
    fn mean_luminance(&self, bytes: &[u8]) -> Result<f64, MonitorError> {
        bytes
            .first()
            .map(|b| *b as f64)
            .ok_or_else(|| MonitorError::Decode("empty image".to_string()))
    }
}

/// 记录所有发送内容的渠道
#[derive(Default)]
pub struct RecordingChannel {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingChannel {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.sent().into_iter().map(|n| n.message).collect()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

#[async_trait]
impl NotificationChannel for RecordingChannel {
    fn name(&self) -> &str {
        "recording"
    }

    fn should_send(&self, _notification: &Notification) -> bool {
        true
    }

    async fn send(&self, notification: &Notification) -> Result<SendResult> {
        self.sent.lock().unwrap().push(notification.clone());
        Ok(SendResult::Sent)
    }
}

/// 总是失败的渠道
pub struct BrokenChannel;

#[async_trait]
impl NotificationChannel for BrokenChannel {
    fn name(&self) -> &str {
        "broken"
    }

    fn should_send(&self, _notification: &Notification) -> bool {
        true
    }

    async fn send(&self, _notification: &Notification) -> Result<SendResult> {
        anyhow::bail!("slack is down")
    }
}

pub fn dispatcher_with(channel: Arc<RecordingChannel>) -> NotificationDispatcher {
    let mut dispatcher = NotificationDispatcher::new();
    dispatcher.register_channel(channel);
    dispatcher
}

pub fn at(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap()
}

/// 添加一张亮度为 `luminance` 的照片
pub fn add_photo(folder: &MemoryFolder, name: &str, minute: u32, luminance: u8) -> Entry {
    let entry = Entry::new(name, at(minute));
    folder.insert(entry.clone(), vec![luminance]);
    entry
}
