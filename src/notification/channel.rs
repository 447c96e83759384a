//! 通知渠道 trait 定义

use super::severity::Severity;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde::Serialize;

/// 时间戳显示格式（秒级）
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 通知消息
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub severity: Severity,
    /// 项目名称
    pub project: String,
    /// 简短描述，如 "no new photo"
    pub message: String,
    pub timestamp: DateTime<Local>,
}

impl Notification {
    pub fn new(
        severity: Severity,
        project: impl Into<String>,
        message: impl Into<String>,
        timestamp: DateTime<Local>,
    ) -> Self {
        Self {
            severity,
            project: project.into(),
            message: message.into(),
            timestamp,
        }
    }

    pub fn warning(project: impl Into<String>, message: impl Into<String>, timestamp: DateTime<Local>) -> Self {
        Self::new(Severity::Warning, project, message, timestamp)
    }

    pub fn info(project: impl Into<String>, message: impl Into<String>, timestamp: DateTime<Local>) -> Self {
        Self::new(Severity::Info, project, message, timestamp)
    }

    /// 纯文本内容：警告为 `WARNING: <message>`，生命周期消息为 `*<message>*: <project>`
    pub fn text(&self) -> String {
        match self.severity {
            Severity::Warning => format!("{}: {}", self.severity, self.message),
            Severity::Info => format!("*{}*: {}", self.message, self.project),
        }
    }

    pub fn formatted_time(&self) -> String {
        self.timestamp.format(TIME_FORMAT).to_string()
    }
}

/// 发送结果
#[derive(Debug, Clone, PartialEq)]
pub enum SendResult {
    /// 发送成功
    Sent,
    /// 跳过（不符合渠道过滤条件）
    Skipped(String),
    /// 发送失败
    Failed(String),
}

/// 通知渠道 trait
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// 渠道名称（用于日志和配置）
    fn name(&self) -> &str;

    /// 是否应该发送此消息（根据 severity 过滤）
    fn should_send(&self, notification: &Notification) -> bool;

    /// 发送消息
    async fn send(&self, notification: &Notification) -> Result<SendResult>;
}
