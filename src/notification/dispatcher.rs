//! 通知分发器 - 管理多个渠道并路由消息

use super::channel::{Notification, NotificationChannel, SendResult};
use std::sync::Arc;
use tracing::{info, warn};

/// 通知分发器 - 管理多个渠道并路由消息
///
/// 发送失败只记录日志，不向调用方传播：告警是尽力而为的。
pub struct NotificationDispatcher {
    /// 所有注册的渠道
    channels: Vec<Arc<dyn NotificationChannel>>,
    /// 是否为 dry-run 模式
    dry_run: bool,
}

impl NotificationDispatcher {
    /// 创建新的分发器
    pub fn new() -> Self {
        Self {
            channels: Vec::new(),
            dry_run: false,
        }
    }

    /// 设置 dry-run 模式
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// 注册渠道
    pub fn register_channel(&mut self, channel: Arc<dyn NotificationChannel>) {
        info!(channel = channel.name(), "Registering notification channel");
        self.channels.push(channel);
    }

    /// 发送消息到所有渠道
    pub async fn send(&self, notification: &Notification) -> Vec<(String, SendResult)> {
        let mut results = Vec::new();

        for channel in &self.channels {
            let name = channel.name().to_string();

            if self.dry_run {
                eprintln!("[DRY-RUN] Would send to channel {}: {}", name, notification.text());
                results.push((name, SendResult::Skipped("dry-run".to_string())));
                continue;
            }

            if !channel.should_send(notification) {
                results.push((
                    name,
                    SendResult::Skipped(format!("severity {} filtered", notification.severity)),
                ));
                continue;
            }

            let result = match channel.send(notification).await {
                Ok(r) => r,
                Err(e) => {
                    warn!(channel = %name, error = %e, "Channel send failed");
                    SendResult::Failed(e.to_string())
                }
            };

            if let SendResult::Failed(reason) = &result {
                warn!(channel = %name, reason = %reason, message = %notification.message, "Notification not delivered");
            }

            results.push((name, result));
        }

        results
    }

    /// 获取已注册的渠道数量
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// 获取已注册的渠道名称
    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name()).collect()
    }
}

impl Default for NotificationDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
