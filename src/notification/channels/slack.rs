//! Slack 渠道（chat.postMessage + bot token）

use crate::notification::channel::{Notification, NotificationChannel, SendResult};
use crate::notification::severity::{severity_meets_threshold, Severity};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};

/// Slack Web API 地址
pub const SLACK_POST_MESSAGE_URL: &str = "https://slack.com/api/chat.postMessage";

/// Slack 渠道配置
#[derive(Debug, Clone)]
pub struct SlackConfig {
    /// Bot token (xoxb-...)
    pub token: String,
    /// 频道名或频道 ID
    pub channel: String,
    /// 最低发送 severity
    pub min_severity: Severity,
    /// API 地址（测试 / 代理用）
    pub api_url: String,
    /// 超时时间 (秒)
    pub timeout_secs: u64,
}

impl SlackConfig {
    pub fn new(token: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            channel: channel.into(),
            min_severity: Severity::Info,
            api_url: SLACK_POST_MESSAGE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Serialize)]
struct PostMessage<'a> {
    channel: &'a str,
    text: &'a str,
}

/// chat.postMessage 响应
#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Slack 渠道
pub struct SlackChannel {
    client: Client,
    config: SlackConfig,
}

impl SlackChannel {
    pub fn new(config: SlackConfig) -> Result<Self> {
        if config.token.is_empty() {
            return Err(anyhow!("slack token is required"));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self { client, config })
    }

    /// 格式化为 Slack mrkdwn 文本
    pub fn format_message(notification: &Notification) -> String {
        match notification.severity {
            Severity::Warning => format!(
                ":warning:\t*{}*: {}\t{}",
                notification.project,
                capitalize(&notification.message),
                notification.formatted_time()
            ),
            Severity::Info => format!("{}\t{}", notification.text(), notification.formatted_time()),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[async_trait]
impl NotificationChannel for SlackChannel {
    fn name(&self) -> &str {
        "slack"
    }

    fn should_send(&self, notification: &Notification) -> bool {
        severity_meets_threshold(notification.severity, self.config.min_severity)
    }

    async fn send(&self, notification: &Notification) -> Result<SendResult> {
        let text = Self::format_message(notification);

        let response: PostMessageResponse = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.token)
            .json(&PostMessage {
                channel: &self.config.channel,
                text: &text,
            })
            .send()
            .await?
            .json()
            .await?;

        if response.ok {
            info!(channel = %self.config.channel, message = %notification.message, "Slack message sent");
            Ok(SendResult::Sent)
        } else {
            let reason = response.error.unwrap_or_else(|| "Unknown error".to_string());
            error!(channel = %self.config.channel, error = %reason, "Failed to send Slack message");
            Ok(SendResult::Failed(reason))
        }
    }
}
