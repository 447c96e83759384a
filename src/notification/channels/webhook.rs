//! 通用 Webhook 渠道
//!
//! 以 JSON POST 完整的通知内容，适配自建的告警网关。

use crate::notification::channel::{Notification, NotificationChannel, SendResult};
use crate::notification::severity::{severity_meets_threshold, Severity};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{error, info};

/// Webhook 渠道配置
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// 目标 URL
    pub url: String,
    /// 超时时间 (秒)
    pub timeout_secs: u64,
    /// 最低发送 severity
    pub min_severity: Severity,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_secs: 30,
            min_severity: Severity::Info,
        }
    }
}

/// Webhook 请求载荷
#[derive(Debug, Serialize)]
pub struct WebhookPayload<'a> {
    pub source: &'static str,
    pub text: String,
    #[serde(flatten)]
    pub notification: &'a Notification,
}

/// Webhook 渠道
pub struct WebhookChannel {
    client: Client,
    config: WebhookConfig,
}

impl WebhookChannel {
    pub fn new(config: WebhookConfig) -> Result<Self> {
        if config.url.is_empty() {
            return Err(anyhow!("webhook url is required"));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self { client, config })
    }

    pub fn payload(notification: &Notification) -> WebhookPayload<'_> {
        WebhookPayload {
            source: "bugcam",
            text: notification.text(),
            notification,
        }
    }
}

#[async_trait]
impl NotificationChannel for WebhookChannel {
    fn name(&self) -> &str {
        "webhook"
    }

    fn should_send(&self, notification: &Notification) -> bool {
        severity_meets_threshold(notification.severity, self.config.min_severity)
    }

    async fn send(&self, notification: &Notification) -> Result<SendResult> {
        let response = self
            .client
            .post(&self.config.url)
            .json(&Self::payload(notification))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            info!(url = %self.config.url, message = %notification.message, "Webhook delivered");
            Ok(SendResult::Sent)
        } else {
            let body = response.text().await.unwrap_or_default();
            error!(url = %self.config.url, status = status.as_u16(), "Webhook rejected notification");
            Ok(SendResult::Failed(format!("HTTP {}: {}", status.as_u16(), body)))
        }
    }
}
