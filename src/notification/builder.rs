//! 通知系统构建器 - 根据配置注册渠道

use super::channels::slack::{SlackChannel, SlackConfig};
use super::channels::webhook::{WebhookChannel, WebhookConfig};
use super::dispatcher::NotificationDispatcher;
use super::severity::Severity;
use crate::config::MonitorConfig;
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

/// 通知系统构建器
pub struct NotificationBuilder {
    slack_token: Option<String>,
    slack_channel: String,
    webhook_url: Option<String>,
    min_severity: Severity,
    timeout_secs: u64,
    dry_run: bool,
}

impl NotificationBuilder {
    pub fn new() -> Self {
        Self {
            slack_token: None,
            slack_channel: crate::config::DEFAULT_SLACK_CHANNEL.to_string(),
            webhook_url: None,
            min_severity: Severity::Info,
            timeout_secs: 30,
            dry_run: false,
        }
    }

    /// 从运行时配置读取渠道信息
    pub fn from_config(config: &MonitorConfig) -> Self {
        Self::new()
            .slack(config.tokens.slack_bot.clone(), config.slack_channel.clone())
            .webhook(config.webhook_url.clone())
            .timeout_secs(config.request_timeout_secs)
    }

    /// 设置 Slack token 和频道
    pub fn slack(mut self, token: Option<String>, channel: impl Into<String>) -> Self {
        self.slack_token = token.filter(|t| !t.trim().is_empty());
        self.slack_channel = channel.into();
        self
    }

    /// 设置 webhook URL
    pub fn webhook(mut self, url: Option<String>) -> Self {
        self.webhook_url = url.filter(|u| !u.trim().is_empty());
        self
    }

    /// 设置最低 severity
    pub fn min_severity(mut self, severity: Severity) -> Self {
        self.min_severity = severity;
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// 设置 dry-run 模式
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// 构建 NotificationDispatcher
    pub fn build(self) -> Result<NotificationDispatcher> {
        let mut dispatcher = NotificationDispatcher::new().with_dry_run(self.dry_run);

        if let Some(token) = self.slack_token {
            info!(channel = "slack", target = %self.slack_channel, "Configured Slack channel");
            let slack = SlackChannel::new(SlackConfig {
                token,
                channel: self.slack_channel.clone(),
                min_severity: self.min_severity,
                timeout_secs: self.timeout_secs,
                ..SlackConfig::new("", "")
            })?;
            dispatcher.register_channel(Arc::new(slack));
        }

        if let Some(url) = self.webhook_url {
            info!(channel = "webhook", target = %url, "Configured webhook channel");
            let webhook = WebhookChannel::new(WebhookConfig {
                url,
                timeout_secs: self.timeout_secs,
                min_severity: self.min_severity,
            })?;
            dispatcher.register_channel(Arc::new(webhook));
        }

        if dispatcher.channel_count() == 0 {
            warn!("No notification channel configured, alerts will only be printed locally");
        }

        Ok(dispatcher)
    }
}

impl Default for NotificationBuilder {
    fn default() -> Self {
        Self::new()
    }
}
