//! 配置加载与校验
//!
//! 配置文件默认位于 `<config_dir>/bugcam/config.json`（JSON 格式），
//! 与命令行的 folder URL / 间隔 / 项目名合并为 `MonitorConfig`，启动时校验一次，之后只读。
//!
//! ```json
//! {
//!   "private_tokens": { "dropbox": "...", "slack_bot": "..." },
//!   "brightness_threshold": { "light": 10.0, "dark": -10.0 },
//!   "slack_channel": "monitor_test"
//! }
//! ```

use crate::error::MonitorError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 默认 Slack 频道
pub const DEFAULT_SLACK_CHANNEL: &str = "monitor_test";

/// 最长监控间隔（分钟），与调度器上限一致
pub const MAX_INTERVAL_MINUTES: u64 = crate::scheduler::MAX_INTERVAL.as_secs() / 60;

/// 默认网络请求超时（秒）
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// 亮度变化阈值
///
/// 开区间 `(dark, light)` 内的 delta 视为稳定，比较为严格不等。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// 上界（不含）
    pub light: f64,
    /// 下界（不含）
    pub dark: f64,
}

impl ThresholdConfig {
    /// 创建并校验阈值
    pub fn new(light: f64, dark: f64) -> Result<Self, MonitorError> {
        let thresholds = Self { light, dark };
        thresholds.validate()?;
        Ok(thresholds)
    }

    pub fn validate(&self) -> Result<(), MonitorError> {
        if !self.light.is_finite() || !self.dark.is_finite() {
            return Err(MonitorError::InvalidConfig(
                "brightness thresholds must be finite numbers".to_string(),
            ));
        }
        if self.dark >= self.light {
            return Err(MonitorError::InvalidConfig(format!(
                "dark threshold ({}) must be lower than light threshold ({})",
                self.dark, self.light
            )));
        }
        Ok(())
    }
}

/// 访问令牌
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrivateTokens {
    /// Dropbox access token
    pub dropbox: String,
    /// Slack bot token（缺省时不注册 Slack 渠道）
    #[serde(default)]
    pub slack_bot: Option<String>,
}

/// 配置文件内容
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    pub private_tokens: PrivateTokens,
    pub brightness_threshold: ThresholdConfig,
    #[serde(default = "default_slack_channel")]
    pub slack_channel: String,
    /// 额外的通用 webhook（可选）
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_slack_channel() -> String {
    DEFAULT_SLACK_CHANNEL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl ConfigFile {
    /// 从文件加载
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }
}

/// 默认配置文件路径
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("bugcam")
        .join("config.json")
}

/// 运行时配置（配置文件 + 命令行参数）
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub project_name: String,
    pub folder_url: String,
    pub interval_minutes: u64,
    pub thresholds: ThresholdConfig,
    pub tokens: PrivateTokens,
    pub slack_channel: String,
    pub webhook_url: Option<String>,
    pub request_timeout_secs: u64,
}

impl MonitorConfig {
    /// 合并配置文件与命令行参数，并校验
    pub fn from_parts(
        file: ConfigFile,
        folder_url: impl Into<String>,
        interval_minutes: u64,
        project_name: impl Into<String>,
    ) -> Result<Self, MonitorError> {
        let config = Self {
            project_name: project_name.into(),
            folder_url: folder_url.into(),
            interval_minutes,
            thresholds: file.brightness_threshold,
            tokens: file.private_tokens,
            slack_channel: file.slack_channel,
            webhook_url: file.webhook_url,
            request_timeout_secs: file.request_timeout_secs,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), MonitorError> {
        if self.interval_minutes == 0 {
            return Err(MonitorError::InvalidConfig(
                "interval must be a positive number of minutes".to_string(),
            ));
        }
        if self.interval_minutes > MAX_INTERVAL_MINUTES {
            return Err(MonitorError::InvalidConfig(format!(
                "interval must not exceed {} minutes",
                MAX_INTERVAL_MINUTES
            )));
        }
        if self.project_name.trim().is_empty() {
            return Err(MonitorError::InvalidConfig("project name is empty".to_string()));
        }
        if self.folder_url.trim().is_empty() {
            return Err(MonitorError::InvalidConfig("folder url is empty".to_string()));
        }
        if self.tokens.dropbox.trim().is_empty() {
            return Err(MonitorError::InvalidConfig("dropbox token is empty".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(MonitorError::InvalidConfig(
                "request_timeout_secs must be positive".to_string(),
            ));
        }
        self.thresholds.validate()
    }

    /// 监控间隔
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes.saturating_mul(60))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
