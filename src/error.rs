//! 监控错误类型
//!
//! 外部协作者（远程目录、亮度探测）统一返回 `MonitorError`，
//! 周期边界根据 `is_transient()` 决定是跳过本周期还是终止启动。

use thiserror::Error;

/// 监控错误
#[derive(Debug, Error)]
pub enum MonitorError {
    /// 网络 / 认证失败、超时
    #[error("remote folder unavailable: {0}")]
    RemoteUnavailable(String),

    /// 目录中没有任何媒体文件
    #[error("remote folder contains no media entries")]
    EmptyFolder,

    /// 指定文件不存在
    #[error("entry not found: {0}")]
    NotFound(String),

    /// 图片数据无法解码
    #[error("failed to decode image: {0}")]
    Decode(String),

    /// 配置非法（启动期校验）
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl MonitorError {
    /// 是否为周期内的瞬时错误（跳过本周期，下个周期重试）
    ///
    /// 空目录在启动期是致命错误，但运行中出现时同样按瞬时处理：
    /// 上传方可能正在替换文件。
    pub fn is_transient(&self) -> bool {
        !matches!(self, MonitorError::InvalidConfig(_))
    }
}

impl From<reqwest::Error> for MonitorError {
    fn from(e: reqwest::Error) -> Self {
        MonitorError::RemoteUnavailable(e.to_string())
    }
}

impl From<image::ImageError> for MonitorError {
    fn from(e: image::ImageError) -> Self {
        MonitorError::Decode(e.to_string())
    }
}
