//! 告警路由 - 把检测结果映射为外发通知
//!
//! 每个周期最多一条通知，按优先级匹配：
//! 没有新照片 > 亮度下降 > 亮度上升。稳定 / 跳过只写本地状态行，不外发。

use super::types::{BrightnessStatus, CycleResult, NewPhotoStatus};
use crate::notification::Notification;
use chrono::{DateTime, Local};

pub const MSG_NO_NEW_PHOTO: &str = "no new photo";
pub const MSG_BRIGHTNESS_DECREASE: &str = "brightness decrease";
pub const MSG_BRIGHTNESS_INCREASE: &str = "brightness increase";

/// 告警路由器
#[derive(Debug, Clone, Copy, Default)]
pub struct AlertRouter;

impl AlertRouter {
    /// 返回需要外发的通知（0 或 1 条）
    pub fn route(
        result: &CycleResult,
        project: &str,
        timestamp: DateTime<Local>,
    ) -> Vec<Notification> {
        let message = match (result.new_photo, result.brightness) {
            (NewPhotoStatus::Absent, _) => Some(MSG_NO_NEW_PHOTO),
            (NewPhotoStatus::Present, BrightnessStatus::Decrease) => Some(MSG_BRIGHTNESS_DECREASE),
            (NewPhotoStatus::Present, BrightnessStatus::Increase) => Some(MSG_BRIGHTNESS_INCREASE),
            (NewPhotoStatus::Present, BrightnessStatus::Stable)
            | (NewPhotoStatus::Present, BrightnessStatus::Skipped) => None,
        };

        message
            .map(|m| Notification::warning(project, m, timestamp))
            .into_iter()
            .collect()
    }
}
