//! 本地状态行
//!
//! 每个周期都输出一行：`{note} {desc:<25} {time}`。

use super::types::{BrightnessStatus, CycleResult, NewPhotoStatus};
use crossterm::style::Stylize;

const WARNING_NOTE: &str = "WARNING!";

/// 状态行的标记和描述
fn describe(result: &CycleResult) -> (&'static str, &'static str) {
    match (result.new_photo, result.brightness) {
        (NewPhotoStatus::Absent, _) => (WARNING_NOTE, "No new photo."),
        (NewPhotoStatus::Present, BrightnessStatus::Decrease) => (WARNING_NOTE, "Brightness decrease."),
        (NewPhotoStatus::Present, BrightnessStatus::Increase) => (WARNING_NOTE, "Brightness increase."),
        (NewPhotoStatus::Present, BrightnessStatus::Stable) => ("ok", ""),
        (NewPhotoStatus::Present, BrightnessStatus::Skipped) => ("skipped", "Not enough frames."),
    }
}

/// 格式化状态行；`color` 为 true 时警告标记显示为红色
pub fn format_status_line(result: &CycleResult, time: &str, color: bool) -> String {
    let (note, desc) = describe(result);
    let note = if color && note == WARNING_NOTE {
        note.red().bold().to_string()
    } else {
        note.to_string()
    };
    format!("{} {: <25} {}", note, desc, time)
}

/// 周期失败（跳过）时的状态行
pub fn format_error_line(reason: &str, time: &str, color: bool) -> String {
    let note = if color {
        "ERROR".yellow().to_string()
    } else {
        "ERROR".to_string()
    };
    format!("{} {: <25} {}", note, format!("Cycle skipped: {}", reason), time)
}
