//! 监控周期的数据类型

use crate::error::MonitorError;
use crate::remote::Entry;
use serde::Serialize;

/// 新照片状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NewPhotoStatus {
    Present,
    Absent,
}

/// 亮度状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BrightnessStatus {
    Stable,
    Increase,
    Decrease,
    /// 没有新照片，或不足两张照片
    Skipped,
}

impl std::fmt::Display for BrightnessStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BrightnessStatus::Stable => "stable",
            BrightnessStatus::Increase => "increase",
            BrightnessStatus::Decrease => "decrease",
            BrightnessStatus::Skipped => "skipped",
        };
        write!(f, "{}", s)
    }
}

/// 单个周期的检测结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleResult {
    pub new_photo: NewPhotoStatus,
    pub brightness: BrightnessStatus,
    /// 最新两帧的亮度差（仅在实际比较时存在）
    pub delta: Option<f64>,
}

/// 按拍摄时间降序排列的文件列表（最新在前），构造时保证非空
#[derive(Debug, Clone, PartialEq)]
pub struct TimestampList(Vec<Entry>);

impl TimestampList {
    /// 排序并校验非空
    pub fn new(mut entries: Vec<Entry>) -> Result<Self, MonitorError> {
        if entries.is_empty() {
            return Err(MonitorError::EmptyFolder);
        }
        entries.sort_by(|a, b| b.captured_at.cmp(&a.captured_at));
        Ok(Self(entries))
    }

    pub fn newest(&self) -> &Entry {
        &self.0[0]
    }

    /// 第二新的文件
    pub fn second_newest(&self) -> Option<&Entry> {
        self.0.get(1)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.0
    }
}
