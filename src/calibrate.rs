//! 阈值校准
//!
//! 读取一次正常实验的本地照片，计算相邻帧的亮度差，帮助选择 light / dark 阈值。
//! 帧顺序按 EXIF 拍摄时间（DateTimeOriginal），没有 EXIF 时退回文件修改时间，同一时间按文件名。

use crate::brightness::BrightnessProbe;
use crate::config::ThresholdConfig;
use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDate, TimeZone};
use serde::Serialize;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// 拍摄时间来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureSource {
    Exif,
    Modified,
}

/// 单帧样本
#[derive(Debug, Clone, Serialize)]
pub struct FrameSample {
    pub file: String,
    pub captured: DateTime<Local>,
    pub time_source: CaptureSource,
    pub brightness: f64,
    /// 与上一帧的亮度差（第一帧为空）
    pub delta: Option<f64>,
}

/// 无法读取的文件
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub file: String,
    pub reason: String,
}

/// 校准报告
#[derive(Debug, Clone, Serialize)]
pub struct CalibrationReport {
    pub frames: Vec<FrameSample>,
    pub skipped: Vec<SkippedFile>,
    pub min_delta: Option<f64>,
    pub max_delta: Option<f64>,
}

impl CalibrationReport {
    /// 建议阈值：观测到的最小 / 最大亮度差，并扩展到包含 0
    ///
    /// 比较是严格不等，所以观测范围内的值和无变化的帧在监控时都会被判为稳定。
    /// 所有亮度差都为 0 时无法给出区间。
    pub fn suggested_thresholds(&self) -> Option<ThresholdConfig> {
        let dark = self.min_delta?.min(0.0);
        let light = self.max_delta?.max(0.0);
        ThresholdConfig::new(light, dark).ok()
    }
}

/// 列出目录中匹配扩展名的文件；`None` 或 `"*"` 表示全部
pub fn collect_images(folder: &Path, extension: Option<&str>) -> Result<Vec<PathBuf>> {
    let wanted = extension
        .filter(|e| *e != "*")
        .map(|e| e.to_lowercase());

    let mut files = Vec::new();
    for entry in fs::read_dir(folder)
        .with_context(|| format!("Failed to read folder {}", folder.display()))?
    {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if wanted.as_ref().map_or(true, |ext| name.ends_with(ext.as_str())) {
            files.push(path);
        }
    }
    Ok(files)
}

/// 计算校准报告
pub fn calibrate(
    folder: &Path,
    extension: Option<&str>,
    probe: &dyn BrightnessProbe,
) -> Result<CalibrationReport> {
    let files = collect_images(folder, extension)?;
    let total = files.len();

    let mut frames = Vec::new();
    let mut skipped = Vec::new();

    for (i, path) in files.into_iter().enumerate() {
        let file = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        debug!(file = %file, index = i + 1, total, "Processing image");

        match read_sample(&path, probe) {
            Ok((captured, time_source, brightness)) => frames.push(FrameSample {
                file,
                captured,
                time_source,
                brightness,
                delta: None,
            }),
            Err(e) => {
                warn!(file = %file, error = %e, "Skipping unreadable image");
                skipped.push(SkippedFile {
                    file,
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(build_report(frames, skipped))
}

fn read_sample(
    path: &Path,
    probe: &dyn BrightnessProbe,
) -> Result<(DateTime<Local>, CaptureSource, f64)> {
    let bytes = fs::read(path)?;
    let brightness = probe.mean_luminance(&bytes)?;

    let (captured, source) = match exif_capture_time(&bytes) {
        Some(captured) => (captured, CaptureSource::Exif),
        None => {
            debug!(file = %path.display(), "No EXIF capture time, using modification time");
            (fs::metadata(path)?.modified()?.into(), CaptureSource::Modified)
        }
    };
    Ok((captured, source, brightness))
}

/// EXIF DateTimeOriginal，按本地时间解释
fn exif_capture_time(bytes: &[u8]) -> Option<DateTime<Local>> {
    let exif = exif::Reader::new()
        .read_from_container(&mut Cursor::new(bytes))
        .ok()?;
    let field = exif.get_field(exif::Tag::DateTimeOriginal, exif::In::PRIMARY)?;
    let exif::Value::Ascii(ref values) = field.value else {
        return None;
    };
    let taken = exif::DateTime::from_ascii(values.first()?).ok()?;

    let naive = NaiveDate::from_ymd_opt(taken.year.into(), taken.month.into(), taken.day.into())?
        .and_hms_opt(taken.hour.into(), taken.minute.into(), taken.second.into())?;
    Local.from_local_datetime(&naive).earliest()
}

/// 排序并填充相邻帧亮度差
pub fn build_report(mut frames: Vec<FrameSample>, skipped: Vec<SkippedFile>) -> CalibrationReport {
    frames.sort_by(|a, b| a.captured.cmp(&b.captured).then_with(|| a.file.cmp(&b.file)));

    for i in 1..frames.len() {
        frames[i].delta = Some(frames[i].brightness - frames[i - 1].brightness);
    }

    let deltas = frames.iter().filter_map(|f| f.delta);
    let min_delta = deltas.clone().reduce(f64::min);
    let max_delta = deltas.reduce(f64::max);

    CalibrationReport {
        frames,
        skipped,
        min_delta,
        max_delta,
    }
}
