//! 亮度探测 - 计算图片灰度均值
//!
//! 灰度转换使用 ITU-R 601-2 luma（与常见图像库的 "L" 模式一致），
//! 保证用校准工具得到的阈值可以直接用于监控。

use crate::error::MonitorError;
use image::RgbImage;

/// 亮度探测器
pub trait BrightnessProbe: Send + Sync {
    /// 计算灰度均值，范围 [0, 255]
    fn mean_luminance(&self, bytes: &[u8]) -> Result<f64, MonitorError>;
}

/// 基于 `image` crate 的探测器（JPEG / PNG）
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageProbe;

impl BrightnessProbe for ImageProbe {
    fn mean_luminance(&self, bytes: &[u8]) -> Result<f64, MonitorError> {
        let img = image::load_from_memory(bytes)?;
        mean_luminance(&img.to_rgb8())
    }
}

/// 单个像素的 8 位灰度值
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((r as u32 * 19595 + g as u32 * 38470 + b as u32 * 7471 + 0x8000) >> 16) as u8
}

/// RGB 图像的灰度均值
pub fn mean_luminance(img: &RgbImage) -> Result<f64, MonitorError> {
    let count = img.width() as u64 * img.height() as u64;
    if count == 0 {
        return Err(MonitorError::Decode("image has no pixels".to_string()));
    }

    let sum: u64 = img
        .pixels()
        .map(|p| luma(p.0[0], p.0[1], p.0[2]) as u64)
        .sum();

    Ok(sum as f64 / count as f64)
}
