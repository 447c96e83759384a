//! 异常检测 - 新照片检测 + 两帧亮度差分类

use super::state::MonitorState;
use super::types::{BrightnessStatus, CycleResult, NewPhotoStatus, TimestampList};
use crate::config::ThresholdConfig;
use crate::error::MonitorError;
use crate::remote::Entry;
use async_trait::async_trait;
use tracing::debug;

/// 获取某一帧的亮度
#[async_trait]
pub trait FrameBrightness: Send + Sync {
    async fn brightness_of(&self, entry: &Entry) -> Result<f64, MonitorError>;
}

/// 按阈值带分类亮度差（严格不等：等于阈值视为稳定）
pub fn classify(delta: f64, thresholds: &ThresholdConfig) -> BrightnessStatus {
    if delta < thresholds.dark {
        BrightnessStatus::Decrease
    } else if delta > thresholds.light {
        BrightnessStatus::Increase
    } else {
        BrightnessStatus::Stable
    }
}

/// 异常检测器
#[derive(Debug, Clone)]
pub struct AnomalyDetector {
    thresholds: ThresholdConfig,
}

impl AnomalyDetector {
    pub fn new(thresholds: ThresholdConfig) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ThresholdConfig {
        &self.thresholds
    }

    /// 评估一个周期
    ///
    /// 只在有新照片且至少两张照片时下载最新两帧比较亮度。
    /// 亮度获取失败时直接返回错误，状态保持不变；成功时最新文件写入状态。
    pub async fn evaluate(
        &self,
        list: &TimestampList,
        state: &mut MonitorState,
        frames: &dyn FrameBrightness,
    ) -> Result<CycleResult, MonitorError> {
        let newest = list.newest();

        let new_photo = if state.last_seen() == Some(newest) {
            NewPhotoStatus::Absent
        } else {
            NewPhotoStatus::Present
        };

        let (brightness, delta) = match (new_photo, list.second_newest()) {
            (NewPhotoStatus::Present, Some(previous)) => {
                let current_value = frames.brightness_of(newest).await?;
                let previous_value = frames.brightness_of(previous).await?;
                let delta = current_value - previous_value;
                debug!(
                    newest = %newest.name,
                    previous = %previous.name,
                    current_value,
                    previous_value,
                    delta,
                    "Compared frame brightness"
                );
                (classify(delta, &self.thresholds), Some(delta))
            }
            _ => (BrightnessStatus::Skipped, None),
        };

        let result = CycleResult {
            new_photo,
            brightness,
            delta,
        };
        state.record(newest.clone(), result.clone());
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 按文件名查表的亮度源
    struct TableBrightness {
        values: HashMap<String, f64>,
        calls: AtomicUsize,
    }

    impl TableBrightness {
        fn new(values: &[(&str, f64)]) -> Self {
            Self {
                values: values.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl FrameBrightness for TableBrightness {
        async fn brightness_of(&self, entry: &Entry) -> Result<f64, MonitorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.values
                .get(&entry.name)
                .copied()
                .ok_or_else(|| MonitorError::Decode(entry.name.clone()))
        }
    }

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap()
    }

    fn thresholds() -> ThresholdConfig {
        ThresholdConfig { light: 10.0, dark: -10.0 }
    }

    fn two_frames() -> TimestampList {
        TimestampList::new(vec![Entry::new("old.jpg", at(0)), Entry::new("new.jpg", at(5))]).unwrap()
    }

    #[test]
    fn test_classify_boundaries_are_stable() {
        let t = thresholds();
        assert_eq!(classify(10.0, &t), BrightnessStatus::Stable);
        assert_eq!(classify(-10.0, &t), BrightnessStatus::Stable);
        assert_eq!(classify(10.0001, &t), BrightnessStatus::Increase);
        assert_eq!(classify(-10.0001, &t), BrightnessStatus::Decrease);
        assert_eq!(classify(0.0, &t), BrightnessStatus::Stable);
    }

    #[tokio::test]
    async fn test_stable_scenario() {
        let detector = AnomalyDetector::new(thresholds());
        let mut state = MonitorState::new();
        let frames = TableBrightness::new(&[("new.jpg", 100.0), ("old.jpg", 95.0)]);

        let result = detector.evaluate(&two_frames(), &mut state, &frames).await.unwrap();

        assert_eq!(result.new_photo, NewPhotoStatus::Present);
        assert_eq!(result.brightness, BrightnessStatus::Stable);
        assert_eq!(result.delta, Some(5.0));
    }

    #[tokio::test]
    async fn test_increase_and_decrease() {
        let detector = AnomalyDetector::new(thresholds());

        let mut state = MonitorState::new();
        let brighter = TableBrightness::new(&[("new.jpg", 100.0), ("old.jpg", 70.0)]);
        let result = detector.evaluate(&two_frames(), &mut state, &brighter).await.unwrap();
        assert_eq!(result.brightness, BrightnessStatus::Increase);

        let mut state = MonitorState::new();
        let darker = TableBrightness::new(&[("new.jpg", 20.0), ("old.jpg", 90.0)]);
        let result = detector.evaluate(&two_frames(), &mut state, &darker).await.unwrap();
        assert_eq!(result.brightness, BrightnessStatus::Decrease);
        assert_eq!(result.delta, Some(-70.0));
    }

    #[tokio::test]
    async fn test_delta_exactly_on_threshold() {
        let detector = AnomalyDetector::new(thresholds());
        let mut state = MonitorState::new();
        let frames = TableBrightness::new(&[("new.jpg", 110.0), ("old.jpg", 100.0)]);

        let result = detector.evaluate(&two_frames(), &mut state, &frames).await.unwrap();
        assert_eq!(result.brightness, BrightnessStatus::Stable);

        let mut state = MonitorState::new();
        let frames = TableBrightness::new(&[("new.jpg", 90.0), ("old.jpg", 100.0)]);
        let result = detector.evaluate(&two_frames(), &mut state, &frames).await.unwrap();
        assert_eq!(result.brightness, BrightnessStatus::Stable);
    }

    #[tokio::test]
    async fn test_unchanged_newest_is_absent_and_skipped() {
        let detector = AnomalyDetector::new(thresholds());
        let mut state = MonitorState::new();
        let frames = TableBrightness::new(&[("new.jpg", 100.0), ("old.jpg", 95.0)]);

        detector.evaluate(&two_frames(), &mut state, &frames).await.unwrap();
        let calls_after_first = frames.calls();
        let result = detector.evaluate(&two_frames(), &mut state, &frames).await.unwrap();

        assert_eq!(result.new_photo, NewPhotoStatus::Absent);
        assert_eq!(result.brightness, BrightnessStatus::Skipped);
        assert_eq!(result.delta, None);
        // 没有新照片时不下载
        assert_eq!(frames.calls(), calls_after_first);
        assert_eq!(state.last_seen().unwrap().name, "new.jpg");
    }

    #[tokio::test]
    async fn test_single_entry_is_skipped() {
        let detector = AnomalyDetector::new(thresholds());
        let mut state = MonitorState::new();
        let frames = TableBrightness::new(&[]);
        let list = TimestampList::new(vec![Entry::new("only.jpg", at(0))]).unwrap();

        let result = detector.evaluate(&list, &mut state, &frames).await.unwrap();

        assert_eq!(result.new_photo, NewPhotoStatus::Present);
        assert_eq!(result.brightness, BrightnessStatus::Skipped);
        assert_eq!(frames.calls(), 0);
        assert_eq!(state.last_seen().unwrap().name, "only.jpg");
    }

    #[tokio::test]
    async fn test_same_name_new_timestamp_is_new_photo() {
        let detector = AnomalyDetector::new(thresholds());
        let mut state = MonitorState::new();
        let frames = TableBrightness::new(&[]);

        let first = TimestampList::new(vec![Entry::new("latest.jpg", at(0))]).unwrap();
        detector.evaluate(&first, &mut state, &frames).await.unwrap();

        let second = TimestampList::new(vec![Entry::new("latest.jpg", at(5))]).unwrap();
        let result = detector.evaluate(&second, &mut state, &frames).await.unwrap();
        assert_eq!(result.new_photo, NewPhotoStatus::Present);
    }

    #[tokio::test]
    async fn test_brightness_failure_leaves_state_untouched() {
        let detector = AnomalyDetector::new(thresholds());
        let mut state = MonitorState::new();
        // old.jpg missing -> decode error
        let frames = TableBrightness::new(&[("new.jpg", 100.0)]);

        let err = detector.evaluate(&two_frames(), &mut state, &frames).await.unwrap_err();

        assert!(matches!(err, MonitorError::Decode(_)));
        assert!(state.last_seen().is_none());
        assert!(state.last_result().is_none());
        assert_eq!(state.cycles_evaluated(), 0);
    }

    #[tokio::test]
    async fn test_compares_two_newest_by_capture_time() {
        let detector = AnomalyDetector::new(thresholds());
        let mut state = MonitorState::new();
        // listing order: newest last
        let list = TimestampList::new(vec![
            Entry::new("a.jpg", at(0)),
            Entry::new("b.jpg", at(5)),
            Entry::new("c.jpg", at(10)),
        ])
        .unwrap();
        let frames = TableBrightness::new(&[("a.jpg", 0.0), ("b.jpg", 100.0), ("c.jpg", 60.0)]);

        let result = detector.evaluate(&list, &mut state, &frames).await.unwrap();

        assert_eq!(result.delta, Some(-40.0));
        assert_eq!(result.brightness, BrightnessStatus::Decrease);
    }
}
