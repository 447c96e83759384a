//! 监控周期 - 列目录 → 排序 → 检测 → 更新状态 → 告警

use super::detector::{AnomalyDetector, FrameBrightness};
use super::router::AlertRouter;
use super::state::MonitorState;
use super::status_line::{format_error_line, format_status_line};
use super::types::{CycleResult, TimestampList};
use crate::brightness::BrightnessProbe;
use crate::config::ThresholdConfig;
use crate::error::MonitorError;
use crate::notification::{Notification, NotificationDispatcher, TIME_FORMAT};
use crate::remote::{Entry, RemoteFolder};
use crate::scheduler::CycleTask;
use async_trait::async_trait;
use chrono::Local;
use std::sync::Arc;
use tracing::{error, info, warn};

pub const MSG_MONITOR_START: &str = "Monitor START";
pub const MSG_MONITOR_STOP: &str = "Monitor STOP";

/// 通过远程目录下载 + 亮度探测获得帧亮度
pub struct FolderFrames<'a> {
    folder: &'a dyn RemoteFolder,
    probe: &'a dyn BrightnessProbe,
}

impl<'a> FolderFrames<'a> {
    pub fn new(folder: &'a dyn RemoteFolder, probe: &'a dyn BrightnessProbe) -> Self {
        Self { folder, probe }
    }
}

#[async_trait]
impl FrameBrightness for FolderFrames<'_> {
    async fn brightness_of(&self, entry: &Entry) -> Result<f64, MonitorError> {
        let bytes = self.folder.fetch_bytes(entry).await?;
        self.probe.mean_luminance(&bytes)
    }
}

/// 单个周期的结果
#[derive(Debug)]
pub enum CycleOutcome {
    /// 检测完成
    Completed {
        result: CycleResult,
        alerts: Vec<Notification>,
    },
    /// 出错，本周期不更新状态、不告警
    Aborted(MonitorError),
}

/// 监控器：持有状态和所有协作者，由调度器逐周期驱动
pub struct Monitor {
    project: String,
    folder: Arc<dyn RemoteFolder>,
    probe: Arc<dyn BrightnessProbe>,
    detector: AnomalyDetector,
    state: MonitorState,
    dispatcher: NotificationDispatcher,
    color: bool,
}

impl Monitor {
    pub fn new(
        project: impl Into<String>,
        folder: Arc<dyn RemoteFolder>,
        probe: Arc<dyn BrightnessProbe>,
        thresholds: ThresholdConfig,
        dispatcher: NotificationDispatcher,
    ) -> Self {
        Self {
            project: project.into(),
            folder,
            probe,
            detector: AnomalyDetector::new(thresholds),
            state: MonitorState::new(),
            dispatcher,
            color: false,
        }
    }

    /// 状态行是否使用颜色
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn state(&self) -> &MonitorState {
        &self.state
    }

    /// 执行一个完整周期
    pub async fn cycle(&mut self) -> CycleOutcome {
        let now = Local::now();
        let time = now.format(TIME_FORMAT).to_string();

        let result = match self.evaluate().await {
            Ok(result) => result,
            Err(e) => {
                if e.is_transient() {
                    warn!(project = %self.project, error = %e, "Cycle skipped, will retry next interval");
                } else {
                    error!(project = %self.project, error = %e, "Cycle failed");
                }
                println!("{}", format_error_line(&e.to_string(), &time, self.color));
                return CycleOutcome::Aborted(e);
            }
        };

        println!("{}", format_status_line(&result, &time, self.color));
        info!(
            project = %self.project,
            new_photo = ?result.new_photo,
            brightness = %result.brightness,
            delta = ?result.delta,
            "Cycle completed"
        );

        let alerts = AlertRouter::route(&result, &self.project, now);
        for alert in &alerts {
            self.dispatcher.send(alert).await;
        }

        CycleOutcome::Completed { result, alerts }
    }

    async fn evaluate(&mut self) -> Result<CycleResult, MonitorError> {
        let entries = self.folder.list_entries().await?;
        let list = TimestampList::new(entries)?;
        let frames = FolderFrames::new(self.folder.as_ref(), self.probe.as_ref());
        self.detector.evaluate(&list, &mut self.state, &frames).await
    }

    async fn announce(&self, message: &str) {
        let notification = Notification::info(&self.project, message, Local::now());
        self.dispatcher.send(&notification).await;
    }
}

#[async_trait]
impl CycleTask for Monitor {
    async fn on_start(&mut self) {
        self.announce(MSG_MONITOR_START).await;
    }

    async fn run_cycle(&mut self) {
        self.cycle().await;
    }

    async fn on_stop(&mut self) {
        self.announce(MSG_MONITOR_STOP).await;
    }
}
