//! 周期调度器
//!
//! 状态机：`Created → Running → Stopped`。
//!
//! - 第一个周期在启动后整一个间隔才触发，不在 t=0 执行
//! - 触发点固定在 `start + k * interval`，周期在当前任务内顺序执行，永不重叠
//! - 周期执行期间错过的触发点直接丢弃，不排队补跑
//! - 停止信号只在周期之间检查，正在执行的周期会先跑完

use crate::error::MonitorError;
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info, warn};

/// 允许的最长间隔（366 天）
pub const MAX_INTERVAL: Duration = Duration::from_secs(366 * 24 * 60 * 60);

/// 调度器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Created,
    Running,
    Stopped,
}

/// 被调度的任务
#[async_trait]
pub trait CycleTask: Send {
    /// 进入 Running 时调用一次
    async fn on_start(&mut self) {}

    /// 执行一个周期；错误由任务自己处理，调度器不关心结果
    async fn run_cycle(&mut self);

    /// 进入 Stopped 时调用一次
    async fn on_stop(&mut self) {}
}

/// 调度统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// 已执行的周期数
    pub cycles_run: u64,
    /// 因上一周期超时而丢弃的触发点
    pub ticks_skipped: u64,
}

/// 周期调度器
#[derive(Debug)]
pub struct Scheduler {
    interval: Duration,
    state: SchedulerState,
    stats: SchedulerStats,
}

impl Scheduler {
    /// 创建调度器，间隔必须在 `(0, MAX_INTERVAL]` 内
    pub fn new(interval: Duration) -> Result<Self, MonitorError> {
        if interval.is_zero() {
            return Err(MonitorError::InvalidConfig(
                "scheduler interval must be positive".to_string(),
            ));
        }
        if interval > MAX_INTERVAL {
            return Err(MonitorError::InvalidConfig(format!(
                "scheduler interval must not exceed {} days",
                MAX_INTERVAL.as_secs() / 86_400
            )));
        }
        Ok(Self {
            interval,
            state: SchedulerState::Created,
            stats: SchedulerStats::default(),
        })
    }

    /// 以分钟为单位创建
    pub fn from_minutes(minutes: u64) -> Result<Self, MonitorError> {
        let secs = minutes.checked_mul(60).ok_or_else(|| {
            MonitorError::InvalidConfig(format!("interval of {} minutes is too large", minutes))
        })?;
        Self::new(Duration::from_secs(secs))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }

    /// 运行直到 `stop` 完成
    ///
    /// 调度器只能启动一次，重复调用返回错误。
    pub async fn run<T, S>(&mut self, task: &mut T, stop: S) -> Result<SchedulerStats, MonitorError>
    where
        T: CycleTask + ?Sized,
        S: Future<Output = ()>,
    {
        if self.state != SchedulerState::Created {
            return Err(MonitorError::InvalidConfig(format!(
                "scheduler cannot start from state {:?}",
                self.state
            )));
        }

        self.state = SchedulerState::Running;
        info!(interval_secs = self.interval.as_secs(), "Scheduler running");
        task.on_start().await;

        let start = Instant::now();
        let mut next_tick: u32 = 1;
        tokio::pin!(stop);

        loop {
            let Some(deadline) = self
                .interval
                .checked_mul(next_tick)
                .and_then(|offset| start.checked_add(offset))
            else {
                error!(tick = next_tick, "Next tick is out of clock range, stopping");
                break;
            };

            tokio::select! {
                biased;
                _ = &mut stop => {
                    info!("Stop requested, scheduler shutting down");
                    break;
                }
                _ = sleep_until(deadline) => {}
            }

            debug!(tick = next_tick, "Running cycle");
            task.run_cycle().await;
            self.stats.cycles_run += 1;

            let following = next_boundary(start, Instant::now(), self.interval)
                .max(next_tick.saturating_add(1));
            let skipped = following - next_tick.saturating_add(1);
            if skipped > 0 {
                warn!(skipped, "Cycle overran the interval, dropping missed ticks");
                self.stats.ticks_skipped += skipped as u64;
            }
            next_tick = following;
        }

        task.on_stop().await;
        self.state = SchedulerState::Stopped;
        info!(
            cycles = self.stats.cycles_run,
            skipped = self.stats.ticks_skipped,
            "Scheduler stopped"
        );
        Ok(self.stats)
    }
}

/// 不早于 `now` 的第一个触发点序号（恰好落在触发点上时就是该点）
fn next_boundary(start: Instant, now: Instant, interval: Duration) -> u32 {
    let elapsed = now.saturating_duration_since(start).as_nanos();
    let interval = interval.as_nanos();
    let ticks = elapsed / interval + u128::from(elapsed % interval != 0);
    ticks.min(u32::MAX as u128) as u32
}

/// 等待进程中断信号（Ctrl+C，Unix 上还包括 SIGTERM）
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for ctrl_c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
