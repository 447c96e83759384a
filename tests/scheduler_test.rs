//! 调度器集成测试
//!
//! 使用 tokio 暂停时钟（`start_paused = true`），不需要真实等待。

mod common;

use async_trait::async_trait;
use bugcam::monitor::{MSG_MONITOR_START, MSG_MONITOR_STOP, MSG_NO_NEW_PHOTO};
use bugcam::{
    CycleTask, MemoryFolder, Monitor, RemoteFolder, Scheduler, SchedulerState, Severity,
    ThresholdConfig,
};
use common::{add_photo, dispatcher_with, FirstByteProbe, RecordingChannel};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};

const MINUTE: Duration = Duration::from_secs(60);

/// 每个周期耗时可配置的任务，记录开始和结束时间
struct SlowTask {
    origin: Instant,
    durations: Vec<Duration>,
    starts: Vec<Duration>,
    finished: usize,
    running: Arc<AtomicBool>,
    overlaps: Arc<AtomicUsize>,
}

impl SlowTask {
    fn new(durations: Vec<Duration>) -> Self {
        Self {
            origin: Instant::now(),
            durations,
            starts: Vec::new(),
            finished: 0,
            running: Arc::new(AtomicBool::new(false)),
            overlaps: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl CycleTask for SlowTask {
    async fn run_cycle(&mut self) {
        if self.running.swap(true, Ordering::SeqCst) {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        let index = self.starts.len();
        self.starts.push(Instant::now() - self.origin);

        let duration = self.durations.get(index).copied().unwrap_or(Duration::ZERO);
        sleep(duration).await;

        self.finished += 1;
        self.running.store(false, Ordering::SeqCst);
    }
}

#[tokio::test(start_paused = true)]
async fn test_slow_cycle_skips_exactly_one_tick() {
    let mut scheduler = Scheduler::new(MINUTE).unwrap();
    // first cycle takes 1.5 intervals
    let mut task = SlowTask::new(vec![Duration::from_secs(90)]);

    let stats = scheduler
        .run(&mut task, sleep(Duration::from_secs(250)))
        .await
        .unwrap();

    // t=60 (runs until 150), t=120 skipped, t=180, t=240
    assert_eq!(
        task.starts,
        vec![
            Duration::from_secs(60),
            Duration::from_secs(180),
            Duration::from_secs(240)
        ]
    );
    assert_eq!(stats.cycles_run, 3);
    assert_eq!(stats.ticks_skipped, 1);
    assert_eq!(task.overlaps.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_cycle_lasting_exactly_one_interval_keeps_next_boundary() {
    let mut scheduler = Scheduler::new(MINUTE).unwrap();
    let mut task = SlowTask::new(vec![MINUTE, MINUTE]);

    let stats = scheduler
        .run(&mut task, sleep(Duration::from_secs(190)))
        .await
        .unwrap();

    // t=60..120, t=120..180, t=180
    assert_eq!(
        task.starts,
        vec![
            Duration::from_secs(60),
            Duration::from_secs(120),
            Duration::from_secs(180)
        ]
    );
    assert_eq!(stats.ticks_skipped, 0);
    assert_eq!(task.overlaps.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_stop_during_cycle_lets_it_finish() {
    let mut scheduler = Scheduler::new(MINUTE).unwrap();
    let mut task = SlowTask::new(vec![Duration::from_secs(30)]);

    // stop fires at t=70 while the first cycle (t=60..90) is running
    let stats = scheduler
        .run(&mut task, sleep(Duration::from_secs(70)))
        .await
        .unwrap();

    assert_eq!(stats.cycles_run, 1);
    assert_eq!(task.finished, 1);
    assert_eq!(scheduler.state(), SchedulerState::Stopped);
    // scheduler returned right after the drained cycle, not at the next tick
    assert_eq!(Instant::now() - task.origin, Duration::from_secs(90));
}

#[tokio::test(start_paused = true)]
async fn test_monitor_lifecycle_notifications() {
    let folder = Arc::new(MemoryFolder::new("plates"));
    add_photo(&folder, "IMG_0001.jpg", 0, 100);
    let channel = Arc::new(RecordingChannel::default());
    let mut monitor = Monitor::new(
        "plate-3",
        folder.clone() as Arc<dyn RemoteFolder>,
        Arc::new(FirstByteProbe),
        ThresholdConfig { light: 10.0, dark: -10.0 },
        dispatcher_with(channel.clone()),
    );
    let mut scheduler = Scheduler::from_minutes(10).unwrap();

    // two cycles: t=10min (first photo), t=20min (no new photo)
    let stats = scheduler
        .run(&mut monitor, sleep(Duration::from_secs(25 * 60)))
        .await
        .unwrap();

    assert_eq!(stats.cycles_run, 2);
    let sent = channel.sent();
    let messages: Vec<&str> = sent.iter().map(|n| n.message.as_str()).collect();
    assert_eq!(messages, vec![MSG_MONITOR_START, MSG_NO_NEW_PHOTO, MSG_MONITOR_STOP]);
    assert_eq!(sent[0].severity, Severity::Info);
    assert_eq!(sent[0].text(), "*Monitor START*: plate-3");
    assert_eq!(sent[1].severity, Severity::Warning);
    assert_eq!(monitor.state().cycles_evaluated(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_no_cycle_before_first_interval_for_monitor() {
    let folder = Arc::new(MemoryFolder::new("plates"));
    add_photo(&folder, "IMG_0001.jpg", 0, 100);
    let channel = Arc::new(RecordingChannel::default());
    let mut monitor = Monitor::new(
        "plate-3",
        folder.clone() as Arc<dyn RemoteFolder>,
        Arc::new(FirstByteProbe),
        ThresholdConfig { light: 10.0, dark: -10.0 },
        dispatcher_with(channel.clone()),
    );
    let mut scheduler = Scheduler::from_minutes(10).unwrap();

    scheduler
        .run(&mut monitor, sleep(Duration::from_secs(9 * 60)))
        .await
        .unwrap();

    assert!(monitor.state().last_seen().is_none());
    assert_eq!(
        channel.messages(),
        vec![MSG_MONITOR_START.to_string(), MSG_MONITOR_STOP.to_string()]
    );
}
