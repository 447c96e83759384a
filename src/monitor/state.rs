//! 监控状态
//!
//! 普通可变对象，不做内部加锁：调度器保证同一时刻只有一个周期在执行，
//! 每个周期通过 `&mut MonitorState` 独占访问。不要把它放进 Arc 在多个任务间共享。

use super::types::CycleResult;
use crate::remote::Entry;

#[derive(Debug, Default)]
pub struct MonitorState {
    last_seen: Option<Entry>,
    last_result: Option<CycleResult>,
    cycles_evaluated: u64,
}

impl MonitorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 上一个周期看到的最新文件
    pub fn last_seen(&self) -> Option<&Entry> {
        self.last_seen.as_ref()
    }

    /// 上一个周期的检测结果
    pub fn last_result(&self) -> Option<&CycleResult> {
        self.last_result.as_ref()
    }

    /// 成功完成检测的周期数
    pub fn cycles_evaluated(&self) -> u64 {
        self.cycles_evaluated
    }

    /// 周期结束时的唯一更新点
    pub(crate) fn record(&mut self, newest: Entry, result: CycleResult) {
        self.last_seen = Some(newest);
        self.last_result = Some(result);
        self.cycles_evaluated += 1;
    }
}
