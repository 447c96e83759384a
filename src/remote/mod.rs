//! 远程照片目录抽象
//!
//! `RemoteFolder` 只需要两个操作：列出目录（带拍摄时间）和下载单个文件。
//! 生产实现为 `DropboxFolder`，测试使用内存实现 `MemoryFolder`。

pub mod dropbox;

pub use dropbox::{DropboxFolder, FolderInfo};

use crate::error::MonitorError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

/// 远程目录中的一个文件
///
/// 身份由 (name, captured_at) 共同决定。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    pub captured_at: DateTime<Utc>,
}

impl Entry {
    pub fn new(name: impl Into<String>, captured_at: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            captured_at,
        }
    }
}

/// 远程目录
#[async_trait]
pub trait RemoteFolder: Send + Sync {
    /// 目录显示名称
    fn name(&self) -> &str;

    /// 列出目录中的文件（顺序不保证）
    async fn list_entries(&self) -> Result<Vec<Entry>, MonitorError>;

    /// 下载文件原始字节
    async fn fetch_bytes(&self, entry: &Entry) -> Result<Vec<u8>, MonitorError>;
}

/// 内存目录，用于测试和离线演练
pub struct MemoryFolder {
    name: String,
    entries: Mutex<Vec<Entry>>,
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    /// 下一次 list 返回的错误（一次性）
    fail_next_list: Mutex<Option<MonitorError>>,
}

impl MemoryFolder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Mutex::new(Vec::new()),
            blobs: Mutex::new(HashMap::new()),
            fail_next_list: Mutex::new(None),
        }
    }

    /// 添加文件
    pub fn insert(&self, entry: Entry, bytes: Vec<u8>) {
        if let Ok(mut blobs) = self.blobs.lock() {
            blobs.insert(entry.name.clone(), bytes);
        }
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry);
        }
    }

    /// 让下一次 `list_entries` 失败
    pub fn fail_next_list(&self, error: MonitorError) {
        if let Ok(mut slot) = self.fail_next_list.lock() {
            *slot = Some(error);
        }
    }

    fn poisoned() -> MonitorError {
        MonitorError::RemoteUnavailable("memory folder lock poisoned".to_string())
    }
}

#[async_trait]
impl RemoteFolder for MemoryFolder {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list_entries(&self) -> Result<Vec<Entry>, MonitorError> {
        if let Some(err) = self.fail_next_list.lock().map_err(|_| Self::poisoned())?.take() {
            return Err(err);
        }
        let entries = self.entries.lock().map_err(|_| Self::poisoned())?.clone();
        if entries.is_empty() {
            return Err(MonitorError::EmptyFolder);
        }
        Ok(entries)
    }

    async fn fetch_bytes(&self, entry: &Entry) -> Result<Vec<u8>, MonitorError> {
        self.blobs
            .lock()
            .map_err(|_| Self::poisoned())?
            .get(&entry.name)
            .cloned()
            .ok_or_else(|| MonitorError::NotFound(entry.name.clone()))
    }
}
