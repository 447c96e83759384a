//! Dropbox 远程目录
//!
//! 通过 Dropbox HTTP API 访问共享链接指向的文件夹：
//! - `sharing/get_shared_link_metadata` 解析共享链接
//! - `files/list_folder`（+ `/continue`）列出文件和拍摄时间
//! - `files/download` 下载单个文件

use super::{Entry, RemoteFolder};
use crate::error::MonitorError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

/// Dropbox RPC 端点
pub const DROPBOX_API_URL: &str = "https://api.dropboxapi.com/2";

/// Dropbox 内容下载端点
pub const DROPBOX_CONTENT_URL: &str = "https://content.dropboxapi.com/2";

/// 共享文件夹信息
#[derive(Debug, Clone, Deserialize)]
pub struct FolderInfo {
    #[serde(rename = ".tag")]
    pub tag: String,
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub path_lower: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListFolderResponse {
    entries: Vec<RawEntry>,
    cursor: String,
    has_more: bool,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(rename = ".tag")]
    tag: String,
    name: String,
    #[serde(default)]
    client_modified: Option<DateTime<Utc>>,
    #[serde(default)]
    media_info: Option<MediaInfo>,
}

#[derive(Debug, Deserialize)]
struct MediaInfo {
    /// `.tag = "pending"` 时没有 metadata
    #[serde(default)]
    metadata: Option<MediaMetadata>,
}

#[derive(Debug, Deserialize)]
struct MediaMetadata {
    #[serde(default)]
    time_taken: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    error_summary: Option<String>,
}

/// Dropbox 共享文件夹
pub struct DropboxFolder {
    client: Client,
    token: String,
    api_url: String,
    content_url: String,
    info: FolderInfo,
}

impl DropboxFolder {
    /// 连接共享链接，解析出文件夹元数据
    pub async fn connect(
        token: &str,
        shared_url: &str,
        timeout: Duration,
    ) -> Result<Self, MonitorError> {
        Self::connect_with_endpoints(token, shared_url, timeout, DROPBOX_API_URL, DROPBOX_CONTENT_URL)
            .await
    }

    /// 使用自定义端点连接（代理 / 测试）
    pub async fn connect_with_endpoints(
        token: &str,
        shared_url: &str,
        timeout: Duration,
        api_url: &str,
        content_url: &str,
    ) -> Result<Self, MonitorError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MonitorError::RemoteUnavailable(format!("Failed to create HTTP client: {}", e)))?;

        let response = client
            .post(format!("{}/sharing/get_shared_link_metadata", api_url))
            .bearer_auth(token)
            .json(&serde_json::json!({ "url": shared_url }))
            .send()
            .await?;
        let response = check_status(response, shared_url).await?;
        let info: FolderInfo = response.json().await?;

        if info.tag != "folder" {
            return Err(MonitorError::InvalidConfig(format!(
                "shared link points to a {}, not a folder",
                info.tag
            )));
        }

        info!(folder = %info.name, id = %info.id, "Connected to Dropbox folder");

        Ok(Self {
            client,
            token: token.to_string(),
            api_url: api_url.to_string(),
            content_url: content_url.to_string(),
            info,
        })
    }

    pub fn info(&self) -> &FolderInfo {
        &self.info
    }

    /// 文件在 Dropbox 中的路径
    fn entry_path(&self, entry: &Entry) -> String {
        match &self.info.path_lower {
            Some(path) => format!("{}/{}", path, entry.name),
            None => format!("{}/{}", self.info.id, entry.name),
        }
    }

    async fn list_page(&self, cursor: Option<&str>) -> Result<ListFolderResponse, MonitorError> {
        let request = match cursor {
            None => self
                .client
                .post(format!("{}/files/list_folder", self.api_url))
                .json(&serde_json::json!({
                    "path": self.info.id,
                    "include_media_info": true,
                    "recursive": false,
                })),
            Some(cursor) => self
                .client
                .post(format!("{}/files/list_folder/continue", self.api_url))
                .json(&serde_json::json!({ "cursor": cursor })),
        };

        let response = request.bearer_auth(&self.token).send().await?;
        let response = check_status(response, &self.info.name).await?;
        Ok(response.json().await?)
    }
}

/// `list_folder` 分页来源；`cursor` 为空时取第一页
#[async_trait]
trait FolderPages: Send + Sync {
    async fn page(&self, cursor: Option<&str>) -> Result<ListFolderResponse, MonitorError>;
}

#[async_trait]
impl FolderPages for DropboxFolder {
    async fn page(&self, cursor: Option<&str>) -> Result<ListFolderResponse, MonitorError> {
        self.list_page(cursor).await
    }
}

/// 沿 cursor 翻页直到 `has_more == false`，任一页失败则整体失败
async fn collect_entries(source: &dyn FolderPages) -> Result<Vec<Entry>, MonitorError> {
    let mut entries = Vec::new();
    let mut page = source.page(None).await?;
    loop {
        entries.extend(page.entries.into_iter().filter_map(into_entry));
        if !page.has_more {
            break;
        }
        page = source.page(Some(&page.cursor)).await?;
    }
    Ok(entries)
}

#[async_trait]
impl RemoteFolder for DropboxFolder {
    fn name(&self) -> &str {
        &self.info.name
    }

    async fn list_entries(&self) -> Result<Vec<Entry>, MonitorError> {
        let entries = collect_entries(self).await?;

        debug!(folder = %self.info.name, count = entries.len(), "Listed folder");

        if entries.is_empty() {
            return Err(MonitorError::EmptyFolder);
        }
        Ok(entries)
    }

    async fn fetch_bytes(&self, entry: &Entry) -> Result<Vec<u8>, MonitorError> {
        let path = self.entry_path(entry);
        let arg = header_safe_json(&serde_json::json!({ "path": path }).to_string());

        let response = self
            .client
            .post(format!("{}/files/download", self.content_url))
            .bearer_auth(&self.token)
            .header("Dropbox-API-Arg", arg)
            .send()
            .await?;
        let response = check_status(response, &entry.name).await?;
        let bytes = response.bytes().await?;

        debug!(entry = %entry.name, size = bytes.len(), "Downloaded photo");
        Ok(bytes.to_vec())
    }
}

/// 只保留文件条目；拍摄时间优先取 media_info，缺失时退回 client_modified
fn into_entry(raw: RawEntry) -> Option<Entry> {
    if raw.tag != "file" {
        return None;
    }
    let taken = raw
        .media_info
        .and_then(|m| m.metadata)
        .and_then(|m| m.time_taken);
    match taken.or(raw.client_modified) {
        Some(captured_at) => Some(Entry::new(raw.name, captured_at)),
        None => {
            debug!(entry = %raw.name, "Skipping entry without timestamp");
            None
        }
    }
}

/// 将非成功响应映射为 MonitorError
async fn check_status(response: Response, subject: &str) -> Result<Response, MonitorError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(map_error_status(status, &body, subject))
}

fn map_error_status(status: StatusCode, body: &str, subject: &str) -> MonitorError {
    let summary = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.error_summary)
        .unwrap_or_else(|| body.trim().to_string());

    match status {
        StatusCode::CONFLICT if summary.contains("not_found") => {
            MonitorError::NotFound(subject.to_string())
        }
        StatusCode::UNAUTHORIZED => {
            MonitorError::RemoteUnavailable(format!("unauthorized: {}", summary))
        }
        _ => MonitorError::RemoteUnavailable(format!("HTTP {}: {}", status.as_u16(), summary)),
    }
}

/// Dropbox-API-Arg 头只能包含 ASCII，非 ASCII 字符转义为 \uXXXX
fn header_safe_json(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            let mut buf = [0u16; 2];
            for unit in c.encode_utf16(&mut buf) {
                out.push_str(&format!("\\u{:04x}", unit));
            }
        }
    }
    out
}
