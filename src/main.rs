//! BugCam CLI
//!
//! 监控 Dropbox 上的延时摄影照片目录，照片停更或亮度突变时发送告警。

use anyhow::{Context, Result};
use bugcam::config::{default_config_path, ConfigFile, MonitorConfig};
use bugcam::notification::TIME_FORMAT;
use bugcam::scheduler::shutdown_signal;
use bugcam::{DropboxFolder, ImageProbe, Monitor, NotificationBuilder, RemoteFolder, Scheduler};
use clap::Parser;
use crossterm::tty::IsTty;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "bugcam")]
#[command(about = "BugCam - 监控延时摄影实验，照片停更或亮度突变时告警")]
#[command(version)]
struct Cli {
    /// 要监控的 Dropbox 共享文件夹链接
    #[arg(value_name = "DROPBOX_URL")]
    url: String,
    /// 监控间隔（分钟），应与延时摄影的拍摄间隔一致
    #[arg(value_name = "MINUTES", value_parser = clap::value_parser!(u64).range(1..))]
    interval: u64,
    /// 项目名称
    #[arg(value_name = "NAME")]
    name: String,
    /// 配置文件路径 (默认: <config_dir>/bugcam/config.json)
    #[arg(long, short, value_name = "JSON")]
    config: Option<PathBuf>,
    /// Dry-run 模式（只打印不发送通知）
    #[arg(long)]
    dry_run: bool,
}

fn now_string() -> String {
    chrono::Local::now().format(TIME_FORMAT).to_string()
}

#[tokio::main]
async fn main() -> Result<()> {
    // 通过 RUST_LOG 环境变量控制日志级别，默认为 info
    // 例如: RUST_LOG=debug bugcam <url> 10 plate-3
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("bugcam=info"));

    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(default_config_path);
    let file = ConfigFile::load(&config_path)?;
    let config = MonitorConfig::from_parts(file, cli.url, cli.interval, cli.name)?;

    let dispatcher = NotificationBuilder::from_config(&config)
        .dry_run(cli.dry_run)
        .build()?;

    let folder = DropboxFolder::connect(
        &config.tokens.dropbox,
        &config.folder_url,
        config.request_timeout(),
    )
    .await
    .with_context(|| format!("Failed to connect to Dropbox folder {}", config.folder_url))?;

    // 启动前确认目录可读且非空
    let initial = folder
        .list_entries()
        .await
        .context("Initial listing of the monitored folder failed")?;
    info!(entries = initial.len(), "Initial folder listing succeeded");

    let folder_name = folder.info().name.clone();
    let mut scheduler = Scheduler::from_minutes(config.interval_minutes)?;

    let mut monitor = Monitor::new(
        config.project_name.clone(),
        Arc::new(folder),
        Arc::new(ImageProbe),
        config.thresholds,
        dispatcher,
    )
    .with_color(std::io::stdout().is_tty());

    println!("# -----------------------------------------------------------");
    println!("# BugCam Daemon");
    println!("# -----------------------------------------------------------");
    println!("# Project: {}", config.project_name);
    println!(
        "# Monitoring folder: {}, every {} minutes.",
        folder_name, config.interval_minutes
    );
    println!("# Started at: {}", now_string());
    println!(
        "# (Press Ctrl+{} to exit)",
        if cfg!(windows) { "Break" } else { "C" }
    );
    println!("#");

    scheduler.run(&mut monitor, shutdown_signal()).await?;

    println!("#");
    println!("# Stopped at {}", now_string());
    println!("# -----------------------------------------------------------");

    Ok(())
}
