//! BugCam 阈值校准工具
//!
//! 对一次正常实验的本地照片计算相邻帧亮度差，给出可写入配置的 light / dark 阈值。

use anyhow::Result;
use bugcam::calibrate::{calibrate, CaptureSource};
use bugcam::ImageProbe;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "bugcam-calibrate")]
#[command(about = "根据已有照片计算亮度差，辅助设置 BugCam 阈值")]
#[command(version)]
struct Cli {
    /// 照片所在的本地目录
    folder: PathBuf,
    /// 只处理以此结尾的文件，例如 .jpg（默认全部）
    #[arg(long, short, default_value = "*")]
    extension: String,
    /// 输出 JSON 格式
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("bugcam=info"));

    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let report = calibrate(&cli.folder, Some(&cli.extension), &ImageProbe)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{:<32} {:<20} {:<8} {:>10} {:>10}",
        "file", "captured", "source", "brightness", "delta"
    );
    for frame in &report.frames {
        let delta = frame
            .delta
            .map(|d| format!("{:.2}", d))
            .unwrap_or_else(|| "-".to_string());
        let source = match frame.time_source {
            CaptureSource::Exif => "exif",
            CaptureSource::Modified => "mtime",
        };
        println!(
            "{:<32} {:<20} {:<8} {:>10.2} {:>10}",
            frame.file,
            frame.captured.format("%Y-%m-%d %H:%M:%S").to_string(),
            source,
            frame.brightness,
            delta
        );
    }

    for skipped in &report.skipped {
        eprintln!("skipped {}: {}", skipped.file, skipped.reason);
    }

    println!();
    match (report.min_delta, report.max_delta) {
        (Some(min), Some(max)) => {
            println!("Frames: {}  min delta: {:.2}  max delta: {:.2}", report.frames.len(), min, max);
            match report.suggested_thresholds() {
                Some(t) => println!(
                    "Suggested config: \"brightness_threshold\": {{\"light\": {:.2}, \"dark\": {:.2}}}",
                    t.light, t.dark
                ),
                None => println!("All deltas are zero, choose the thresholds manually."),
            }
        }
        _ => println!("Need at least two readable frames to compute deltas."),
    }

    Ok(())
}
