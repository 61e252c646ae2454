//! MeowMeow: desktop front-end for downloading videos with yt-dlp

// Window state, widgets and notifications
mod app;
// Startup configuration (default folder, yt-dlp binary)
mod config;
// External downloader (yt-dlp) seam
mod downloader;
// Data models for requests, outcomes and task status
mod model;
// yt-dlp format / output template mapping
mod options;
// Progress parsing utilities
mod progress;
// Background worker that runs one download
mod task;

use std::sync::Arc;

use anyhow::Context as _;
use eframe::egui;
use egui::Visuals;
use tokio::runtime::Runtime;
use tracing::info;
use tracing_subscriber::EnvFilter;

use app::MeowApp;
use config::AppConfig;
use downloader::YtDlp;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("meow_downloader=info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Program entry point: resolves config, starts the worker runtime and launches the GUI
fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::from_env().context("invalid configuration")?;
    info!(
        download_dir = %config.download_dir.display(),
        ytdlp = %config.ytdlp_binary.display(),
        "starting"
    );

    // Blocking pool for download workers; lives until the window closes
    let runtime = Runtime::new().context("failed to start worker runtime")?;
    let downloader = Arc::new(YtDlp::new(config.ytdlp_binary.clone()));
    let handle = runtime.handle().clone();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("MeowMeow")
            .with_inner_size([720.0, 420.0]),
        ..Default::default()
    };
    let result = eframe::run_native(
        "MeowMeow",
        options,
        Box::new(move |cc| {
            cc.egui_ctx.set_visuals(Visuals::dark());
            Box::new(MeowApp::new(&config, handle, downloader))
        }),
    );

    // Don't hold the process open for downloads still in flight.
    runtime.shutdown_background();
    result.map_err(|e| anyhow::anyhow!("GUI failed: {e}"))
}
