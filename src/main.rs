//! GTD Dashboard - Interactive terrorism incident dashboard
//!
//! Fetches the incident extract once, then serves the dashboard window.

use anyhow::{anyhow, Context};
use eframe::egui;
use gtd_dashboard::config::{DashboardConfig, CONFIG_FILE};
use gtd_dashboard::data::DataLoader;
use gtd_dashboard::gui::DashboardApp;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = DashboardConfig::load_or_default(Path::new(CONFIG_FILE))
        .with_context(|| format!("reading {}", CONFIG_FILE))?;

    info!(source = %config.source, "loading incidents");
    let table = DataLoader::new(config.fetch_timeout())
        .load(&config.source)
        .with_context(|| format!("loading incidents from {}", config.source))?;
    info!(
        rows = table.len(),
        regions = table.regions().len(),
        "incidents loaded"
    );

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window_width, config.window_height])
            .with_min_inner_size([1000.0, 700.0])
            .with_title("GTD Dashboard"),
        ..Default::default()
    };

    let table = Arc::new(table);

    // Run the application
    eframe::run_native(
        "GTD Dashboard",
        options,
        Box::new(move |cc| Ok(Box::new(DashboardApp::new(cc, table, config)))),
    )
    .map_err(|e| anyhow!("dashboard window failed: {}", e))
}
