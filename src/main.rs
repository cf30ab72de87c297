mod app;
mod color;
mod config;
mod data;
mod export;
mod figure;
mod state;
mod ui;
mod units;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use eframe::egui;

use app::SedimentPlotApp;
use config::PlotConfig;
use state::ViewState;

/// Multi-panel sediment core viewer: age model, XRF titanium and
/// optional extra series on a shared depth axis.
#[derive(Parser, Debug)]
#[command(name = "sediment-plot")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the JSON plot configuration
    #[arg(long, default_value = "./sediment-plot.json")]
    config: PathBuf,

    /// Also write the figure to this SVG file
    #[arg(long)]
    export: Option<PathBuf>,

    /// Do not open the interactive window
    #[arg(long)]
    no_window: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = PlotConfig::load(&cli.config)?;
    let dataset = data::loader::load_core(&config).context("loading core data")?;
    let figure = figure::assemble(&config, &dataset);

    let export_path = cli
        .export
        .clone()
        .or_else(|| config.export_path().map(PathBuf::from));
    if let Some(path) = &export_path {
        export::write_svg(&figure, path)
            .with_context(|| format!("exporting figure to {}", path.display()))?;
    }

    if !config.display || cli.no_window {
        log::info!("Display disabled, exiting");
        return Ok(());
    }

    let (w, h) = figure.size_px();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(figure.title.clone())
            // Room for the menu bar on top of the figure itself.
            .with_inner_size([w as f32, h as f32 + 28.0])
            .with_min_inner_size([400.0, 200.0]),
        ..Default::default()
    };

    let title = figure.title.clone();
    let state = ViewState::new(figure, export_path);

    // Blocks until the window is closed.
    eframe::run_native(
        &title,
        options,
        Box::new(|_cc| Ok(Box::new(SedimentPlotApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("display failed: {e}"))
}
