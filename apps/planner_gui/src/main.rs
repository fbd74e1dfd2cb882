use std::{path::PathBuf, sync::Arc};

mod backend_bridge;
mod config;
mod controller;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{ItineraryService, PlannerClient};
use crossbeam_channel::bounded;
use eframe::egui;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::backend_bridge::{commands::BackendCommand, runtime};
use crate::config::{load_settings, Overrides, DEFAULT_CONFIG_PATH};
use crate::controller::{events::UiEvent, orchestration::SessionController};
use crate::ui::PlannerApp;

#[derive(Parser, Debug)]
#[command(about = "Desktop client for the travel itinerary service")]
struct Args {
    /// Base URL of the itinerary service, e.g. http://127.0.0.1:5000/api
    #[arg(long)]
    base_url: Option<String>,
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Directory exported documents are saved to.
    #[arg(long)]
    export_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let settings = load_settings(&args.config)?.with_overrides(Overrides {
        base_url: args.base_url,
        export_dir: args.export_dir,
    });
    let export_dir = settings.resolve_export_dir();

    let client = PlannerClient::new(&settings.base_url, settings.request_timeout())
        .with_context(|| format!("invalid itinerary service url '{}'", settings.base_url))?;
    let service: Arc<dyn ItineraryService> = Arc::new(client);
    info!(
        base_url = service.base_url(),
        export_dir = %export_dir.display(),
        timeout_secs = settings.request_timeout_secs,
        "starting itinerary planner"
    );

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(16);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(256);
    let _worker = runtime::launch(service, export_dir, cmd_rx, ui_tx);

    let controller = SessionController::new(cmd_tx, settings.error_display());
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Travel Itinerary Planner")
            .with_inner_size([900.0, 760.0])
            .with_min_inner_size([560.0, 480.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Travel Itinerary Planner",
        options,
        Box::new(|_cc| Ok(Box::new(PlannerApp::new(controller, ui_rx)))),
    )
    .map_err(|err| anyhow::anyhow!("failed to run planner window: {err}"))
}

#[cfg(test)]
#[path = "tests/scenario_tests.rs"]
mod scenario_tests;
