use std::path::PathBuf;

mod backend_bridge;
mod controller;
mod media;
mod ui;

use anyhow::{anyhow, Context};
use clap::Parser;
use client_core::{config::load_settings, LookupController, ProductClient};
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use backend_bridge::commands::BackendCommand;
use controller::events::UiEvent;
use ui::LookupApp;

#[derive(Parser, Debug)]
#[command(name = "desktop_gui", about = "Product lookup window")]
struct Args {
    /// Base URL of the product service; overrides config file and environment.
    #[arg(long)]
    server_url: Option<String>,
    /// Path to a lookup.toml config file.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let settings = load_settings(args.config.as_deref())
        .context("failed to load lookup settings")?
        .with_server_url(args.server_url);
    let client = ProductClient::new(&settings.server_url)
        .with_context(|| format!("invalid server url '{}'", settings.server_url))?;
    tracing::info!(
        server_url = %settings.server_url,
        ordering = %settings.response_ordering,
        "starting product lookup window"
    );

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(256);
    backend_bridge::runtime::launch(cmd_rx, ui_tx, client);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Product Lookup")
            .with_inner_size([760.0, 520.0])
            .with_min_inner_size([480.0, 360.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Product Lookup",
        options,
        Box::new(move |_cc| {
            Ok(Box::new(LookupApp::new(
                cmd_tx,
                ui_rx,
                LookupController::new(&settings),
            )))
        }),
    )
    .map_err(|err| anyhow!("product lookup window failed: {err}"))
}
