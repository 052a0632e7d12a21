use std::{collections::BTreeMap, fmt::Write as _, path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    config::load_settings, DisplayField, ImageSource, LookupController, LookupPhase,
    ProductClient, RenderedView,
};
use serde::Serialize;
use shared::protocol::ServiceHealth;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "lookup", about = "Look up products in the product service")]
struct Cli {
    /// Base URL of the product service; overrides config file and environment.
    #[arg(long, global = true)]
    server_url: Option<String>,
    /// Path to a lookup.toml config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch one product and print it.
    Get {
        product_id: String,
        /// Print the rendered view as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Ask the service whether it is up.
    Health,
}

#[derive(Serialize)]
struct JsonImage<'a> {
    src: Option<&'a str>,
    placeholder: bool,
    alt: &'a str,
}

#[derive(Serialize)]
struct JsonView<'a> {
    state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    fields: BTreeMap<&'static str, &'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<JsonImage<'a>>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let settings = load_settings(cli.config.as_deref())
        .context("failed to load lookup settings")?
        .with_server_url(cli.server_url);
    let client = ProductClient::new(&settings.server_url)
        .with_context(|| format!("invalid server url '{}'", settings.server_url))?;
    tracing::debug!(server_url = %settings.server_url, "using product service");

    match cli.command {
        Command::Get { product_id, json } => {
            let mut controller = LookupController::new(&settings);
            controller
                .lookup(&client, &product_id)
                .await
                .context("product id must not be empty")?;
            let view = controller.render();
            if json {
                println!("{}", serde_json::to_string_pretty(&json_view(controller.phase(), &view))?);
            } else {
                print!("{}", paint_text(&view));
            }
            if controller.phase() == LookupPhase::Error {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Health => {
            let health = client
                .health()
                .await
                .with_context(|| format!("health check against {} failed", client.server_url()))?;
            print!("{}", paint_health(&health));
            if !health.is_healthy() {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn phase_name(phase: LookupPhase) -> &'static str {
    match phase {
        LookupPhase::Idle => "idle",
        LookupPhase::Loading => "loading",
        LookupPhase::Success => "success",
        LookupPhase::Error => "error",
    }
}

fn json_view(phase: LookupPhase, view: &RenderedView) -> JsonView<'_> {
    let fields = view
        .product_fields
        .iter()
        .flatten()
        .map(|(field, text)| (field.id(), text.as_str()))
        .collect();
    let image = view.image.as_ref().map(|panel| JsonImage {
        src: match &panel.source {
            ImageSource::Remote(url) => Some(url.as_str()),
            ImageSource::Placeholder => None,
        },
        placeholder: panel.source == ImageSource::Placeholder,
        alt: &panel.alt,
    });
    JsonView {
        state: phase_name(phase),
        error: view.error_banner.as_deref(),
        fields,
        image,
    }
}

fn paint_text(view: &RenderedView) -> String {
    let width = DisplayField::ALL
        .iter()
        .map(|field| field.label().len())
        .max()
        .unwrap_or_default();
    let mut out = String::new();
    if let Some(message) = &view.error_banner {
        let _ = writeln!(out, "error: {message}");
    }
    if view.loading_visible {
        let _ = writeln!(out, "loading...");
    }
    if view.product_fields.is_some() {
        for field in DisplayField::ALL {
            if let Some(text) = view.field(field) {
                let _ = writeln!(out, "{:<width$}  {text}", field.label());
            }
        }
    }
    if let Some(panel) = &view.image {
        let src = match &panel.source {
            ImageSource::Remote(url) => url.as_str(),
            ImageSource::Placeholder => "(placeholder)",
        };
        let _ = writeln!(out, "{:<width$}  {src}", "Image");
    }
    out
}

fn paint_health(health: &ServiceHealth) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "status:     {}", health.status);
    if let Some(message) = &health.message {
        let _ = writeln!(out, "message:    {message}");
    }
    if let Some(table) = &health.config.table_name {
        let _ = writeln!(out, "table_name: {table}");
    }
    if let Some(bucket) = &health.config.s3_bucket {
        let _ = writeln!(out, "s3_bucket:  {bucket}");
    }
    out
}
