//! Mapzip CLI Application
//!
//! Command-line client for creating, selecting and reviewing Mapzip trip
//! schedules.

mod args;
mod cli;
mod renderer;

use anyhow::{Context, Result};
use args::{Args, Commands};
use clap::Parser;
use cli::Cli;
use log::info;
use mapzip_core::{ClientConfig, TripPlannerBuilder};
use renderer::TerminalRenderer;
use Commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        api_url,
        store_file,
        no_color,
        command,
    } = Args::parse();

    let mut config = ClientConfig::from_env().context("Failed to read configuration")?;
    if let Some(url) = api_url {
        config = config.with_api_base_url(url);
    }
    if let Some(path) = store_file {
        config = config.with_store_path(path);
    }

    let planner = TripPlannerBuilder::from_config(config)
        .build()
        .await
        .context("Failed to initialize planner")?;

    let renderer = TerminalRenderer::new(!no_color);

    info!("Mapzip started");

    let cli = Cli::new(planner, renderer);
    match command {
        Some(Schedule { command }) => cli.handle_schedule_command(command).await,
        Some(Review { command }) => cli.handle_review_command(command).await,
        Some(Cache { command }) => cli.handle_cache_command(command).await,
        None => cli.list_schedules().await,
    }
}
