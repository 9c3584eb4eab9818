mod backend_bridge;
mod controller;
mod startup;
mod ui;

use anyhow::Context;
use clap::Parser;
use client_core::{DispatcherSet, ExchangeState};
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use crate::{
    backend_bridge::commands::BackendCommand,
    controller::events::UiEvent,
    startup::{config_search_paths, resolve_settings, StartupArgs},
    ui::ExchangeApp,
};

const WINDOW_TITLE: &str = "Encrypted Message Exchange";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = StartupArgs::parse();
    let settings = resolve_settings(&args, &config_search_paths())?;
    let dispatchers =
        DispatcherSet::from_settings(&settings).context("failed to prepare dispatchers")?;
    tracing::info!(
        base_url = %settings.base_url,
        timeout_secs = settings.request_timeout().as_secs(),
        "starting exchange desktop"
    );

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    backend_bridge::runtime::launch(dispatchers, cmd_rx, ui_tx);

    let state = ExchangeState::new(&settings);
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size([960.0, 640.0])
            .with_min_inner_size([640.0, 420.0]),
        ..Default::default()
    };
    eframe::run_native(
        WINDOW_TITLE,
        options,
        Box::new(move |_cc| Ok(Box::new(ExchangeApp::new(cmd_tx, ui_rx, state)))),
    )
    .map_err(|err| anyhow::anyhow!("desktop window failed: {err}"))
}
