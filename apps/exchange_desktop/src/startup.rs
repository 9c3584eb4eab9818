//! Command-line arguments and settings resolution for the desktop app.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use client_core::{config::CONFIG_FILE_NAME, load_settings, Settings};

const APP_DIR_NAME: &str = "secure_exchange";

#[derive(Parser, Debug, Default)]
#[command(name = "exchange-desktop", about = "Two-user encrypted message exchange")]
pub struct StartupArgs {
    /// Settings file to use instead of the search path.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Backend origin, e.g. http://127.0.0.1:5000
    #[arg(long)]
    pub base_url: Option<String>,
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

/// Where a settings file is looked for when `--config` is not given.
pub fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(CONFIG_FILE_NAME));
    }
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME));
    }
    paths
}

/// Defaults, then file, then environment, then command line.
pub fn resolve_settings(args: &StartupArgs, search_paths: &[PathBuf]) -> anyhow::Result<Settings> {
    let mut settings = load_settings(args.config.as_deref(), search_paths)
        .context("failed to load exchange settings")?;
    apply_args(&mut settings, args);

    settings
        .parsed_base_url()
        .with_context(|| format!("backend base URL '{}' is not usable", settings.base_url))?;
    Ok(settings)
}

fn apply_args(settings: &mut Settings, args: &StartupArgs) {
    if let Some(base_url) = &args.base_url {
        settings.base_url = base_url.clone();
    }
    if let Some(timeout_secs) = args.timeout_secs {
        settings.request_timeout_secs = timeout_secs;
    }
}

#[cfg(test)]
#[path = "tests/startup_tests.rs"]
mod tests;
