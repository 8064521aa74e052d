//! Application entry point for the Flow Snake viewer.
//!
//! This binary sets up logging, loads the simulation configuration and
//! delegates all interactive logic and rendering to [`Viewer`] from the
//! `viewer` module.

mod viewer;

use anyhow::{Context, Result, anyhow};
use snake_core::Config;
use std::{fs, path::Path};
use tracing::info;
use viewer::Viewer;

/// Starts the native eframe application.
///
/// An optional first argument names a JSON config file; fields missing
/// from it keep their defaults.
///
/// ### Returns
/// - `Ok(())` if the application runs to completion without errors.
/// - `Err` if the config is unreadable or invalid, or eframe fails to
///   create the native window or event loop.
fn main() -> Result<()> {
    init_tracing();

    let cfg = match std::env::args_os().nth(1) {
        Some(path) => load_config(Path::new(&path))?,
        None => Config::default(),
    };
    info!(
        nodes = cfg.node_count,
        seed = cfg.seed,
        "starting Flow Snake"
    );

    let viewer = Viewer::new(cfg).context("invalid simulation config")?;
    let options = eframe::NativeOptions::default();

    eframe::run_native(
        "Flow Snake",
        options,
        Box::new(|_cc| Ok(Box::new(viewer))),
    )
    .map_err(|err| anyhow!("eframe failed: {err}"))
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn load_config(path: &Path) -> Result<Config> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}
