// Declare modules before use
mod app;
mod compose;
mod config;
mod directory;
mod form;
mod i18n;
mod identity;
mod instructions;
mod mailbox;
mod session;
mod submission;

use anyhow::{anyhow, Context};
use app::AutoReplyApp;
use config::AppConfig;
use eframe::egui;
use log::{debug, info};

fn main() -> anyhow::Result<()> {
    // --- Load .env file at the very beginning, RUST_LOG may live there ---
    let dotenv = dotenvy::dotenv();

    env_logger::init();

    match dotenv {
        Ok(path) => info!("Loaded .env file from: {:?}", path),
        Err(_) => debug!("No .env file; relying on config file and existing environment variables"),
    }

    // Both yup-oauth2 and the Graph client build rustls configs
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider was already installed");
    }

    let config = AppConfig::load().context("failed to load configuration")?;
    let title = config.language.labels().window_title;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([760.0, 820.0])
            .with_min_inner_size([560.0, 600.0]),
        ..Default::default() // Use eframe defaults
    };

    info!("Starting auto-reply composer...");

    eframe::run_native(
        title,
        options,
        Box::new(move |cc| Ok(Box::new(AutoReplyApp::new(cc, config)?))),
    )
    .map_err(|e| anyhow!("window failed: {}", e))
}
