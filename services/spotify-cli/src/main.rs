//! Spotify CLI
//!
//! Small command-line front end for the Spotify client crates:
//! 1. Loads configuration (TOML plus env secrets)
//! 2. Runs the authorization-code flow, or
//! 3. Resumes from a refresh token and runs one read command

mod callback;
mod commands;
mod config;

use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use transport::ReqwestTransport;

use crate::commands::{Cli, Command};
use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // JSON logs on stderr; stdout carries command output
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr),
        )
        .init();

    let args = Cli::parse();

    let prometheus = if args.metrics {
        Some(
            PrometheusBuilder::new()
                .install_recorder()
                .context("failed to install Prometheus recorder")?,
        )
    } else {
        None
    };

    let config_path = Config::resolve_path(args.config.as_deref());
    info!(path = %config_path.display(), "loading configuration");
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    let transport = Arc::new(
        ReqwestTransport::with_timeout(Duration::from_secs(config.http.timeout_secs))
            .context("failed to build HTTP client")?,
    );

    let output = match &args.command {
        Command::Authorize => {
            commands::authorize(&config, transport, |url, addr| {
                info!(%addr, "callback listener ready");
                println!("Open this URL in a browser to authorize:\n\n{url}\n");
            })
            .await?
        }
        command => {
            let spotify = commands::connect(&config, transport).await?;
            commands::run(&spotify, command, &config).await?
        }
    };
    println!("{output}");

    if let Some(handle) = prometheus {
        eprintln!("{}", handle.render());
    }
    Ok(())
}
