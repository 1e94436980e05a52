//! Multi-site HTTP host.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server (one listener per site port)
//!                         │  request ID, trace, timeout, body limit,
//!                         │  concurrency limit, caller identity
//!                         ▼
//!                     dispatch::Host ── first site by priority
//!                         │
//!                         ▼
//!                     dispatch::WebSite ── controller by name prefix
//!                         │                    └─ else static file
//!                         ▼
//!                     ActionController
//!                         authorize → bind → invoke → render
//!                         │
//!     Client Response     ▼
//!     ◀────────────── http::response (Outcome → status + body)
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use site_host::config::{load_config, HostConfig};
use site_host::controllers;
use site_host::dispatch::Host;
use site_host::http::HttpServer;
use site_host::lifecycle::{build_host, signals, Shutdown};
use site_host::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "site-host")]
#[command(about = "Serve several sites with convention-based controllers", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config/host.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration and print the site table
    Check,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    logging::init_logging(&config.observability);

    tracing::info!(
        config = %cli.config.display(),
        sites = config.sites.len(),
        bind_host = %config.listener.bind_host,
        max_connections = config.listener.max_connections,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let catalog = controllers::catalog()?;
    let host = build_host(&config, &catalog)?;

    if let Some(Commands::Check) = cli.command {
        print_sites(&host, &config);
        return Ok(());
    }

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let server = HttpServer::new(host, config);
    let listeners = server.bind().await?;

    let shutdown = Shutdown::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        let signal = signals::wait_for_signal().await;
        tracing::info!(signal = signal, "Shutdown signal received");
        trigger.trigger();
    });

    server.run(listeners, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn print_sites(host: &Host, config: &HostConfig) {
    println!("{:<24} {:>6} {:<8} {:<8} CONTROLLERS", "SITE", "PORT", "PRIORITY", "DEFAULT");
    for site in host.sites() {
        let controllers = config
            .sites
            .iter()
            .find(|s| s.name == site.name() && s.port == site.port())
            .map(|s| s.controllers.join(", "))
            .unwrap_or_default();
        println!(
            "{:<24} {:>6} {:<8} {:<8} {}",
            site.name(),
            site.port(),
            site.priority().to_string(),
            site.is_default(),
            controllers
        );
    }
}
