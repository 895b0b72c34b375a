//! HTTP honeytrap.
//!
//! Serves decoy responses from a declarative trap table and records every
//! interaction as a JSON alert.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────────┐
//!                      │                      HONEYTRAP                        │
//!                      │                                                       │
//!   Client Request     │  ┌─────────┐   ┌───────────┐   ┌──────────────────┐   │
//!   ───────────────────┼─▶│   net   │──▶│   http    │──▶│ traps::resolve   │   │
//!                      │  │listener │   │ normalize │   │ note + response  │   │
//!                      │  └─────────┘   └───────────┘   └────────┬─────────┘   │
//!                      │                                         │             │
//!                      │                       ┌─────────────────┴──────┐      │
//!                      │                       ▼                        ▼      │
//!   Client Response    │               ┌──────────────┐        ┌─────────────┐ │
//!   ◀──────────────────┼───────────────│http response │        │ alert sink  │─┼──▶ alert log
//!                      │               │  renderer    │        │  + writer   │ │
//!                      │               └──────────────┘        └─────────────┘ │
//!                      │                                                       │
//!                      │  config · observability · lifecycle (startup/shutdown)│
//!                      └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use honeytrap::alert::{AlertSink, AlertWriter};
use honeytrap::config::validation::validate_settings;
use honeytrap::config::{load_settings, HoneytrapSettings, SettingsError};
use honeytrap::http::HttpServer;
use honeytrap::lifecycle::{load_traps, wait_for_signal, Shutdown};
use honeytrap::net;
use honeytrap::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "honeytrap")]
#[command(about = "HTTP honeytrap with configurable decoy responses", long_about = None)]
struct Cli {
    /// Runtime settings (TOML). Defaults apply when omitted.
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Trap configuration candidate; repeat to try several in order.
    #[arg(short, long)]
    config: Vec<String>,

    /// Derived topology document candidate; repeat to try several in order.
    #[arg(short, long)]
    derived: Vec<String>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Load and validate everything, print a summary, then exit.
    #[arg(long)]
    check: bool,
}

impl Cli {
    fn settings(&self) -> Result<HoneytrapSettings, Box<dyn std::error::Error>> {
        let mut settings = match &self.settings {
            Some(path) => load_settings(path)?,
            None => HoneytrapSettings::default(),
        };

        if !self.config.is_empty() {
            settings.traps.config_paths = self.config.clone();
        }
        if !self.derived.is_empty() {
            settings.traps.derived_paths = self.derived.clone();
        }
        if let Some(bind) = &self.bind {
            settings.listener.bind_address = bind.clone();
        }

        validate_settings(&settings)
            .map_err(SettingsError::Validation)?;
        Ok(settings)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = cli.settings()?;

    logging::init_logging(&settings.observability)?;
    tracing::info!("honeytrap v{} starting", env!("CARGO_PKG_VERSION"));

    let traps = load_traps(&settings)?;

    tracing::info!(
        bind_address = %settings.listener.bind_address,
        tls = settings.listener.tls.is_some(),
        traps = traps.traps.len(),
        tokens = traps.token_count(),
        "Configuration loaded"
    );

    if cli.check {
        println!(
            "configuration OK: {} traps, {} tokens, default {} ({})",
            traps.traps.len(),
            traps.token_count(),
            traps.default_response.body,
            traps.default_response.content_type,
        );
        return Ok(());
    }

    if settings.observability.metrics_enabled {
        metrics::init_metrics(settings.observability.metrics_address.parse()?)?;
    }

    let (sink, rx) = AlertSink::channel();
    let writer = AlertWriter::open(&settings.alerts, rx).await?;
    let writer = tokio::spawn(writer.run());

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let tls = match &settings.listener.tls {
        Some(tls) => Some(net::load_tls_config(tls).await?),
        None => None,
    };

    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.trigger();
    });

    let server = HttpServer::new(settings, traps, sink);
    match tls {
        Some(tls) => server.run_tls(tls, server_shutdown).await?,
        None => {
            let listener = net::bind(&server.settings().listener).await?;
            server.run(listener, server_shutdown).await?;
        }
    }

    // The server owned the last sink; the writer drains and exits.
    writer.await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
