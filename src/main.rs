//! allowed-hosts: serve a host-guarded application.
//!
//! ```text
//! allowed-hosts --config allowed-hosts.toml
//! allowed-hosts --allow 127.0.0.1:5000 --allow localhost:5000 --bind 0.0.0.0:5000
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use allowed_hosts::config::{load_config, validate_config, AppConfig, ConfigError};
use allowed_hosts::lifecycle::signals::trigger_on_signal;
use allowed_hosts::observability::{logging, metrics};
use allowed_hosts::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "allowed-hosts")]
#[command(about = "Serve an application behind a host allowlist", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Replace guard.allowed_hosts (repeatable).
    #[arg(short, long = "allow")]
    allow: Vec<String>,
}

impl Cli {
    fn into_config(self) -> Result<AppConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => AppConfig::default(),
        };

        if let Some(bind) = self.bind {
            config.listener.bind_address = bind;
        }
        if !self.allow.is_empty() {
            config.guard.allowed_hosts = self.allow;
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;

    logging::init_tracing(&config.observability)?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        allowed_hosts = ?config.guard.allowed_hosts,
        host_sources = ?config.guard.host_sources,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(trigger_on_signal(shutdown));

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
