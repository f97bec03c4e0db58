//! sysmodeld: the system model daemon.
//!
//! Opens the configured storage backend, builds the managers and serves the
//! REST API until Ctrl-C.
//!
//! # Usage
//!
//! ```text
//! sysmodeld serve --config /etc/sysmodel/sysmodeld.toml
//! sysmodeld --console-logging serve --backend redb --data-dir /var/lib/sysmodel --port 8080
//! ```

mod config;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use sysmodel_entities::UuidGenerator;
use sysmodel_manager::Managers;
use sysmodel_provider::{Providers, RedbStore};

use crate::config::{Backend, DaemonConfig};

#[derive(Parser)]
#[command(name = "sysmodeld", about = "System model daemon")]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, global = true)]
    debug: bool,

    /// Human-readable log lines instead of JSON.
    #[arg(long, global = true)]
    console_logging: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the REST API.
    Serve {
        /// Path to a sysmodeld.toml file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Port to listen on.
        #[arg(long)]
        port: Option<u16>,

        /// Storage backend.
        #[arg(long, value_enum)]
        backend: Option<Backend>,

        /// Directory for the redb file.
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            config,
            port,
            backend,
            data_dir,
        } => {
            let mut config = DaemonConfig::load(config.as_deref())
                .context("loading configuration")?;
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(backend) = backend {
                config.storage.backend = backend;
            }
            if let Some(dir) = data_dir {
                config.storage.path = dir;
            }
            if cli.debug {
                config.logging.level = "debug".to_string();
            }
            if cli.console_logging {
                config.logging.json = false;
            }
            init_tracing(&config);
            serve(config).await
        }
    }
}

fn init_tracing(config: &DaemonConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn open_providers(config: &DaemonConfig) -> anyhow::Result<Providers> {
    match config.storage.backend {
        Backend::Memory => {
            info!("using in-memory storage");
            Ok(Providers::in_memory())
        }
        Backend::Redb => {
            std::fs::create_dir_all(&config.storage.path).with_context(|| {
                format!("creating data dir {}", config.storage.path.display())
            })?;
            let path = config.db_path();
            let store = RedbStore::open(&path)?;
            info!(path = ?path, "redb store opened");
            Ok(Providers::redb(store))
        }
    }
}

async fn serve(config: DaemonConfig) -> anyhow::Result<()> {
    info!(backend = ?config.storage.backend, "sysmodeld starting");

    let providers = open_providers(&config)?;
    let managers = Managers::new(&providers, Arc::new(UuidGenerator));
    let router = sysmodel_api::build_router(managers);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| format!("invalid listen address {}", config.server.host))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "failed to listen for Ctrl-C");
                return;
            }
            info!("shutdown signal received");
        })
        .await?;

    info!("sysmodeld stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_flags_parse() {
        let cli = Cli::try_parse_from([
            "sysmodeld",
            "--console-logging",
            "serve",
            "--backend",
            "redb",
            "--port",
            "9000",
            "--debug",
        ])
        .unwrap();
        assert!(cli.console_logging);
        assert!(cli.debug);
        let Command::Serve { backend, port, .. } = cli.command;
        assert_eq!(backend, Some(Backend::Redb));
        assert_eq!(port, Some(9000));
    }

    #[test]
    fn redb_backend_opens_under_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = DaemonConfig::default();
        config.storage.backend = Backend::Redb;
        config.storage.path = dir.path().join("nested");
        open_providers(&config).unwrap();
        assert!(config.db_path().exists());
    }
}
