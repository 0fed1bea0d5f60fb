//! sbom-repo: CycloneDX BOM repository server
//!
//! Stores CycloneDX BOMs in a content-addressed filesystem layout and
//! serves them back with format and schema-version conversion.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use sbom_repo::config::AppConfig;
use sbom_repo::server::{self, AppState};
use sbom_repo::service::RepoService;
use sbom_repo::store::FileStore;
use tracing::info;

/// Build long version string with format support info
const fn build_long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        "\n\nSupported CycloneDX serializations:",
        "\n  XML:      1.0, 1.1, 1.2, 1.3, 1.4",
        "\n  JSON:     1.2, 1.3, 1.4",
        "\n  Protobuf: 1.3, 1.4",
        "\n\nEndpoints:",
        "\n  GET/POST/DELETE /bom, GET /health"
    )
}

#[derive(Parser)]
#[command(name = "sbom-repo")]
#[command(author = "Binarly.io")]
#[command(version, long_version = build_long_version())]
#[command(about = "CycloneDX BOM repository server", long_about = None)]
#[command(after_help = "CONFIGURATION:
    Settings come from a YAML file (--config), environment variables
    (REPO__DIRECTORY, LISTEN__PORT, ALLOWEDMETHODS__POST, ...), and the
    flags below, in increasing precedence.

EXAMPLES:
    # Read-only repository on the default port
    sbom-repo --directory /var/lib/sbom-repo

    # Accept uploads and deletes, prune to 10 versions per serial
    ALLOWEDMETHODS__POST=true ALLOWEDMETHODS__DELETE=true \\
    RETENTION__MAXVERSIONS=10 sbom-repo --directory /var/lib/sbom-repo
")]
struct Cli {
    /// Path to a YAML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Root directory for BOM storage (overrides REPO__DIRECTORY)
    #[arg(long, value_name = "DIR")]
    directory: Option<PathBuf>,

    /// Port to listen on (overrides LISTEN__PORT)
    #[arg(long, value_name = "PORT")]
    port: Option<u16>,

    /// Host address to bind (overrides LISTEN__HOST)
    #[arg(long, value_name = "HOST")]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(directory) = cli.directory {
        config.repo.directory = Some(directory);
    }
    if let Some(port) = cli.port {
        config.listen.port = port;
    }
    if let Some(host) = cli.host {
        config.listen.host = host;
    }
    config.validate().context("validating configuration")?;

    let directory = config.directory().context("resolving store directory")?;
    let addr = config.socket_addr().context("resolving listen address")?;

    info!(directory = %directory.display(), "opening BOM store");
    let store = FileStore::open(directory).await.context("opening store")?;

    let service = RepoService::new(store);
    service.start_retention(config.retention_config()).await;

    info!(
        get = config.allowed_methods.get,
        post = config.allowed_methods.post,
        delete = config.allowed_methods.delete,
        "method gates"
    );

    let state = AppState {
        service: service.clone(),
        allowed_methods: config.allowed_methods,
    };

    server::serve(addr, state, shutdown_signal())
        .await
        .context("serving")?;

    service.shutdown().await;
    info!("sbom-repo shut down cleanly");
    Ok(())
}

/// Resolve when the process receives SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("received SIGINT, shutting down");
        },
        _ = terminate => {
            info!("received SIGTERM, shutting down");
        },
    }
}
