#![forbid(unsafe_code)]

use anyhow::Context;
use clap::Parser;
use std::process::ExitCode;
use tb_server::config::{Cli, ServiceConfig};
use tb_server::{AppState, app, logging};
use tb_storage::SqliteStore;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match ServiceConfig::load(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("tb_server: {err}");
            return ExitCode::FAILURE;
        }
    };
    logging::init(config.log_level);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: ServiceConfig) -> anyhow::Result<()> {
    let store = SqliteStore::open(&config.db_path, config.profile)
        .with_context(|| format!("open database {}", config.db_path.display()))?;
    tracing::info!(
        db = %config.db_path.display(),
        profile = %config.profile,
        "connected to the test database"
    );

    if config.check_metadata {
        check_metadata(&store)?;
    }

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("bind {}", config.bind))?;
    tracing::info!("server running on http://{}", listener.local_addr()?);

    axum::serve(listener, app(AppState::new(store)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve")?;
    tracing::info!("server stopped");
    Ok(())
}

fn check_metadata(store: &SqliteStore) -> anyhow::Result<()> {
    if !store.profile().has_metadata_index() {
        tracing::warn!(
            profile = %store.profile(),
            "--check-metadata ignored: profile has no metadata index"
        );
        return Ok(());
    }

    let audit = store.audit_metadata().context("audit metadata")?;
    if audit.is_consistent() {
        tracing::info!("metadata index matches stored tests");
        return Ok(());
    }
    for entry in &audit.missing {
        tracing::warn!(kind = entry.kind.as_str(), value = %entry.value, "metadata entry missing");
    }
    for entry in &audit.stale {
        tracing::warn!(kind = entry.kind.as_str(), value = %entry.value, "metadata entry stale");
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
