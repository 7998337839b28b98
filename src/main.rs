//! Server entry point for cleanlink.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use cleanlink_core::{
    AppState, AuthGate, Database, LinkRegistry, OriginPolicy, OriginResolver, SqliteLinkStore,
    StreamingProxy, build_router,
};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{debug, info, warn};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");
    let config = args.into_config()?;
    info!(bind = %config.bind, origin_host = %config.origin_host, "cleanlink starting");

    let db = match &config.database_path {
        Some(path) => Database::new(path)
            .await
            .with_context(|| format!("opening database {}", path.display()))?,
        None => {
            warn!("no --database given; links are kept in memory and lost on exit");
            Database::new_in_memory().await?
        }
    };

    let registry = LinkRegistry::new(
        Arc::new(SqliteLinkStore::new(db.clone())),
        OriginPolicy::new(&config.origin_host),
    );
    let resolver = OriginResolver::new(&config.timeouts).context("building origin client")?;
    let proxy = StreamingProxy::new(&config.timeouts).context("building stream client")?;
    let auth = AuthGate::new(config.access_password.clone(), config.session_ttl);
    let state = AppState::new(registry, resolver, proxy, auth, config.public_base_url.clone());

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("binding {}", config.bind))?;
    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shutting down");
    db.close().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            warn!(%error, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                warn!(%error, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
