//! # chirp
//!
//! Entry point: loads settings, initialises tracing, wires the store into
//! the core and serves the HTTP API until Ctrl-C.

use std::sync::Arc;

use anyhow::Context;
use api_adapters::http::{router, AppState, RouterOptions};
use configs::{LogFormat, LogSettings, Settings};
use services::{CoreOptions, SocialCore, SuggestionPolicy};
use storage_adapters::{MemoryStore, Snapshot};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading configuration")?;
    init_tracing(&settings.log);

    let store = match &settings.store.snapshot_path {
        Some(path) => match Snapshot::load(path).await? {
            Some(snapshot) => {
                let store = MemoryStore::restore(snapshot)
                    .with_context(|| format!("restoring snapshot {}", path.display()))?;
                info!(path = %path.display(), "store restored from snapshot");
                store
            }
            None => {
                info!(path = %path.display(), "no snapshot yet, starting empty");
                MemoryStore::new()
            }
        },
        None => MemoryStore::new(),
    };

    let shared = Arc::new(store.clone());
    let core = SocialCore::new(shared.clone(), shared.clone(), shared, core_options(&settings));
    let app = router(
        Arc::new(AppState::new(core)),
        RouterOptions {
            admin_routes: settings.server.admin_routes,
        },
    );

    let addr = settings.server.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, admin_routes = settings.server.admin_routes, "chirp listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    if let Some(path) = &settings.store.snapshot_path {
        store
            .snapshot()
            .save(path)
            .await
            .with_context(|| format!("writing snapshot {}", path.display()))?;
        info!(path = %path.display(), "snapshot written");
    }
    Ok(())
}

fn init_tracing(log: &LogSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match log.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

fn core_options(settings: &Settings) -> CoreOptions {
    CoreOptions {
        suggestions: SuggestionPolicy {
            pool_size: settings.suggestions.pool_size,
            default_count: settings.suggestions.count,
            max_count: settings.suggestions.max_count,
        },
        cascade_unlike_on_delete: settings.posts.cascade_unlike_on_delete,
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for ctrl-c");
    }
    info!("shutting down");
}
