mod api;
mod history;
mod middleware;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use footprint_adapters::{AdapterSet, CredentialRegistry};
use footprint_engine::AggregationOptions;

use crate::api::{build_app, default_rate_limit_state, AppState};
use crate::history::InMemoryHistory;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = footprint_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let registry = Arc::new(CredentialRegistry::from_config(&config));
    let configured = registry.configured_platforms();
    tracing::info!(
        configured = ?configured.iter().map(ToString::to_string).collect::<Vec<_>>(),
        "credential registry initialized"
    );

    let adapters = AdapterSet::from_config(&config)?;
    let state = AppState {
        adapters,
        registry,
        options: AggregationOptions::from_config(&config),
        history: Arc::new(InMemoryHistory::new()),
    };
    let app = build_app(state, default_rate_limit_state());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "footprint server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
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
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
