pub mod api;
pub mod config;
pub mod logic;
pub mod model;
pub mod store;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;

pub use api::{create_router, AppState, GzipPool, RequestContext};
pub use config::AppConfig;
pub use logic::Validator;
pub use model::*;
pub use store::{MemoryStore, PostgresStore, TodoStore};

/// Router with state and transport-level layers applied.
pub fn build_app<S: TodoStore + 'static>(state: AppState<S>, config: &AppConfig) -> Router {
    create_router()
        .layer(ServiceBuilder::new().layer(TimeoutLayer::new(config.request_timeout())))
        .with_state(state)
}

/// Connect to PostgreSQL, migrate, and serve until a shutdown signal.
pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    let store = PostgresStore::new(&config.database_url(), config.max_connections()).await?;
    log::info!("Connected to PostgreSQL");

    store.migrate().await?;
    log::info!("Database migrations applied");

    let mut state = AppState::new(Arc::new(store), Validator);
    if config.http.compress_responses {
        state = state.with_compression(GzipPool::default());
    }
    let app = build_app(state, &config);

    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    log::info!("The service is ready to listen and serve on http://{}", bind_address);

    serve(listener, app, config.shutdown_grace()).await
}

/// Serve `app` until ctrl-c or SIGTERM, then give in-flight requests up to
/// `grace` to finish before returning.
pub async fn serve(listener: TcpListener, app: Router, grace: Duration) -> anyhow::Result<()> {
    serve_with_shutdown(listener, app, grace, shutdown_signal()).await
}

/// Like [`serve`], with shutdown triggered by `signal` completing.
pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    app: Router,
    grace: Duration,
    signal: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send,
{
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    tokio::select! {
        joined = &mut server => {
            joined.context("Server task panicked")?.context("Server error")?;
            return Ok(());
        }
        _ = signal => {}
    }

    log::info!("Shutting down, waiting up to {:?} for in-flight requests", grace);
    let _ = shutdown_tx.send(());

    match tokio::time::timeout(grace, &mut server).await {
        Ok(joined) => joined.context("Server task panicked")?.context("Server error")?,
        Err(_) => {
            log::warn!("Grace period elapsed with requests still in flight");
            server.abort();
        }
    }

    log::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
