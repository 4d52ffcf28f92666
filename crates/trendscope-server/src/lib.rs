//! HTTP API over stored trend records and the collectors that feed them.

pub mod api;
pub mod middleware;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use sqlx::SqlitePool;
use tokio::net::TcpListener;
use trendscope_core::AppConfig;

pub use api::{build_app, AppState, Endpoint, ENDPOINTS};

/// Binds `config.bind_addr` and serves the API until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve<F>(config: Arc<AppConfig>, pool: SqlitePool, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!(env = %config.env, "starting trendscope api");
    let app = build_app(AppState::new(pool, config));
    serve_on(listener, app, shutdown).await
}

/// Serves `app` on an already-bound listener until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the listener has no local address or the server fails.
pub async fn serve_on<F>(listener: TcpListener, app: Router, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let local_addr: SocketAddr = listener.local_addr()?;
    tracing::info!(addr = %local_addr, "trendscope api listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
pub async fn shutdown_signal() {
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
