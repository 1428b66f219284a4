//! Local HTTP status API.
//!
//! Routes:
//! - `GET /health`
//! - `GET /specs`
//! - `GET /metrics`
//! - `GET /xmrig/status`
//! - `GET /xmrig/logs?n=<count>`

mod handlers;
mod types;

pub use handlers::log_count;
pub use types::{ApiError, ErrorBody, LogsResponse, StatusResponse};

use std::net::SocketAddr;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;

use crate::app::Service;
use crate::core::shutdown::ShutdownToken;
use crate::error::Result;

pub fn router(service: Service) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        .route("/specs", get(handlers::get_specs))
        .route("/metrics", get(handlers::get_metrics))
        .route("/xmrig/status", get(handlers::get_xmrig_status))
        .route("/xmrig/logs", get(handlers::get_xmrig_logs))
        .with_state(service)
}

/// Bind `addr` and serve until `shutdown` fires.
pub async fn run(addr: SocketAddr, service: Service, shutdown: ShutdownToken) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    serve(listener, service, shutdown).await
}

/// Serve on an already bound listener until `shutdown` fires.
pub async fn serve(listener: TcpListener, service: Service, shutdown: ShutdownToken) -> Result<()> {
    if let Ok(addr) = listener.local_addr() {
        log::info!("http api: listening on {}", addr);
    }

    axum::serve(listener, router(service))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    log::info!("http api: stopped");
    Ok(())
}
