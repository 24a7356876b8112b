//! HTTP liveness / readiness probes served next to each gRPC server.

use anyhow::Context as _;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use sea_orm::DatabaseConnection;

use crate::middleware::{propagate_request_id_layer, request_id_layer};

/// Handler for `GET /healthz`: liveness check.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Handler for `GET /readyz`: ready once the database answers a ping.
pub async fn readyz(State(db): State<DatabaseConnection>) -> StatusCode {
    match db.ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

pub fn probe_router(db: DatabaseConnection) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .layer(propagate_request_id_layer())
        .layer(request_id_layer())
        .with_state(db)
}

pub async fn serve_probes(port: u16, db: DatabaseConnection) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind probe listener on {addr}"))?;
    tracing::info!("health probes listening on {addr}");
    axum::serve(listener, probe_router(db))
        .await
        .context("probe server")
}
