//! Health check handlers.

use axum::{extract::State, http::StatusCode};

use crate::db::DocumentCollection;
use crate::state::AppState;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Pings both collections. Returns 503 Service Unavailable if either is
/// unreachable.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    let (assortment, cart) = tokio::join!(state.assortment().ping(), state.cart().ping());
    match assortment.and(cart) {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
