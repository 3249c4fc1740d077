//! Admission control for throttled routes.
//!
//! The client key is the peer address reported by the connection
//! (`ConnectInfo<SocketAddr>`), rendered as `host:port`. Proxy headers are not
//! consulted. Requests without connect info share the anonymous key.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, FromRequestParts, Request, State},
    http::{Extensions, request::Parts},
    middleware::Next,
    response::Response,
};
use chrono::{SecondsFormat, Utc};
use smokeshop_core::ClientKey;

use crate::error::AppError;
use crate::services::RateLimiterRegistry;

/// Derive the client key from request extensions.
#[must_use]
pub fn client_key(extensions: &Extensions) -> ClientKey {
    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(ClientKey::anonymous, |ConnectInfo(addr)| {
            ClientKey::new(addr.to_string())
        })
}

/// Extractor for the caller's [`ClientKey`].
#[derive(Clone, Debug)]
pub struct RemoteClient(pub ClientKey);

impl<S> FromRequestParts<S> for RemoteClient
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(client_key(&parts.extensions)))
    }
}

/// Middleware that admits a request only if its client has a token left.
///
/// Install with `axum::middleware::from_fn_with_state(registry, admission_middleware)`.
/// Rejected requests get 429 and never reach the handler.
///
/// # Errors
///
/// Returns `AppError::RateLimited` when the client's bucket is empty.
pub async fn admission_middleware(
    State(registry): State<Arc<RateLimiterRegistry>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = client_key(request.extensions());

    if !registry.try_acquire(&key) {
        tracing::warn!(
            client_key = %key,
            timestamp = %Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            path = %request.uri().path(),
            "Rate limit exceeded"
        );
        return Err(AppError::RateLimited);
    }

    Ok(next.run(request).await)
}
