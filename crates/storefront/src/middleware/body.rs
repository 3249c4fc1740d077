//! JSON request bodies.
//!
//! Bodies are decoded as JSON whatever the `Content-Type` says. The body must
//! be a JSON object; anything else, or any decode failure, becomes a 400
//! `AppError::Validation` before the handler runs.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::AppError;

/// Extractor that decodes the request body as JSON.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(request, state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;

        let value: Value =
            serde_json::from_slice(&bytes).map_err(|e| AppError::Validation(e.to_string()))?;
        if !value.is_object() {
            return Err(AppError::Validation("expected a JSON object".to_string()));
        }

        serde_json::from_value(value)
            .map(Self)
            .map_err(|e| AppError::Validation(e.to_string()))
    }
}
