//! Cart route handlers.
//!
//! There is one cart for the whole store. Lines are stored as given and
//! removed by exact brand.

use axum::{
    Json,
    extract::State,
    http::{Method, Uri},
};
use serde::Deserialize;
use smokeshop_core::{CartLine, Filter};
use tracing::{info, instrument};

use crate::db::{DocumentCollection, StoreError};
use crate::error::{Result, add_breadcrumb};
use crate::middleware::{JsonBody, RemoteClient};
use crate::services::query_executor;
use crate::state::AppState;

/// Body of a remove request. Fields other than `brand` are ignored.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartRequest {
    #[serde(default)]
    pub brand: String,
}

/// Add a line to the cart. Behind admission control.
#[instrument(skip(state, line, method, uri))]
pub async fn add(
    State(state): State<AppState>,
    RemoteClient(client): RemoteClient,
    method: Method,
    uri: Uri,
    JsonBody(line): JsonBody<CartLine>,
) -> Result<&'static str> {
    info!(method = %method, path = %uri.path(), client = %client, "Request received");

    let document = serde_json::to_value(&line).map_err(StoreError::from)?;
    state.cart().insert_one(document).await?;

    let brand = line.brand.as_deref().unwrap_or_default();
    add_breadcrumb("cart", "Added line", Some(&[("brand", brand)]));
    info!(brand, "Cigarette added to cart");
    Ok("Cigarette added to cart")
}

/// List every cart line in insertion order.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Result<Json<Vec<CartLine>>> {
    let lines = query_executor::list_all(state.cart()).await?;
    Ok(Json(lines))
}

/// Remove the first cart line with the given brand.
#[instrument(skip(state, request), fields(brand = %request.brand))]
pub async fn remove(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RemoveFromCartRequest>,
) -> Result<&'static str> {
    let deleted = state
        .cart()
        .delete_one(&Filter::BrandEquals(request.brand))
        .await?;
    info!(deleted, "Cart line removal applied");
    Ok("Cigarette removed from cart")
}

/// Remove every cart line.
#[instrument(skip(state))]
pub async fn clear(State(state): State<AppState>) -> Result<&'static str> {
    let deleted = state.cart().delete_many(&Filter::All).await?;
    info!(deleted, "Cart cleared");
    Ok("Cart cleared")
}
