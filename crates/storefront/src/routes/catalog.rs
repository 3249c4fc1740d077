//! Catalog route handlers.

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use smokeshop_core::{CatalogItem, Filter, Price, QuerySpec, Update};
use tracing::{info, instrument};

use crate::db::DocumentCollection;
use crate::error::{AppError, Result};
use crate::middleware::JsonBody;
use crate::services::query_executor;
use crate::state::AppState;

/// Query parameters for a single-item lookup.
#[derive(Debug, Deserialize)]
pub struct BrandQuery {
    #[serde(default)]
    pub brand: String,
}

/// Body of a price update.
#[derive(Debug, Deserialize)]
pub struct UpdatePriceRequest {
    pub brand: String,
    pub price: Price,
}

/// List catalog items with optional filter, sort and pagination.
///
/// Query parameters: `brand`, `sortField`, `sortOrder`, `limit`, `page`.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<CatalogItem>>> {
    let spec = QuerySpec::parse(&params);
    let items = query_executor::execute(&spec, state.assortment()).await?;
    Ok(Json(items))
}

/// Fetch one catalog item by exact brand.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Query(query): Query<BrandQuery>,
) -> Result<Json<CatalogItem>> {
    query_executor::find_by_brand(state.assortment(), &query.brand)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Cigarette not found".to_string()))
}

/// Set the price of the first catalog item with the given brand.
#[instrument(skip(state, request), fields(brand = %request.brand, price = %request.price))]
pub async fn update_price(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<UpdatePriceRequest>,
) -> Result<&'static str> {
    let outcome = state
        .assortment()
        .update_one(
            &Filter::BrandEquals(request.brand),
            &Update::SetPrice(request.price),
        )
        .await?;

    info!(
        matched = outcome.matched,
        modified = outcome.modified,
        "Price update applied"
    );
    Ok("Price updated successfully")
}
