//! Home page route handler.

use std::collections::HashMap;

use askama::Template;
use axum::{
    extract::{Query, State},
    response::Html,
};
use smokeshop_core::{CatalogItem, QuerySpec};
use tracing::{instrument, warn};

use crate::error::Result;
use crate::services::query_executor;
use crate::state::AppState;

/// Catalog item display data for templates.
#[derive(Clone)]
pub struct ItemView {
    pub brand: String,
    pub price: String,
    pub kind: String,
    pub category: String,
}

impl From<CatalogItem> for ItemView {
    fn from(item: CatalogItem) -> Self {
        Self {
            brand: item.brand.unwrap_or_default(),
            price: item.price.map(|p| p.to_string()).unwrap_or_default(),
            kind: item.kind.unwrap_or_default(),
            category: item.category.unwrap_or_default(),
        }
    }
}

/// Home page template.
#[derive(Template)]
#[template(path = "index.html")]
pub struct HomeTemplate {
    pub brand: String,
    pub sort_field: String,
    pub descending: bool,
    pub page: i64,
    pub limit: i64,
    pub items: Vec<ItemView>,
    /// The listing query was refused by the store.
    pub listing_failed: bool,
    pub cart: Vec<ItemView>,
}

/// Display the catalog and cart.
///
/// Accepts the same query parameters as `GET /cigarettes`. A listing query the
/// store refuses (such as `page=0`) renders an empty catalog with a notice.
#[instrument(skip(state))]
pub async fn home(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Html<String>> {
    let spec = QuerySpec::parse(&params);
    let (items, listing_failed) = match query_executor::execute(&spec, state.assortment()).await {
        Ok(items) => (items, false),
        Err(e) => {
            warn!(error = %e, "Catalog listing failed");
            (Vec::new(), true)
        }
    };
    let cart = query_executor::list_all(state.cart()).await?;

    let template = HomeTemplate {
        brand: spec.filter_text.clone().unwrap_or_default(),
        sort_field: spec.sort_field.clone().unwrap_or_default(),
        descending: spec.sort_descending,
        page: spec.page,
        limit: spec.limit,
        items: items.into_iter().map(ItemView::from).collect(),
        listing_failed,
        cart: cart.into_iter().map(ItemView::from).collect(),
    };

    Ok(Html(template.render()?))
}
