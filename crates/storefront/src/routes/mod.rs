//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page (catalog and cart)
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (pings the store)
//!
//! # Catalog
//! GET  /cigarettes             - Filtered, sorted, paginated listing (JSON)
//! GET  /cigarette?brand=X      - Single item by exact brand (JSON)
//! POST /cigarette/update       - Set an item's price
//!
//! # Cart
//! POST /cart/add               - Add a line (rate limited per client)
//! GET  /cart                   - All lines (JSON)
//! POST /cart/remove            - Remove one line by brand
//! POST /cart/clear             - Remove every line
//! ```

pub mod cart;
pub mod catalog;
pub mod health;
pub mod home;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::admission_middleware;
use crate::services::RateLimiterRegistry;
use crate::state::AppState;

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/cigarettes", get(catalog::list))
        .route("/cigarette", get(catalog::show))
        .route("/cigarette/update", post(catalog::update_price))
}

/// Create the cart routes router.
///
/// Only `/add` is behind admission control.
pub fn cart_routes(limiter: Arc<RateLimiterRegistry>) -> Router<AppState> {
    // Layered on the POST handler alone, so other methods get 405 without
    // spending a token.
    let add = post(cart::add).route_layer(axum::middleware::from_fn_with_state(
        limiter,
        admission_middleware,
    ));

    Router::new()
        .route("/", get(cart::show))
        .route("/add", add)
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
}

/// Create all routes for the storefront.
pub fn routes(limiter: Arc<RateLimiterRegistry>) -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(catalog_routes())
        .nest("/cart", cart_routes(limiter))
}
