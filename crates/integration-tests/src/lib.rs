//! Integration tests for Smokeshop.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process tests against the in-memory store
//! cargo test -p smokeshop-integration-tests
//!
//! # Include the PostgreSQL-backed tests
//! SHOP_TEST_DATABASE_URL=postgres://localhost/shop_test \
//!     cargo test -p smokeshop-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `storefront_api` - HTTP API tests driven through the router
//! - `postgres_store` - Document store tests against a live database

#![allow(clippy::unwrap_used)]

use std::net::SocketAddr;

use axum::{
    Router,
    body::Body,
    extract::ConnectInfo,
    http::{Request, Response, StatusCode},
};
use serde_json::{Value, json};
use smokeshop_storefront::db::MemoryCollection;
use smokeshop_storefront::state::AppState;
use tower::ServiceExt;

/// Catalog used by most tests, in insertion order.
#[must_use]
pub fn sample_catalog() -> Vec<Value> {
    vec![
        json!({"brand": "Marlboro Gold", "price": 9.5, "type": "filter", "category": "premium"}),
        json!({"brand": "Camel", "price": 7.25, "type": "filter", "category": "classic"}),
        json!({"brand": "Winston Blue", "price": 8.0, "type": "filter", "category": "classic"}),
        json!({"brand": "Newport", "price": 8.75, "type": "menthol", "category": "premium"}),
        json!({"brand": "Lucky Strike", "price": 6.5, "type": "non-filter", "category": "classic"}),
    ]
}

/// A running router plus handles on its collections.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Build the app over in-memory collections.
    #[must_use]
    pub fn with_catalog(catalog: Vec<Value>) -> Self {
        let state = AppState::new(
            MemoryCollection::with_documents(catalog),
            MemoryCollection::new(),
        );
        Self {
            router: smokeshop_storefront::app(state.clone()),
            state,
        }
    }

    /// Send a request as if it came from `peer`.
    pub async fn send_from(&self, peer: &str, mut request: Request<Body>) -> Response<Body> {
        let addr: SocketAddr = peer.parse().unwrap();
        request.extensions_mut().insert(ConnectInfo(addr));
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Send a request from the default test peer.
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.send_from("127.0.0.1:40000", request).await
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(&self, uri: &str, body: &Value) -> Response<Body> {
        self.send(json_request(uri, body)).await
    }
}

/// Build a POST request with a JSON body.
#[must_use]
pub fn json_request(uri: &str, body: &Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Read the full response body as text.
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Assert the status and parse the body as JSON.
pub async fn json_body(response: Response<Body>, status: StatusCode) -> Value {
    assert_eq!(response.status(), status);
    serde_json::from_str(&body_text(response).await).unwrap()
}

/// Brands from a JSON array of items, in order.
#[must_use]
pub fn brands(items: &Value) -> Vec<&str> {
    items
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["brand"].as_str().unwrap())
        .collect()
}
