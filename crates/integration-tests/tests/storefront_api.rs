//! HTTP API tests for the storefront, run in-process over in-memory stores.

#![allow(clippy::unwrap_used)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::json;
use smokeshop_integration_tests::{
    TestApp, body_text, brands, json_body, json_request, sample_catalog,
};

// =============================================================================
// Catalog Listing
// =============================================================================

#[tokio::test]
async fn test_list_defaults_to_first_page_in_insertion_order() {
    let app = TestApp::with_catalog(sample_catalog());
    let items = json_body(app.get("/cigarettes").await, StatusCode::OK).await;
    assert_eq!(
        brands(&items),
        ["Marlboro Gold", "Camel", "Winston Blue", "Newport", "Lucky Strike"]
    );
    assert_eq!(items[0]["type"], "filter");
}

#[tokio::test]
async fn test_brand_filter_is_case_insensitive_substring() {
    let app = TestApp::with_catalog(sample_catalog());
    let items = json_body(app.get("/cigarettes?brand=S").await, StatusCode::OK).await;
    assert_eq!(brands(&items), ["Winston Blue", "Lucky Strike"]);

    let items = json_body(app.get("/cigarettes?brand=marlboro").await, StatusCode::OK).await;
    assert_eq!(brands(&items), ["Marlboro Gold"]);
}

#[tokio::test]
async fn test_sort_by_price() {
    let app = TestApp::with_catalog(sample_catalog());
    let items = json_body(app.get("/cigarettes?sortField=price").await, StatusCode::OK).await;
    assert_eq!(
        brands(&items),
        ["Lucky Strike", "Camel", "Winston Blue", "Newport", "Marlboro Gold"]
    );

    let items = json_body(
        app.get("/cigarettes?sortField=price&sortOrder=desc").await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(brands(&items)[0], "Marlboro Gold");
}

#[tokio::test]
async fn test_pagination_after_sort() {
    let app = TestApp::with_catalog(sample_catalog());
    let items = json_body(
        app.get("/cigarettes?sortField=brand&sortOrder=desc&limit=2&page=2")
            .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(brands(&items), ["Marlboro Gold", "Lucky Strike"]);

    let items = json_body(app.get("/cigarettes?limit=2&page=9").await, StatusCode::OK).await;
    assert_eq!(items, json!([]));
}

#[tokio::test]
async fn test_malformed_numbers_fall_back_to_defaults() {
    let app = TestApp::with_catalog(sample_catalog());
    let items = json_body(app.get("/cigarettes?limit=ten&page=x").await, StatusCode::OK).await;
    assert_eq!(brands(&items).len(), 5);
}

#[tokio::test]
async fn test_no_match_is_an_empty_array() {
    let app = TestApp::with_catalog(sample_catalog());
    let response = app.get("/cigarettes?brand=gauloises").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "[]");
}

#[tokio::test]
async fn test_page_zero_is_a_server_error() {
    let app = TestApp::with_catalog(sample_catalog());
    let response = app.get("/cigarettes?page=0").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_text(response).await, "Internal server error");
}

#[tokio::test]
async fn test_invalid_brand_pattern_is_a_server_error() {
    let app = TestApp::with_catalog(sample_catalog());
    let response = app.get("/cigarettes?brand=%28").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

// =============================================================================
// Single Item and Price Update
// =============================================================================

#[tokio::test]
async fn test_get_cigarette_by_exact_brand() {
    let app = TestApp::with_catalog(sample_catalog());
    let item = json_body(app.get("/cigarette?brand=Camel").await, StatusCode::OK).await;
    assert_eq!(item["brand"], "Camel");
    assert_eq!(item["category"], "classic");
}

#[tokio::test]
async fn test_get_cigarette_not_found() {
    let app = TestApp::with_catalog(sample_catalog());
    for uri in ["/cigarette?brand=camel", "/cigarette?brand=Cam", "/cigarette"] {
        let response = app.get(uri).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[tokio::test]
async fn test_update_price() {
    let app = TestApp::with_catalog(sample_catalog());
    let response = app
        .post_json("/cigarette/update", &json!({"brand": "Camel", "price": 5.5}))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "Price updated successfully");

    let item = json_body(app.get("/cigarette?brand=Camel").await, StatusCode::OK).await;
    assert_eq!(item["price"].as_f64(), Some(5.5));
    assert_eq!(item["type"], "filter");
}

#[tokio::test]
async fn test_update_unknown_brand_still_succeeds() {
    let app = TestApp::with_catalog(sample_catalog());
    let response = app
        .post_json("/cigarette/update", &json!({"brand": "Gauloises", "price": 4}))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_update_rejects_bad_bodies() {
    let app = TestApp::with_catalog(sample_catalog());
    for body in [
        json!({"brand": "Camel"}),
        json!({"price": 3}),
        json!({"brand": "Camel", "price": -1}),
        json!({"brand": "Camel", "price": "cheap"}),
    ] {
        let response = app.post_json("/cigarette/update", &body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
    }

    let item = json_body(app.get("/cigarette?brand=Camel").await, StatusCode::OK).await;
    assert_eq!(item["price"].as_f64(), Some(7.25));
}

// =============================================================================
// Cart
// =============================================================================

#[tokio::test]
async fn test_empty_cart_is_an_empty_array() {
    let app = TestApp::with_catalog(sample_catalog());
    let response = app.get("/cart").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "[]");
}

#[tokio::test]
async fn test_add_then_view_cart() {
    let app = TestApp::with_catalog(sample_catalog());
    let line = json!({"brand": "Camel", "price": 7.25, "type": "filter"});

    let response = app.post_json("/cart/add", &line).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "Cigarette added to cart");

    let cart = json_body(app.get("/cart").await, StatusCode::OK).await;
    assert_eq!(cart, json!([line]));
}

#[tokio::test]
async fn test_add_keeps_absent_fields_absent() {
    let app = TestApp::with_catalog(sample_catalog());
    app.post_json("/cart/add", &json!({"brand": "Newport"})).await;

    let cart = json_body(app.get("/cart").await, StatusCode::OK).await;
    assert_eq!(cart, json!([{"brand": "Newport"}]));
}

#[tokio::test]
async fn test_add_rejects_malformed_body() {
    let app = TestApp::with_catalog(sample_catalog());
    let request = Request::post("/cart/add")
        .header("content-type", "application/json")
        .body(Body::from("{\"brand\":"))
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.post_json("/cart/add", &json!({"price": -3})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .post_json("/cart/add", &json!(["Camel", 1.0, "filter", "classic"]))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_eq!(body_text(app.get("/cart").await).await, "[]");
}

#[tokio::test]
async fn test_add_ignores_content_type() {
    let app = TestApp::with_catalog(sample_catalog());
    let request = Request::post("/cart/add")
        .header("content-type", "text/plain")
        .body(Body::from(r#"{"brand":"Camel"}"#))
        .unwrap();
    assert_eq!(app.send(request).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_remove_deletes_one_matching_line() {
    let app = TestApp::with_catalog(sample_catalog());
    for brand in ["Camel", "Newport", "Camel"] {
        app.post_json("/cart/add", &json!({"brand": brand})).await;
    }

    let response = app.post_json("/cart/remove", &json!({"brand": "Camel"})).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "Cigarette removed from cart");

    let cart = json_body(app.get("/cart").await, StatusCode::OK).await;
    assert_eq!(brands(&cart), ["Newport", "Camel"]);

    // Nothing matches; still a success.
    let response = app.post_json("/cart/remove", &json!({"brand": "Kent"})).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_clear_empties_cart() {
    let app = TestApp::with_catalog(sample_catalog());
    app.post_json("/cart/add", &json!({"brand": "Camel"})).await;
    app.post_json("/cart/add", &json!({"brand": "Newport"})).await;

    let response = app.send(json_request("/cart/clear", &json!({}))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "Cart cleared");
    assert_eq!(body_text(app.get("/cart").await).await, "[]");
}

// =============================================================================
// Rate Limiting
// =============================================================================

#[tokio::test]
async fn test_sixth_add_from_same_client_is_throttled() {
    let app = TestApp::with_catalog(sample_catalog());
    let line = json!({"brand": "Camel"});

    for _ in 0..5 {
        let response = app
            .send_from("198.51.100.4:5000", json_request("/cart/add", &line))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .send_from("198.51.100.4:5000", json_request("/cart/add", &line))
        .await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    // The throttled request never reached the store.
    let cart = json_body(app.get("/cart").await, StatusCode::OK).await;
    assert_eq!(brands(&cart).len(), 5);

    // Another client has its own allowance.
    let response = app
        .send_from("198.51.100.5:5000", json_request("/cart/add", &line))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.state.limiter().len(), 2);
}

#[tokio::test]
async fn test_only_add_is_throttled() {
    let app = TestApp::with_catalog(sample_catalog());
    for _ in 0..10 {
        assert_eq!(app.get("/cart").await.status(), StatusCode::OK);
        assert_eq!(app.get("/cigarettes").await.status(), StatusCode::OK);
        let response = app.post_json("/cart/remove", &json!({"brand": "Camel"})).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
    assert!(app.state.limiter().is_empty());
}

#[tokio::test]
async fn test_other_methods_on_add_do_not_spend_tokens() {
    let app = TestApp::with_catalog(sample_catalog());
    for _ in 0..5 {
        let request = Request::get("/cart/add").body(Body::empty()).unwrap();
        let response = app.send_from("198.51.100.9:7000", request).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
    assert!(app.state.limiter().is_empty());

    let response = app
        .send_from(
            "198.51.100.9:7000",
            json_request("/cart/add", &json!({"brand": "Camel"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

// =============================================================================
// Health, Home and Request IDs
// =============================================================================

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::with_catalog(sample_catalog());
    let response = app.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");

    assert_eq!(app.get("/health/ready").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_home_page_renders_catalog_and_cart() {
    let app = TestApp::with_catalog(sample_catalog());
    app.post_json("/cart/add", &json!({"brand": "Newport", "price": 8.75}))
        .await;

    let response = app.get("/?brand=new").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Newport"));
    assert!(!html.contains("Lucky Strike"));
}

#[tokio::test]
async fn test_home_page_survives_refused_listing() {
    let app = TestApp::with_catalog(sample_catalog());
    app.post_json("/cart/add", &json!({"brand": "Camel"})).await;

    let response = app.get("/?page=0").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("could not be listed"));
    assert!(!html.contains("Marlboro Gold"));
    assert!(html.contains("Camel"));
}

#[tokio::test]
async fn test_request_id_is_generated_or_echoed() {
    let app = TestApp::with_catalog(sample_catalog());
    let response = app.get("/health").await;
    let generated = response.headers().get("x-request-id").unwrap();
    assert!(!generated.is_empty());

    let request = Request::get("/health")
        .header("x-request-id", "lb-7f3a")
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.headers().get("x-request-id").unwrap(), "lb-7f3a");
}
