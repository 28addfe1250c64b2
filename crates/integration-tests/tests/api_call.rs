//! Integration tests for `POST /api/apiCall`, the test API and the token guard.
//!
//! Partner APIs are mocked with httpmock; the router runs in-process over a
//! pool that is never connected.

#![allow(clippy::unwrap_used)]

use std::time::{Duration, Instant};

use axum::http::{Method, StatusCode, header};
use httpmock::prelude::*;
use secrecy::SecretString;
use serde_json::{Value, json};

use api_hub_integration_tests::{app_without_database, json_request, send, test_config};

const TOKEN: &str = "k7Qp2vXz9LmN4rTw8YbC3dFh6JsA1eGu";

async fn api_call(body: Value) -> (StatusCode, Value) {
    let app = app_without_database(test_config());
    send(app, json_request(Method::POST, "/api/apiCall", Some(&body))).await
}

// =============================================================================
// Pagination
// =============================================================================

#[tokio::test]
async fn test_follows_link_header_across_pages() {
    let server = MockServer::start_async().await;
    let path = "/admin/api/2024-01/products.json";
    let next = format!("<{}?limit=2&page_info=cursor2>; rel=\"next\"", server.url(path));

    let first = server
        .mock_async(|when, then| {
            when.method(GET)
                .path(path)
                .query_param("limit", "2")
                .header("x-shopify-access-token", "shpat_test")
                .header("content-type", "application/json");
            then.status(200)
                .header("Link", &next)
                .json_body(json!({ "products": [{ "id": 1 }, { "id": 2 }] }));
        })
        .await;

    let second = server
        .mock_async(|when, then| {
            when.method(GET)
                .path(path)
                .query_param("page_info", "cursor2");
            then.status(200)
                .json_body(json!({ "products": [{ "id": 3 }] }));
        })
        .await;

    let (status, body) = api_call(json!({
        "url": server.url(path),
        "method": "GET",
        "headers": { "X-Shopify-Access-Token": "shpat_test" },
        "params": { "limit": 2 }
    }))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "data": [{ "id": 1 }, { "id": 2 }, { "id": 3 }] }));
    first.assert_async().await;
    second.assert_async().await;
}

#[tokio::test]
async fn test_follows_relative_link_target() {
    let server = MockServer::start_async().await;
    let path = "/admin/api/2024-01/orders.json";

    let second = server
        .mock_async(|when, then| {
            when.method(GET).path(path).query_param("page_info", "rel2");
            then.status(200).json_body(json!([{ "id": 2 }]));
        })
        .await;
    let first = server
        .mock_async(|when, then| {
            when.method(GET).path(path).query_param("status", "any");
            then.status(200)
                .header("Link", format!("<{path}?status=any&page_info=rel2>; rel=\"next\""))
                .json_body(json!([{ "id": 1 }]));
        })
        .await;

    let (status, body) = api_call(json!({
        "url": server.url(path),
        "params": { "status": "any" }
    }))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([{ "id": 1 }, { "id": 2 }]));
    first.assert_async().await;
    second.assert_async().await;
}

#[tokio::test]
async fn test_waits_between_pages() {
    let server = MockServer::start_async().await;
    let next = format!("<{}?page_info=p2>; rel=\"next\"", server.url("/items"));

    // Cursor mock first: the unconstrained mock below would match it too
    server
        .mock_async(|when, then| {
            when.method(GET).path("/items").query_param("page_info", "p2");
            then.status(200).json_body(json!({ "items": ["b"] }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/items");
            then.status(200)
                .header("Link", &next)
                .json_body(json!({ "items": ["a"] }));
        })
        .await;

    let mut config = test_config();
    config.proxy.page_delay = Duration::from_millis(200);
    let app = app_without_database(config);

    let started = Instant::now();
    let (status, body) = send(
        app,
        json_request(
            Method::POST,
            "/api/apiCall",
            Some(&json!({ "url": server.url("/items") })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!(["a", "b"]));
    assert!(started.elapsed() >= Duration::from_millis(200));
}

#[tokio::test]
async fn test_page_cap_stops_early() {
    let server = MockServer::start_async().await;
    let next = format!("<{}?page_info=more>; rel=\"next\"", server.url("/products.json"));

    let second = server
        .mock_async(|when, then| {
            when.method(GET).path("/products.json").query_param("page_info", "more");
            then.status(200).json_body(json!({ "products": [{ "id": 2 }] }));
        })
        .await;
    let first = server
        .mock_async(|when, then| {
            when.method(GET).path("/products.json");
            then.status(200)
                .header("Link", &next)
                .json_body(json!({ "products": [{ "id": 1 }] }));
        })
        .await;

    let mut config = test_config();
    config.proxy.max_pages = Some(1);
    let (status, body) = send(
        app_without_database(config),
        json_request(
            Method::POST,
            "/api/apiCall",
            Some(&json!({ "url": server.url("/products.json") })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([{ "id": 1 }]));
    first.assert_hits_async(1).await;
    second.assert_hits_async(0).await;
}

// =============================================================================
// Response Shapes
// =============================================================================

#[tokio::test]
async fn test_orders_are_projected() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/admin/orders.json");
            then.status(200).json_body(json!({
                "orders": [{
                    "id": 450_789_469,
                    "created_at": "2024-03-01T10:00:00-05:00",
                    "total_price": "199.00",
                    "email": "buyer@example.com"
                }]
            }));
        })
        .await;

    let (status, body) = api_call(json!({ "url": server.url("/admin/orders.json") })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!([{
            "id": 450_789_469,
            "createdAt": "2024-03-01T10:00:00-05:00",
            "total": "199.00"
        }])
    );
}

#[tokio::test]
async fn test_shop_object_is_wrapped() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/admin/shop.json");
            then.status(200)
                .json_body(json!({ "shop": { "id": 7, "name": "Demo" } }));
        })
        .await;

    let (status, body) = api_call(json!({ "url": server.url("/admin/shop.json") })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([{ "id": 7, "name": "Demo" }]));
}

#[tokio::test]
async fn test_unrecognized_shape_yields_empty_data() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v5/boards");
            then.status(200).json_body(json!({ "bookmark": null, "total": 0 }));
        })
        .await;

    let (status, body) = api_call(json!({ "url": server.url("/v5/boards") })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "data": [] }));
}

#[tokio::test]
async fn test_post_method_is_forwarded() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/hooks");
            then.status(201).json_body(json!({ "message": "created" }));
        })
        .await;

    let (status, body) = api_call(json!({ "url": server.url("/hooks"), "method": "post" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!(["created"]));
    mock.assert_async().await;
}

// =============================================================================
// Errors
// =============================================================================

#[tokio::test]
async fn test_missing_url_is_bad_request() {
    let (status, body) = api_call(json!({ "method": "GET", "params": {} })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "URL is required" }));
}

#[tokio::test]
async fn test_upstream_error_is_reported_with_details() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/admin/products.json");
            then.status(401)
                .body("[API] Invalid API key or access token");
        })
        .await;

    let (status, body) = api_call(json!({ "url": server.url("/admin/products.json") })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Error connecting to API");
    assert_eq!(
        body["details"],
        "HTTP error! status: 401, details: [API] Invalid API key or access token"
    );
}

#[tokio::test]
async fn test_error_on_later_page_discards_earlier_pages() {
    let server = MockServer::start_async().await;
    let next = format!("<{}?page_info=p2>; rel=\"next\"", server.url("/products.json"));

    server
        .mock_async(|when, then| {
            when.method(GET).path("/products.json").query_param("page_info", "p2");
            then.status(429).body("Exceeded 2 calls per second");
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/products.json");
            then.status(200)
                .header("Link", &next)
                .json_body(json!({ "products": [{ "id": 1 }] }));
        })
        .await;

    let (status, body) = api_call(json!({ "url": server.url("/products.json") })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.get("data").is_none());
    assert!(body["details"].as_str().unwrap().contains("status: 429"));
}

#[tokio::test]
async fn test_non_json_body_is_an_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/page");
            then.status(200).body("<html>maintenance</html>");
        })
        .await;

    let (status, body) = api_call(json!({ "url": server.url("/page") })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Error connecting to API");
}

// =============================================================================
// Pinterest
// =============================================================================

#[tokio::test]
async fn test_pinterest_code_exchange() {
    let server = MockServer::start_async().await;
    let token = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v5/oauth/token")
                .header_exists("authorization")
                .header("content-type", "application/x-www-form-urlencoded")
                .body_contains("grant_type=authorization_code")
                .body_contains("code=abc123")
                .body_contains("redirect_uri=https%3A%2F%2Fhub.example.com%2Fcallback");
            then.status(200).json_body(json!({
                "access_token": "pina_test",
                "refresh_token": "pinr_test",
                "expires_in": 2_592_000
            }));
        })
        .await;

    let mut config = test_config();
    config.pinterest.token_url = server.url("/v5/oauth/token");
    let (status, body) = send(
        app_without_database(config),
        json_request(
            Method::POST,
            "/api/apiCall",
            Some(&json!({
                "url": "pinterest/token",
                "method": "POST",
                "params": { "code": "abc123" },
                "clientId": "1484362",
                "clientSecret": "app-secret",
                "redirectUrl": "https://hub.example.com/callback"
            })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token"]["access_token"], "pina_test");
    token.assert_async().await;
}

#[tokio::test]
async fn test_pinterest_exchange_requires_code_and_credentials() {
    let (status, body) = api_call(json!({
        "url": "pinterest/token",
        "clientId": "1484362",
        "clientSecret": "app-secret"
    }))
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing code");

    let (status, body) = api_call(json!({
        "url": "pinterest/token",
        "params": { "code": "abc123" },
        "clientId": "1484362"
    }))
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing clientSecret");
}

#[tokio::test]
async fn test_pinterest_rejection_is_bad_gateway() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v5/oauth/token");
            then.status(400)
                .json_body(json!({ "code": 1, "message": "Invalid authorization code" }));
        })
        .await;

    let mut config = test_config();
    config.pinterest.token_url = server.url("/v5/oauth/token");
    let (status, body) = send(
        app_without_database(config),
        json_request(
            Method::POST,
            "/api/apiCall",
            Some(&json!({
                "url": "pinterest/token",
                "params": { "code": "expired" },
                "clientId": "1484362",
                "clientSecret": "app-secret"
            })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["details"].as_str().unwrap().contains("Invalid authorization code"));
}

// =============================================================================
// Test API, Health and Token Guard
// =============================================================================

#[tokio::test]
async fn test_testapi_get_and_post() {
    let app = app_without_database(test_config());
    let (status, body) = send(app.clone(), json_request(Method::GET, "/api/testapi", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Test API is working!");
    assert!(body["timestamp"].is_string());

    let payload = json!({ "ping": 1 });
    let (status, body) = send(app, json_request(Method::POST, "/api/testapi", Some(&payload))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "POST request received");
    assert_eq!(body["data"], payload);
}

#[tokio::test]
async fn test_health_and_request_id() {
    use tower::ServiceExt;

    let app = app_without_database(test_config());
    let response = app
        .oneshot(json_request(Method::GET, "/health", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_token_guard() {
    let mut config = test_config();
    config.api_token = Some(SecretString::from(TOKEN));
    let app = app_without_database(config);
    let body = json!({});

    // Open route
    let (status, _) = send(app.clone(), json_request(Method::GET, "/api/testapi", None)).await;
    assert_eq!(status, StatusCode::OK);

    // No token
    let (status, response) = send(
        app.clone(),
        json_request(Method::POST, "/api/apiCall", Some(&body)),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(response["error"], "Missing API token");

    // Wrong token
    let mut request = json_request(Method::POST, "/api/apiCall", Some(&body));
    request
        .headers_mut()
        .insert(header::AUTHORIZATION, "Bearer not-the-token".parse().unwrap());
    let (status, _) = send(app.clone(), request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Bearer token passes the guard (and then fails validation)
    let mut request = json_request(Method::POST, "/api/apiCall", Some(&body));
    request.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {TOKEN}").parse().unwrap(),
    );
    let (status, _) = send(app.clone(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Cookie token passes too
    let mut request = json_request(Method::POST, "/api/apiCall", Some(&body));
    request
        .headers_mut()
        .insert(header::COOKIE, format!("authToken={TOKEN}").parse().unwrap());
    let (status, _) = send(app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
