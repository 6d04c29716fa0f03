//! Handler tests for Products domain
//!
//! These tests verify that HTTP handlers work correctly:
//! - Request deserialization and validation
//! - Response serialization
//! - HTTP status codes and error envelopes
//!
//! They run against the in-memory repository; PostgreSQL behaviour is covered
//! by the integration tests.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use domain_products::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt; // For oneshot()

// Helper to parse JSON response body
async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn app() -> Router {
    handlers::router(ProductService::new(InMemoryProductRepository::new()))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn create(app: &Router, title: &str, images: &[&str]) -> Product {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/",
            json!({
                "title": title,
                "price": 35.0,
                "sizes": ["S", "M"],
                "gender": "women",
                "images": images
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    json_body(response.into_body()).await
}

#[tokio::test]
async fn test_create_product_returns_201() {
    let app = app();

    let product = create(&app, "Blue Shirt", &["https://cdn.example.com/1.jpg"]).await;

    assert_eq!(product.title, "Blue Shirt");
    assert_eq!(product.slug, "blue_shirt");
    assert_eq!(product.gender, Gender::Women);
    assert_eq!(product.stock, 0);
    assert_eq!(product.images, vec!["https://cdn.example.com/1.jpg"]);
}

#[tokio::test]
async fn test_create_product_validates_input() {
    let app = app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/",
            json!({
                "title": "",
                "price": -1.0,
                "sizes": [],
                "gender": "men"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert!(body["details"]["title"].is_array());
    assert!(body["details"]["price"].is_array());
}

#[tokio::test]
async fn test_create_product_rejects_unknown_gender() {
    let app = app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/",
            json!({ "title": "Socks", "sizes": ["M"], "gender": "robots" }),
        ))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_create_duplicate_returns_409() {
    let app = app();
    create(&app, "Blue Shirt", &[]).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/",
            json!({ "title": "Blue Shirt", "sizes": ["M"], "gender": "men" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "CONFLICT");
}

#[tokio::test]
async fn test_get_product_by_id_title_and_slug() {
    let app = app();
    let created = create(&app, "Blue Shirt", &["a.jpg"]).await;

    for uri in [
        format!("/{}", created.id),
        "/BLUE%20SHIRT".to_string(),
        "/blue_shirt".to_string(),
    ] {
        let response = app.clone().oneshot(get(&uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "GET {uri}");

        let product: Product = json_body(response.into_body()).await;
        assert_eq!(product.id, created.id);
        assert_eq!(product.images, vec!["a.jpg"]);
    }
}

#[tokio::test]
async fn test_get_missing_product_returns_404() {
    let response = app().oneshot(get("/no_such_product")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_list_products_paginates() {
    let app = app();
    for title in ["One", "Two", "Three"] {
        create(&app, title, &[]).await;
    }

    let response = app.clone().oneshot(get("/?limit=2")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page: Vec<Product> = json_body(response.into_body()).await;
    assert_eq!(page.len(), 2);

    let response = app.clone().oneshot(get("/?offset=2&limit=2")).await.unwrap();
    let page: Vec<Product> = json_body(response.into_body()).await;
    assert_eq!(page.len(), 1);

    let response = app.oneshot(get("/?offset=30")).await.unwrap();
    let page: Vec<Product> = json_body(response.into_body()).await;
    assert!(page.is_empty());
}

#[tokio::test]
async fn test_list_products_rejects_bad_pagination() {
    let app = app();

    let response = app.clone().oneshot(get("/?limit=0")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.oneshot(get("/?offset=-1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_products_rejects_pagination_beyond_bigint() {
    let app = app();

    for uri in [
        "/?limit=9223372036854775808",
        "/?offset=9223372036854775808",
        "/?limit=18446744073709551615",
    ] {
        let response = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "GET {uri}");

        let body: Value = json_body(response.into_body()).await;
        assert_eq!(body["error"], "VALIDATION_ERROR", "GET {uri}");
    }
}

#[tokio::test]
async fn test_update_product_replaces_images() {
    let app = app();
    let created = create(&app, "Hoodie", &["old.jpg"]).await;

    let response = app
        .oneshot(json_request(
            "PATCH",
            &format!("/{}", created.id),
            json!({ "stock": 4, "images": ["new-1.jpg", "new-2.jpg"] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let product: Product = json_body(response.into_body()).await;
    assert_eq!(product.stock, 4);
    assert_eq!(product.images, vec!["new-1.jpg", "new-2.jpg"]);
    assert_eq!(product.title, "Hoodie");
}

#[tokio::test]
async fn test_update_with_invalid_uuid_returns_400() {
    let response = app()
        .oneshot(json_request("PATCH", "/blue_shirt", json!({ "stock": 1 })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "INVALID_UUID");
}

#[tokio::test]
async fn test_delete_product() {
    let app = app();
    let created = create(&app, "Cap", &["cap.jpg"]).await;

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/{}", created.id))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: DeleteResponse = json_body(response.into_body()).await;
    assert_eq!(
        body.message,
        format!("Product {} deleted successfully", created.id)
    );

    let response = app
        .oneshot(get(&format!("/{}", created.id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
