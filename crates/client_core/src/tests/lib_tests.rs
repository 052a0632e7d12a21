use super::*;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nnot-really-a-png";

#[derive(Clone, Default)]
struct ServerState {
    seen_ids: Arc<Mutex<Vec<String>>>,
}

impl ServerState {
    fn seen_ids(&self) -> Vec<String> {
        self.seen_ids.lock().expect("lock").clone()
    }
}

fn sneaker_body(price: serde_json::Value, stock: serde_json::Value) -> serde_json::Value {
    json!({
        "status": "success",
        "data": {
            "id": "42",
            "name": "Sneaker",
            "category": "Footwear",
            "style": "Casual",
            "price": price,
            "current_stock": stock,
            "gender_affinity": "Unisex",
            "where_visible": "Storefront",
            "description": "Comfy.",
            "image": "sneaker.png",
            "image_url": ""
        }
    })
}

async fn handle_get_product(
    State(state): State<ServerState>,
    Path(product_id): Path<String>,
) -> Response {
    state
        .seen_ids
        .lock()
        .expect("lock")
        .push(product_id.clone());

    match product_id.as_str() {
        "42" => (StatusCode::OK, Json(sneaker_body(json!(59.99), json!(10)))).into_response(),
        "dynamo" => (
            StatusCode::OK,
            Json(sneaker_body(json!("60.00"), json!("10.0"))),
        )
            .into_response(),
        "broken-body" => (StatusCode::OK, "<html>oops</html>").into_response(),
        "no-data" => (StatusCode::OK, Json(json!({"status": "success"}))).into_response(),
        "html-error" => (StatusCode::BAD_GATEWAY, "<html>bad gateway</html>").into_response(),
        "silent-error" => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"status": "error"})),
        )
            .into_response(),
        "boom" => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "status": "error",
                "message": "Error retrieving product: table missing"
            })),
        )
            .into_response(),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({"status": "error", "message": "Product not found"})),
        )
            .into_response(),
    }
}

async fn handle_health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "message": "Service is running",
        "config": {"table_name": "Products", "s3_bucket": "productsimageopensearchbucket"}
    }))
}

async fn handle_image(Path(name): Path<String>) -> Response {
    if name == "sneaker.png" {
        (StatusCode::OK, PNG_BYTES).into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

async fn spawn_product_server() -> std::io::Result<(String, ServerState)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = ServerState::default();
    let app = Router::new()
        .route("/api/products/:product_id", get(handle_get_product))
        .route("/health", get(handle_health))
        .route("/images/:name", get(handle_image))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), state))
}

async fn unreachable_server_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{addr}")
}

#[test]
fn product_url_encodes_the_id_as_one_segment() {
    let client = ProductClient::new("http://products.local:5000").expect("client");
    let url = client
        .product_url(&ProductId::new("a/b c?d#e"))
        .expect("url");
    assert_eq!(
        url.as_str(),
        "http://products.local:5000/api/products/a%2Fb%20c%3Fd%23e"
    );
}

#[test]
fn product_url_keeps_a_base_path() {
    let client = ProductClient::new("https://gateway.example/shop/").expect("client");
    let url = client.product_url(&ProductId::new("42")).expect("url");
    assert_eq!(url.as_str(), "https://gateway.example/shop/api/products/42");
}

#[test]
fn rejects_unusable_server_urls() {
    assert!(matches!(
        ProductClient::new("not a url"),
        Err(LookupError::InvalidServerUrl(_))
    ));
    assert!(matches!(
        ProductClient::new("mailto:ops@example.com"),
        Err(LookupError::InvalidServerUrl(_))
    ));
}

#[test]
fn only_rejections_surface_their_own_message() {
    let rejected = LookupError::Rejected {
        status: 404,
        message: "Product not found".into(),
    };
    assert_eq!(rejected.user_message(), "Product not found");
    assert_eq!(
        LookupError::Transport("refused".into()).user_message(),
        GENERIC_ERROR_MESSAGE
    );
    assert_eq!(
        LookupError::EmptyProductId.user_message(),
        GENERIC_ERROR_MESSAGE
    );
}

#[tokio::test]
async fn fetches_product_from_data_envelope() {
    let (server_url, _) = spawn_product_server().await.expect("spawn server");
    let client = ProductClient::new(&server_url).expect("client");

    let product = client
        .fetch_product(&ProductId::new("42"))
        .await
        .expect("product");
    assert_eq!(product.name, "Sneaker");
    assert_eq!(product.price.as_str(), "59.99");
    assert_eq!(product.current_stock.as_str(), "10");
    assert_eq!(product.id.as_deref(), Some("42"));
    assert_eq!(product.image.as_deref(), Some("sneaker.png"));
}

#[tokio::test]
async fn accepts_numeric_strings_from_the_service() {
    let (server_url, _) = spawn_product_server().await.expect("spawn server");
    let client = ProductClient::new(&server_url).expect("client");

    let product = client
        .fetch_product(&ProductId::new("dynamo"))
        .await
        .expect("product");
    assert_eq!(product.price.as_str(), "60.00");
    assert_eq!(product.current_stock.as_str(), "10.0");
}

#[tokio::test]
async fn numeric_strings_render_as_sent() {
    let (server_url, _) = spawn_product_server().await.expect("spawn server");
    let client = ProductClient::new(&server_url).expect("client");
    let mut controller = LookupController::default();

    controller.lookup(&client, "dynamo").await.expect("lookup");
    let view = controller.render();
    assert_eq!(view.field_by_id("productPrice"), Some("$60.00"));
    assert_eq!(view.field_by_id("productStock"), Some("10.0"));
}

#[tokio::test]
async fn encoded_id_reaches_the_server_intact() {
    let (server_url, state) = spawn_product_server().await.expect("spawn server");
    let client = ProductClient::new(&server_url).expect("client");

    let err = client
        .fetch_product(&ProductId::new("shoes/red pair?"))
        .await
        .expect_err("unknown product");
    assert!(matches!(err, LookupError::Rejected { status: 404, .. }));
    assert_eq!(state.seen_ids(), vec!["shoes/red pair?".to_string()]);
}

#[tokio::test]
async fn not_found_carries_the_service_message() {
    let (server_url, _) = spawn_product_server().await.expect("spawn server");
    let client = ProductClient::new(&server_url).expect("client");

    let err = client
        .fetch_product(&ProductId::new("missing"))
        .await
        .expect_err("missing");
    match err {
        LookupError::Rejected { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Product not found");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn server_error_message_is_passed_through() {
    let (server_url, _) = spawn_product_server().await.expect("spawn server");
    let client = ProductClient::new(&server_url).expect("client");

    let err = client
        .fetch_product(&ProductId::new("boom"))
        .await
        .expect_err("boom");
    assert_eq!(err.user_message(), "Error retrieving product: table missing");
}

#[tokio::test]
async fn non_success_without_usable_message_falls_back_to_generic_text() {
    let (server_url, _) = spawn_product_server().await.expect("spawn server");
    let client = ProductClient::new(&server_url).expect("client");

    for id in ["html-error", "silent-error"] {
        let err = client
            .fetch_product(&ProductId::new(id))
            .await
            .expect_err("error status");
        assert!(matches!(err, LookupError::Rejected { .. }), "{id}: {err:?}");
        assert_eq!(err.user_message(), GENERIC_ERROR_MESSAGE);
    }
}

#[tokio::test]
async fn unusable_success_body_is_malformed() {
    let (server_url, _) = spawn_product_server().await.expect("spawn server");
    let client = ProductClient::new(&server_url).expect("client");

    for id in ["broken-body", "no-data"] {
        let err = client
            .fetch_product(&ProductId::new(id))
            .await
            .expect_err("malformed");
        assert!(matches!(err, LookupError::MalformedBody(_)), "{id}: {err:?}");
    }
}

#[tokio::test]
async fn unreachable_service_is_a_transport_failure() {
    let client = ProductClient::new(&unreachable_server_url().await).expect("client");

    let err = client
        .fetch_product(&ProductId::new("42"))
        .await
        .expect_err("refused");
    assert!(matches!(err, LookupError::Transport(_)), "{err:?}");
    assert_eq!(err.user_message(), GENERIC_ERROR_MESSAGE);
}

#[tokio::test]
async fn reads_service_health() {
    let (server_url, _) = spawn_product_server().await.expect("spawn server");
    let client = ProductClient::new(&server_url).expect("client");

    let health = client.health().await.expect("health");
    assert!(health.is_healthy());
    assert_eq!(health.message.as_deref(), Some("Service is running"));
    assert_eq!(
        health.config.s3_bucket.as_deref(),
        Some("productsimageopensearchbucket")
    );
}

#[tokio::test]
async fn fetches_image_bytes_and_reports_missing_images() {
    let (server_url, _) = spawn_product_server().await.expect("spawn server");
    let client = ProductClient::new(&server_url).expect("client");

    let bytes = client
        .fetch_image(&format!("{server_url}/images/sneaker.png"))
        .await
        .expect("image");
    assert_eq!(bytes, PNG_BYTES);

    let err = client
        .fetch_image(&format!("{server_url}/images/gone.png"))
        .await
        .expect_err("missing image");
    assert!(matches!(err, LookupError::Transport(_)));

    assert!(client.fetch_image("::not-a-url").await.is_err());
}

#[tokio::test]
async fn controller_shows_sneaker_for_id_42() {
    let (server_url, _) = spawn_product_server().await.expect("spawn server");
    let client = ProductClient::new(&server_url).expect("client");
    let mut controller = LookupController::default();

    controller.lookup(&client, "42").await.expect("lookup");
    let view = controller.render();
    assert_eq!(controller.phase(), LookupPhase::Success);
    assert_eq!(view.field_by_id("productPrice"), Some("$59.99"));
    assert_eq!(view.field_by_id("productName"), Some("Sneaker"));
    assert!(!view.is_visible(Region::ImagePanel));
}

#[tokio::test]
async fn controller_shows_not_found_banner_for_missing_id() {
    let (server_url, _) = spawn_product_server().await.expect("spawn server");
    let client = ProductClient::new(&server_url).expect("client");
    let mut controller = LookupController::default();

    controller.lookup(&client, "missing").await.expect("lookup");
    let view = controller.render();
    assert_eq!(controller.phase(), LookupPhase::Error);
    assert_eq!(view.error_banner.as_deref(), Some("Product not found"));
    assert!(!view.is_visible(Region::ProductPanel));
}

#[tokio::test]
async fn controller_shows_generic_banner_when_service_is_down() {
    let client = ProductClient::new(&unreachable_server_url().await).expect("client");
    let mut controller = LookupController::default();

    controller.lookup(&client, "42").await.expect("lookup");
    assert_eq!(
        controller.render().error_banner.as_deref(),
        Some(GENERIC_ERROR_MESSAGE)
    );
    assert!(!controller.render().loading_visible);
}
