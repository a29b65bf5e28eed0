//! Integration tests for the API server.

use std::sync::OnceLock;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use intake::{
    DocumentIntake, FixedOcrEngine, FixedTextExtractor, IntakeConfig, MockCompletionClient,
};
use metrics_exporter_prometheus::PrometheusHandle;
use record_store::InMemoryRecordStore;
use std::sync::Arc;
use tower::ServiceExt;

const API_KEY: &str = "test-key-1";

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn test_intake(
    extractor: FixedTextExtractor,
    ocr: FixedOcrEngine,
    completion: MockCompletionClient,
) -> DocumentIntake {
    DocumentIntake::new(
        Arc::new(extractor),
        Arc::new(ocr),
        Arc::new(completion),
        IntakeConfig::default(),
    )
}

fn setup_with_intake(intake: DocumentIntake) -> axum::Router {
    let state = api::create_state(
        InMemoryRecordStore::new(),
        intake,
        api::auth::ApiKeySet::from_list(API_KEY),
    );
    api::create_app(state, get_metrics_handle())
}

fn setup() -> axum::Router {
    setup_with_intake(test_intake(
        FixedTextExtractor::returning("extracted text"),
        FixedOcrEngine::returning("ocr text"),
        MockCompletionClient::returning("completion result"),
    ))
}

fn authed(builder: axum::http::request::Builder) -> axum::http::request::Builder {
    builder.header("authorization", format!("Bearer {API_KEY}"))
}

fn create_order_body() -> String {
    serde_json::to_string(&serde_json::json!({
        "customerName": "John Doe",
        "customerEmail": "john@x.com",
        "productName": "Wheelchair",
        "quantity": 2,
        "unitPrice": 100.0
    }))
    .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn create_order(app: &axum::Router) -> serde_json::Value {
    let response = app
        .clone()
        .oneshot(
            authed(
                Request::builder()
                    .method("POST")
                    .uri("/orders")
                    .header("content-type", "application/json"),
            )
            .body(Body::from(create_order_body()))
            .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    json_body(response).await
}

fn multipart_request(content_type: &str, data: &[u8]) -> Request<Body> {
    let boundary = "test-boundary-7f9a";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; \
             filename=\"upload.pdf\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    authed(
        Request::builder()
            .method("POST")
            .uri("/orders/upload-pdf")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            ),
    )
    .body(Body::from(body))
    .unwrap()
}

// -- Auth --

#[tokio::test]
async fn test_missing_credential_is_unauthorized() {
    let app = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/orders")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = json_body(response).await;
    assert_eq!(json["error"], "API key is required");
}

#[tokio::test]
async fn test_unknown_key_is_unauthorized() {
    let app = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/orders")
                .header("authorization", "Bearer wrong-key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = json_body(response).await;
    assert_eq!(json["error"], "Invalid API key");
}

#[tokio::test]
async fn test_apikey_scheme_is_accepted() {
    let app = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/orders")
                .header("authorization", format!("ApiKey {API_KEY}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_health_check_requires_credential() {
    let app = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/orders/health/check")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// -- Health --

#[tokio::test]
async fn test_health_check() {
    let app = setup();

    let response = app
        .oneshot(
            authed(Request::builder().uri("/orders/health/check"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["status"], "OK");
    let timestamp = json["timestamp"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
}

// -- Order CRUD --

#[tokio::test]
async fn test_create_order() {
    let app = setup();

    let created = create_order(&app).await;

    assert_eq!(created["customerName"], "John Doe");
    assert_eq!(created["totalPrice"], 200.0);
    assert_eq!(created["status"], "pending");
    assert_eq!(created["createdAt"], created["updatedAt"]);
    assert!(created["id"].as_str().is_some());
}

#[tokio::test]
async fn test_create_order_rejects_zero_quantity() {
    let app = setup();

    let response = app
        .oneshot(
            authed(
                Request::builder()
                    .method("POST")
                    .uri("/orders")
                    .header("content-type", "application/json"),
            )
            .body(Body::from(
                serde_json::to_string(&serde_json::json!({
                    "customerName": "John Doe",
                    "customerEmail": "john@x.com",
                    "productName": "Wheelchair",
                    "quantity": 0,
                    "unitPrice": 100.0
                }))
                .unwrap(),
            ))
            .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_order_rejects_bad_email() {
    let app = setup();

    let response = app
        .oneshot(
            authed(
                Request::builder()
                    .method("POST")
                    .uri("/orders")
                    .header("content-type", "application/json"),
            )
            .body(Body::from(
                serde_json::to_string(&serde_json::json!({
                    "customerName": "John Doe",
                    "customerEmail": "not-an-email",
                    "productName": "Wheelchair",
                    "quantity": 1,
                    "unitPrice": 100.0
                }))
                .unwrap(),
            ))
            .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_and_get_order() {
    let app = setup();

    let created = create_order(&app).await;
    let order_id = created["id"].as_str().unwrap();

    let response = app
        .oneshot(
            authed(Request::builder().uri(format!("/orders/{order_id}")))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let order = json_body(response).await;
    assert_eq!(order["id"], order_id);
    assert_eq!(order["totalPrice"], 200.0);
}

#[tokio::test]
async fn test_get_nonexistent_order() {
    let app = setup();
    let fake_id = uuid::Uuid::new_v4();

    let response = app
        .oneshot(
            authed(Request::builder().uri(format!("/orders/{fake_id}")))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_with_opaque_id_is_not_found() {
    let app = setup();

    let response = app
        .oneshot(
            authed(Request::builder().uri("/orders/not-a-real-id"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_orders() {
    let app = setup();

    create_order(&app).await;
    create_order(&app).await;

    let response = app
        .oneshot(
            authed(Request::builder().uri("/orders"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let orders = json_body(response).await;
    assert_eq!(orders.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_patch_shipping_address_leaves_pricing_alone() {
    let app = setup();

    let created = create_order(&app).await;
    let order_id = created["id"].as_str().unwrap();

    let response = app
        .oneshot(
            authed(
                Request::builder()
                    .method("PATCH")
                    .uri(format!("/orders/{order_id}"))
                    .header("content-type", "application/json"),
            )
            .body(Body::from(
                serde_json::to_string(&serde_json::json!({
                    "shippingAddress": "123 Main St, City, State 12345"
                }))
                .unwrap(),
            ))
            .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let updated = json_body(response).await;
    assert_eq!(
        updated["shippingAddress"],
        "123 Main St, City, State 12345"
    );
    assert_eq!(updated["quantity"], 2);
    assert_eq!(updated["unitPrice"], 100.0);
    assert_eq!(updated["totalPrice"], 200.0);

    let created_at =
        chrono::DateTime::parse_from_rfc3339(created["createdAt"].as_str().unwrap()).unwrap();
    let updated_at =
        chrono::DateTime::parse_from_rfc3339(updated["updatedAt"].as_str().unwrap()).unwrap();
    assert!(updated_at > created_at);
}

#[tokio::test]
async fn test_patch_quantity_recomputes_total() {
    let app = setup();

    let created = create_order(&app).await;
    let order_id = created["id"].as_str().unwrap();

    let response = app
        .oneshot(
            authed(
                Request::builder()
                    .method("PATCH")
                    .uri(format!("/orders/{order_id}"))
                    .header("content-type", "application/json"),
            )
            .body(Body::from(
                serde_json::to_string(&serde_json::json!({ "quantity": 5 })).unwrap(),
            ))
            .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let updated = json_body(response).await;
    assert_eq!(updated["quantity"], 5);
    assert_eq!(updated["totalPrice"], 500.0);
}

#[tokio::test]
async fn test_patch_nonexistent_order() {
    let app = setup();
    let fake_id = uuid::Uuid::new_v4();

    let response = app
        .oneshot(
            authed(
                Request::builder()
                    .method("PATCH")
                    .uri(format!("/orders/{fake_id}"))
                    .header("content-type", "application/json"),
            )
            .body(Body::from("{}"))
            .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_then_get_is_not_found() {
    let app = setup();

    let created = create_order(&app).await;
    let order_id = created["id"].as_str().unwrap();

    let delete_response = app
        .clone()
        .oneshot(
            authed(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/orders/{order_id}")),
            )
            .body(Body::empty())
            .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(delete_response.status(), StatusCode::OK);

    let get_response = app
        .oneshot(
            authed(Request::builder().uri(format!("/orders/{order_id}")))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(get_response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_nonexistent_order() {
    let app = setup();
    let fake_id = uuid::Uuid::new_v4();

    let response = app
        .oneshot(
            authed(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/orders/{fake_id}")),
            )
            .body(Body::empty())
            .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// -- PDF upload --

#[tokio::test]
async fn test_upload_pdf_returns_completion_text() {
    let app = setup_with_intake(test_intake(
        FixedTextExtractor::returning("Jane Roe, DOB 01/02/2003"),
        FixedOcrEngine::returning("unused"),
        MockCompletionClient::returning("Patient Name: Jane Roe"),
    ));

    let response = app
        .oneshot(multipart_request("application/pdf", b"%PDF-1.4 fake"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"], "Patient Name: Jane Roe");
}

#[tokio::test]
async fn test_upload_falls_back_to_ocr_for_empty_text_layer() {
    let ocr = FixedOcrEngine::returning("scanned text");
    let app = setup_with_intake(test_intake(
        FixedTextExtractor::returning(""),
        ocr.clone(),
        MockCompletionClient::returning("parsed"),
    ));

    let response = app
        .oneshot(multipart_request("application/pdf", b"%PDF-1.4 fake"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(ocr.call_count(), 1);
}

#[tokio::test]
async fn test_upload_non_pdf_is_rejected() {
    let app = setup();

    let response = app
        .oneshot(multipart_request("image/png", b"not a pdf"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_without_file_field_is_rejected() {
    let app = setup();

    let boundary = "test-boundary-7f9a";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nvalue\r\n--{boundary}--\r\n"
    );

    let response = app
        .oneshot(
            authed(
                Request::builder()
                    .method("POST")
                    .uri("/orders/upload-pdf")
                    .header(
                        "content-type",
                        format!("multipart/form-data; boundary={boundary}"),
                    ),
            )
            .body(Body::from(body))
            .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"], "No file uploaded");
}

#[tokio::test]
async fn test_upload_ocr_failure_is_bad_gateway() {
    let app = setup_with_intake(test_intake(
        FixedTextExtractor::returning(""),
        FixedOcrEngine::failing(),
        MockCompletionClient::returning("unused"),
    ));

    let response = app
        .oneshot(multipart_request("application/pdf", b"%PDF-1.4 fake"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_upload_completion_failure_is_bad_gateway() {
    let app = setup_with_intake(test_intake(
        FixedTextExtractor::returning("some text"),
        FixedOcrEngine::returning("unused"),
        MockCompletionClient::failing(),
    ));

    let response = app
        .oneshot(multipart_request("application/pdf", b"%PDF-1.4 fake"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

// -- Metrics --

#[tokio::test]
async fn test_metrics_endpoint_is_open() {
    let app = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
