//! Health, docs and static media integration tests.

mod helpers;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use helpers::fixtures::create_test_png;
use helpers::{api_path, bearer, setup_local_test_app, setup_test_app, TEST_ADMIN_API_KEY};
use image::ImageFormat;
use serde_json::Value;
use treefel_api::UploadResponse;

#[tokio::test]
async fn test_liveness() {
    let app = setup_test_app();

    let response = app.client().get("/health/live").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["status"], "alive");
}

#[tokio::test]
async fn test_readiness_probes_storage() {
    let app = setup_test_app();

    let response = app.client().get("/health/ready").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["status"], "ready");
    assert_eq!(body["storage"], "healthy");
    assert_eq!(body["storage_backend"], "memory");
}

#[tokio::test]
async fn test_openapi_document() {
    let app = setup_test_app();

    let response = app.client().get("/api/openapi.json").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert!(body["paths"].get("/api/v1/uploads").is_some());
}

#[tokio::test]
async fn test_local_upload_is_served_under_media() {
    let app = setup_local_test_app().await;

    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(create_test_png(120, 80))
            .file_name("local.png")
            .mime_type("image/png"),
    );
    let response = app
        .server
        .post(&api_path("/uploads"))
        .add_query_param("folder", "blog")
        .add_header("Authorization", bearer(TEST_ADMIN_API_KEY))
        .multipart(form)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let location = response.json::<UploadResponse>().location;
    assert!(location.starts_with("/media/blog/"), "{}", location);

    let served = app.server.get(&location).await;
    assert_eq!(served.status_code(), StatusCode::OK);
    let bytes = served.as_bytes();
    assert_eq!(image::guess_format(bytes).unwrap(), ImageFormat::Jpeg);
    let decoded = image::load_from_memory(bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (120, 80));
}

#[tokio::test]
async fn test_media_not_served_for_memory_backend() {
    let app = setup_test_app();

    let response = app.client().get("/media/uploads/missing.jpg").await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}
