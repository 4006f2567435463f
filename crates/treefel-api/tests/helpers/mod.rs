//! Test helpers: build state and router for integration tests.
//!
//! Run from workspace root: `cargo test -p treefel-api`.

pub mod fixtures;

use axum_test::TestServer;
use std::sync::Arc;
use tempfile::TempDir;
use treefel_api::constants;
use treefel_api::setup::routes;
use treefel_api::AppState;
use treefel_core::{BaseConfig, Config, StorageBackend};
use treefel_storage::{LocalStorage, MemoryStorage, Storage};

/// Admin key accepted by test servers (32+ characters).
pub const TEST_ADMIN_API_KEY: &str = "test-admin-api-key-0123456789abcdef";

/// Base URL the in-memory store resolves keys against.
pub const TEST_MEDIA_BASE_URL: &str = "http://localhost:3000/media";

/// API path prefix for tests (e.g. `/api/v1`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

pub fn create_test_config() -> Config {
    Config {
        base: BaseConfig {
            server_port: 0,
            cors_origins: vec!["*".to_string()],
            environment: "test".to_string(),
            http_concurrency_limit: 64,
        },
        admin_api_key: TEST_ADMIN_API_KEY.to_string(),
        storage_backend: StorageBackend::Memory,
        local_storage_path: "./media".to_string(),
        local_storage_base_url: TEST_MEDIA_BASE_URL.to_string(),
        s3_bucket: None,
        s3_region: None,
        s3_endpoint: None,
        s3_public_url: None,
        max_file_size_bytes: 10 * 1024 * 1024,
        allowed_content_types: vec![
            "image/jpeg".to_string(),
            "image/png".to_string(),
            "image/gif".to_string(),
            "image/webp".to_string(),
            "image/bmp".to_string(),
        ],
        upload_folders: vec![
            "uploads".to_string(),
            "blog".to_string(),
            "gallery".to_string(),
        ],
        upload_timeout_secs: 30,
        image_max_dimension: 1920,
        image_quality: 85,
    }
}

/// Test application backed by an in-memory store.
pub struct TestApp {
    pub server: TestServer,
    pub storage: MemoryStorage,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

pub fn setup_test_app() -> TestApp {
    setup_test_app_with_config(create_test_config())
}

pub fn setup_test_app_with_config(config: Config) -> TestApp {
    let storage = MemoryStorage::new(TEST_MEDIA_BASE_URL);
    let server = build_server(config, Arc::new(storage.clone()));
    TestApp { server, storage }
}

/// Test application writing to a temporary directory, served under `/media`.
pub struct LocalTestApp {
    pub server: TestServer,
    pub _temp_dir: TempDir,
}

pub async fn setup_local_test_app() -> LocalTestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let root = temp_dir.path().to_string_lossy().to_string();

    let mut config = create_test_config();
    config.storage_backend = StorageBackend::Local;
    config.local_storage_path = root.clone();
    config.local_storage_base_url = "/media".to_string();

    let storage: Arc<dyn Storage> = Arc::new(
        LocalStorage::new(root, "/media".to_string())
            .await
            .expect("Failed to create local storage"),
    );
    let server = build_server(config, storage);

    LocalTestApp {
        server,
        _temp_dir: temp_dir,
    }
}

fn build_server(config: Config, storage: Arc<dyn Storage>) -> TestServer {
    let state = Arc::new(AppState::new(config.clone(), storage));
    let router = routes::setup_routes(&config, state).expect("Failed to build router");
    TestServer::new(router.into_make_service()).expect("Failed to create test server")
}
