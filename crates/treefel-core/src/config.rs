//! Configuration module
//!
//! Settings are read from the environment (and a `.env` file when present)
//! once at startup, then validated before any service is built.

use std::env;

use crate::constants::{DEFAULT_JPEG_QUALITY, DEFAULT_MAX_DIMENSION, MAX_JPEG_DIMENSION};
use crate::storage_types::StorageBackend;

const SERVER_PORT: u16 = 3000;
const MAX_FILE_SIZE_MB: usize = 10;
const UPLOAD_TIMEOUT_SECS: u64 = 30;
const HTTP_CONCURRENCY_LIMIT: usize = 1024;
const MIN_ADMIN_API_KEY_LEN: usize = 32;

/// Server-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub http_concurrency_limit: usize,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    /// Bearer token guarding the admin upload endpoint
    pub admin_api_key: String,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub local_storage_path: String,
    pub local_storage_base_url: String,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, R2, ...)
    pub s3_public_url: Option<String>,
    // Upload configuration
    pub max_file_size_bytes: usize,
    pub allowed_content_types: Vec<String>,
    pub upload_folders: Vec<String>,
    pub upload_timeout_secs: u64,
    // Image normalization
    pub image_max_dimension: u32,
    pub image_quality: u8,
}

/// Parse a variable, using `default` only when it is unset.
fn env_or<T: std::str::FromStr>(name: &str, default: T) -> Result<T, anyhow::Error> {
    parse_var(name, env::var(name).ok().as_deref(), default)
}

fn parse_var<T: std::str::FromStr>(
    name: &str,
    raw: Option<&str>,
    default: T,
) -> Result<T, anyhow::Error> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| anyhow::anyhow!("{} has an invalid value: {:?}", name, value)),
    }
}

/// Deployment environment: `ENVIRONMENT`, then `APP_ENV`.
pub fn environment_from(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    lookup("ENVIRONMENT").or_else(|| lookup("APP_ENV"))
}

/// Whether an environment name denotes production (`production` or `prod`)
pub fn is_production_name(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

fn env_list(name: &str, default: &str) -> Vec<String> {
    parse_list(&env::var(name).unwrap_or_else(|_| default.to_string()))
}

/// Split a comma-separated list, trimming and lowercasing entries.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = environment_from(|name| env::var(name).ok())
            .unwrap_or_else(|| "development".to_string());

        let cors_origins: Vec<String> = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse::<StorageBackend>()?,
            Err(_) => StorageBackend::Local,
        };

        let max_file_size_mb = env_or("MAX_FILE_SIZE_MB", MAX_FILE_SIZE_MB)?;

        let config = Config {
            base: BaseConfig {
                server_port: env_or("SERVER_PORT", SERVER_PORT)?,
                cors_origins,
                environment,
                http_concurrency_limit: env_or("HTTP_CONCURRENCY_LIMIT", HTTP_CONCURRENCY_LIMIT)?
                    .max(1),
            },
            admin_api_key: env::var("ADMIN_API_KEY").unwrap_or_default(),
            storage_backend,
            local_storage_path: env::var("LOCAL_STORAGE_PATH")
                .unwrap_or_else(|_| "./media".to_string()),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL")
                .unwrap_or_else(|_| "/media".to_string()),
            s3_bucket: non_empty_var("S3_BUCKET"),
            s3_region: non_empty_var("S3_REGION").or_else(|| non_empty_var("AWS_REGION")),
            s3_endpoint: non_empty_var("S3_ENDPOINT"),
            s3_public_url: non_empty_var("S3_PUBLIC_URL"),
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
            allowed_content_types: env_list(
                "ALLOWED_CONTENT_TYPES",
                "image/jpeg,image/png,image/gif,image/webp,image/bmp",
            ),
            upload_folders: env_list("UPLOAD_FOLDERS", "uploads,blog,gallery"),
            upload_timeout_secs: env_or("UPLOAD_TIMEOUT_SECS", UPLOAD_TIMEOUT_SECS)?.max(1),
            image_max_dimension: env_or("IMAGE_MAX_DIMENSION", DEFAULT_MAX_DIMENSION)?,
            image_quality: env_or("IMAGE_QUALITY", DEFAULT_JPEG_QUALITY)?,
        };

        Ok(config)
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_name(&self.base.environment)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.admin_api_key.len() < MIN_ADMIN_API_KEY_LEN {
            return Err(anyhow::anyhow!(
                "ADMIN_API_KEY must be at least {} characters long",
                MIN_ADMIN_API_KEY_LEN
            ));
        }

        if self.is_production() && self.base.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.storage_backend == StorageBackend::S3 {
            if self.s3_bucket.is_none() {
                return Err(anyhow::anyhow!("STORAGE_BACKEND=s3 requires S3_BUCKET"));
            }
            if self.s3_region.is_none() {
                return Err(anyhow::anyhow!(
                    "STORAGE_BACKEND=s3 requires S3_REGION or AWS_REGION"
                ));
            }
        }

        if self.image_max_dimension == 0 || self.image_max_dimension > MAX_JPEG_DIMENSION {
            return Err(anyhow::anyhow!(
                "IMAGE_MAX_DIMENSION must be between 1 and {}, got {}",
                MAX_JPEG_DIMENSION,
                self.image_max_dimension
            ));
        }

        if !(1..=100).contains(&self.image_quality) {
            return Err(anyhow::anyhow!(
                "IMAGE_QUALITY must be between 1 and 100, got {}",
                self.image_quality
            ));
        }

        if self.upload_folders.is_empty() {
            return Err(anyhow::anyhow!("UPLOAD_FOLDERS must name at least one folder"));
        }

        Ok(())
    }

    pub fn server_port(&self) -> u16 {
        self.base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.base.environment
    }

    /// Whether `folder` may be used as an upload destination
    pub fn is_upload_folder_allowed(&self, folder: &str) -> bool {
        self.upload_folders.iter().any(|f| f == folder)
    }
}
