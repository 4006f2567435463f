use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Multipart, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use treefel_core::constants::DEFAULT_UPLOAD_FOLDER;
use treefel_core::AppError;
use utoipa::{IntoParams, ToSchema};

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::{extract_multipart_file, validate_content_type, validate_file_size};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UploadQuery {
    /// Destination folder; must be one of the configured upload folders
    #[serde(default = "default_folder")]
    folder: String,
}

fn default_folder() -> String {
    DEFAULT_UPLOAD_FOLDER.to_string()
}

/// Response consumed by rich-text editors (TinyMCE `images_upload_url`)
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    /// Public URL of the stored JPEG
    pub location: String,
}

/// Upload image handler
///
/// Accepts any decodable raster image, normalizes it to an RGB JPEG no
/// larger than the configured bounding box, stores it under a fresh random
/// key and returns its public URL.
///
/// # Errors
/// - `AppError::InvalidInput` - Missing file, unknown folder or disallowed content type
/// - `AppError::ImageProcessing` - Bytes are not a decodable image
/// - `AppError::PayloadTooLarge` - File exceeds size limit
/// - `AppError::Storage` - Store rejected the write
/// - `AppError::Timeout` - Processing exceeded the upload deadline
#[utoipa::path(
    post,
    path = "/api/v1/uploads",
    tag = "uploads",
    params(UploadQuery),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Image normalized and stored", body = UploadResponse),
        (status = 400, description = "Invalid input or undecodable image", body = ErrorResponse),
        (status = 401, description = "Missing or invalid credentials", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse),
        (status = 504, description = "Processing deadline exceeded", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, multipart),
    fields(folder = %query.folder, operation = "upload_image")
)]
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UploadQuery>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, HttpAppError> {
    if !state.config.is_upload_folder_allowed(&query.folder) {
        return Err(AppError::InvalidInput(format!(
            "Unknown upload folder '{}'. Allowed folders: {}",
            query.folder,
            state.config.upload_folders.join(", ")
        ))
        .into());
    }

    let file = extract_multipart_file(multipart).await?;
    validate_file_size(file.data.len(), state.config.max_file_size_bytes)?;
    // The format is sniffed from content; a declared type only has to be plausible
    if let Some(ref content_type) = file.content_type {
        validate_content_type(content_type, &state.config.allowed_content_types)?;
    }

    tracing::debug!(
        filename = ?file.filename,
        content_type = ?file.content_type,
        size_bytes = file.data.len(),
        "Received upload"
    );

    let deadline = Duration::from_secs(state.config.upload_timeout_secs);
    let uploaded = tokio::time::timeout(deadline, state.uploader.upload(file.data, &query.folder))
        .await
        .map_err(|_| {
            AppError::Timeout(format!(
                "Image processing exceeded {} seconds",
                state.config.upload_timeout_secs
            ))
        })??;

    Ok(Json(UploadResponse {
        location: uploaded.url,
    }))
}
