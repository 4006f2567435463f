//! OpenAPI documentation.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error;
use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Treefel API",
        version = "0.1.0",
        description = "Image upload pipeline: arbitrary raster images are normalized to bounded, optimized JPEGs and stored under random keys."
    ),
    paths(handlers::upload::upload_image),
    components(schemas(handlers::upload::UploadResponse, error::ErrorResponse)),
    modifiers(&BearerAuth),
    tags((name = "uploads", description = "Image uploads"))
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_upload_path() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/v1/uploads"));
        let components = doc.components.unwrap();
        assert!(components.schemas.contains_key("UploadResponse"));
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
