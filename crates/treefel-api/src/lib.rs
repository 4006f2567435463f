//! Treefel API Library
//!
//! HTTP surface of the image pipeline: the authenticated upload endpoint,
//! health probes, static media serving and OpenAPI docs.

mod api_doc;
pub mod constants;
mod handlers;
mod telemetry;
mod utils;

pub mod auth;
pub mod error;
pub mod setup;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use handlers::upload::UploadResponse;
pub use state::AppState;
