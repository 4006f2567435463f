//! Application state shared by handlers.

use std::sync::Arc;
use treefel_core::Config;
use treefel_processing::{ImageUploader, NormalizeOptions};
use treefel_storage::Storage;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub storage: Arc<dyn Storage>,
    pub uploader: ImageUploader,
}

impl AppState {
    /// Build state around an already-constructed store. Normalization bounds
    /// and quality come from `config`.
    pub fn new(config: Config, storage: Arc<dyn Storage>) -> Self {
        let options = NormalizeOptions::new(config.image_max_dimension, config.image_quality);
        let uploader = ImageUploader::with_options(Arc::clone(&storage), options);
        Self {
            config,
            storage,
            uploader,
        }
    }
}
