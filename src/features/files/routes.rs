use axum::{routing::get, Router};
use std::sync::Arc;

use crate::features::files::handlers::list_files;
use crate::features::files::services::ObjectCatalogService;

/// Create routes for the files feature
pub fn routes(catalog_service: Arc<ObjectCatalogService>) -> Router {
    Router::new()
        .route("/files", get(list_files))
        .with_state(catalog_service)
}
