use axum::{extract::State, Json};
use std::sync::Arc;

use crate::core::error::Result;
use crate::features::files::dtos::FileObjectDto;
use crate::features::files::services::ObjectCatalogService;
use crate::shared::types::ErrorResponse;

/// List objects in the bucket
#[utoipa::path(
    get,
    path = "/files",
    tag = "files",
    responses(
        (status = 200, description = "Objects currently in the bucket", body = Vec<FileObjectDto>),
        (status = 503, description = "Storage backend unavailable", body = ErrorResponse)
    )
)]
pub async fn list_files(
    State(service): State<Arc<ObjectCatalogService>>,
) -> Result<Json<Vec<FileObjectDto>>> {
    let objects = service.list_objects().await?;
    Ok(Json(objects.into_iter().map(FileObjectDto::from).collect()))
}
