use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::links::dtos::{
    ActiveLinkDto, GenerateSignedUrlDto, GeneratedLinkDto, PurgeLinksResponseDto,
    RevokeLinkResponseDto,
};
use crate::features::links::services::LinkService;
use crate::shared::types::ErrorResponse;

/// Generate a signed download link
///
/// The signed URL appears in this response only. Afterwards the link is
/// listed by its digest.
#[utoipa::path(
    post,
    path = "/generate-signed-url",
    tag = "links",
    request_body = GenerateSignedUrlDto,
    responses(
        (status = 201, description = "Signed link issued", body = GeneratedLinkDto),
        (status = 400, description = "Invalid file name or expiration", body = ErrorResponse),
        (status = 404, description = "Object does not exist", body = ErrorResponse),
        (status = 503, description = "Storage backend unavailable", body = ErrorResponse),
        (status = 507, description = "Link could not be recorded", body = ErrorResponse)
    )
)]
pub async fn generate_signed_url(
    State(service): State<Arc<LinkService>>,
    AppJson(dto): AppJson<GenerateSignedUrlDto>,
) -> Result<(StatusCode, Json<GeneratedLinkDto>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let issued = service.generate_link(&dto.file_name, dto.expiration).await?;

    Ok((StatusCode::CREATED, Json(issued.into())))
}

/// List active links, newest first
#[utoipa::path(
    get,
    path = "/active-links",
    tag = "links",
    responses(
        (status = 200, description = "Currently active links", body = Vec<ActiveLinkDto>),
        (status = 500, description = "Registry read failed", body = ErrorResponse)
    )
)]
pub async fn list_active_links(
    State(service): State<Arc<LinkService>>,
) -> Result<Json<Vec<ActiveLinkDto>>> {
    let grants = service.list_active().await?;
    Ok(Json(grants.into_iter().map(ActiveLinkDto::from).collect()))
}

/// Revoke an active link
///
/// Removes the link from the registry. The URL itself keeps working at the
/// storage backend until it expires.
#[utoipa::path(
    delete,
    path = "/active-links/{id}",
    tag = "links",
    params(
        ("id" = Uuid, Path, description = "Grant id")
    ),
    responses(
        (status = 200, description = "Link revoked", body = RevokeLinkResponseDto),
        (status = 404, description = "No active link with this id", body = ErrorResponse)
    )
)]
pub async fn revoke_link(
    State(service): State<Arc<LinkService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<RevokeLinkResponseDto>> {
    if !service.revoke(id).await? {
        return Err(AppError::NotFound(format!("No active link with id {}", id)));
    }

    Ok(Json(RevokeLinkResponseDto {
        revoked: true,
        note: "The signed URL remains valid at the storage backend until it expires".to_string(),
    }))
}

/// Purge expired and revoked links
#[utoipa::path(
    post,
    path = "/active-links/purge",
    tag = "links",
    responses(
        (status = 200, description = "Purge completed", body = PurgeLinksResponseDto)
    )
)]
pub async fn purge_links(
    State(service): State<Arc<LinkService>>,
) -> Result<Json<PurgeLinksResponseDto>> {
    let removed = service.purge_expired().await?;
    Ok(Json(PurgeLinksResponseDto { removed }))
}
