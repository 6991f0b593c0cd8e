use utoipa::{Modify, OpenApi};

use crate::features::files::{dtos as files_dtos, handlers as files_handlers};
use crate::features::links::{dtos as links_dtos, handlers as links_handlers};
use crate::shared::types::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        // Files
        files_handlers::list_files,
        // Links
        links_handlers::generate_signed_url,
        links_handlers::list_active_links,
        links_handlers::revoke_link,
        links_handlers::purge_links,
    ),
    components(
        schemas(
            // Shared
            ErrorResponse,
            // Files
            files_dtos::FileObjectDto,
            // Links
            links_dtos::GenerateSignedUrlDto,
            links_dtos::GeneratedLinkDto,
            links_dtos::ActiveLinkDto,
            links_dtos::RevokeLinkResponseDto,
            links_dtos::PurgeLinksResponseDto,
        )
    ),
    tags(
        (name = "files", description = "Objects available for sharing"),
        (name = "links", description = "Signed link issuance and the active link registry"),
    ),
    info(
        title = "Signed Link Manager API",
        version = "0.1.0",
        description = "Issue time-limited signed download links and track which are still active",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
