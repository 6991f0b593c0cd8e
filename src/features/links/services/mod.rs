mod link_registry;
mod link_service;
mod signed_url_issuer;
mod url_digest;

pub use link_registry::LinkRegistry;
pub use link_service::LinkService;
pub use signed_url_issuer::SignedUrlIssuer;
pub use url_digest::UrlDigester;
