//! Signed link issuance and the active link registry.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/generate-signed-url` | Issue a signed link for an existing object |
//! | GET | `/active-links` | List links that have not yet expired |
//! | DELETE | `/active-links/{id}` | Revoke a link locally |
//! | POST | `/active-links/purge` | Drop expired and revoked records |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod stores;
pub mod workers;

pub use services::{LinkRegistry, LinkService, SignedUrlIssuer, UrlDigester};
pub use stores::{GrantStore, MemoryGrantStore, PgGrantStore};
pub use workers::PurgeWorker;
