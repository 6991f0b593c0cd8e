//! Object catalog: what can be shared.
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/files` | List objects in the configured bucket |

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use services::ObjectCatalogService;
