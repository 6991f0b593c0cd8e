pub mod files;
pub mod links;
