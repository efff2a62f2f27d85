// Core catalog logic lives here - the brain of the operation
pub mod catalog;
pub mod config;
pub mod error;
pub mod isbn;
pub mod models;
pub mod provider;
pub mod worker;

pub use catalog::Catalog;
pub use config::Config;
pub use error::Error;
pub use models::{BookMetadata, Notice};
pub use provider::{GoogleBooksProvider, MetadataProvider};
pub use worker::{spawn, CatalogHandle, Command};

// Re-export the store types the shell works with
pub use alexandria_store::{BookRecord, BookStore, SavedState};

/// Result type alias because typing Result<T, Error> everywhere is tedious
pub type Result<T> = std::result::Result<T, Error>;
