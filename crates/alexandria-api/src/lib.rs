// HTTP client for the books-metadata lookup API
pub mod google_books;

// Re-export common types
pub use google_books::{
    GoogleBooksClient, GoogleBooksError, ImageLinks, Volume, VolumeInfo, VolumesResponse,
};
