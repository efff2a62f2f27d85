// Metadata provider seam - bridges the API client with the catalog
use async_trait::async_trait;

use alexandria_api::{GoogleBooksClient, VolumeInfo};

use crate::{models::BookMetadata, Error, Result};

/// Trait for book-metadata sources - makes testing easier and keeps
/// things flexible. The catalog never talks to the network directly.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Look up metadata for an ISBN-13. `Ok(None)` means the source has
    /// no record of that ISBN.
    async fn lookup(&self, isbn: &str) -> Result<Option<BookMetadata>>;
}

/// Google Books implementation of the provider seam
pub struct GoogleBooksProvider {
    client: GoogleBooksClient,
}

impl GoogleBooksProvider {
    pub fn new() -> Self {
        Self {
            client: GoogleBooksClient::new(),
        }
    }

    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: GoogleBooksClient::with_base_url(base_url),
        }
    }
}

impl Default for GoogleBooksProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetadataProvider for GoogleBooksProvider {
    async fn lookup(&self, isbn: &str) -> Result<Option<BookMetadata>> {
        let volume = self.client.lookup_isbn(isbn).await.map_err(|e| {
            if e.is_connectivity() {
                Error::NetworkUnavailable(e.to_string())
            } else {
                Error::ApiError(e.to_string())
            }
        })?;

        Ok(volume.map(|v| volume_to_metadata(v.volume_info)))
    }
}

/// Convert an API volume into our internal metadata model
fn volume_to_metadata(info: VolumeInfo) -> BookMetadata {
    BookMetadata {
        title: info.title.unwrap_or_default(),
        subtitle: info.subtitle.unwrap_or_default(),
        description: info.description.unwrap_or_default(),
        cover_url: info
            .image_links
            .and_then(|links| links.thumbnail)
            .unwrap_or_default(),
        authors: info.authors,
        categories: info.categories,
    }
}
