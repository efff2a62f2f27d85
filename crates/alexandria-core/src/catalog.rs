// The fetch/confirm/delete/sweep workflow over provider + store
use tracing::{debug, info, warn};

use alexandria_store::{BookRecord, BookStore, SavedState};

use crate::{
    models::{BookMetadata, Notice},
    provider::MetadataProvider,
    Error, Result,
};

/// The catalog: one metadata provider, one store, four operations.
///
/// Callers hand in normalized ISBN-13 strings (see [`crate::isbn`]).
/// Operations return the notice to surface, or None where the original
/// behavior is a silent no-op. Store failures are real errors and
/// propagate; lookup failures degrade to notices.
pub struct Catalog {
    provider: Box<dyn MetadataProvider>,
    store: BookStore,
}

impl Catalog {
    pub fn new(provider: Box<dyn MetadataProvider>, store: BookStore) -> Self {
        Self { provider, store }
    }

    /// Fetch metadata for an ISBN and stage it as an unsaved preview.
    ///
    /// At most one network lookup and one store mutation:
    /// - already saved: short-circuit, no network call
    /// - cached preview: lookup again for display, keep the book row,
    ///   replace its author/category rows
    /// - absent: lookup, stage book + authors + categories
    pub async fn fetch(&mut self, isbn: &str) -> Result<Notice> {
        let state = self.store.saved_state(isbn)?;
        if state == SavedState::Saved {
            debug!(isbn, "already saved, skipping lookup");
            return Ok(Notice::AlreadySaved);
        }

        let metadata = match self.provider.lookup(isbn).await {
            Ok(Some(metadata)) => metadata,
            Ok(None) => {
                info!(isbn, "no match from metadata provider");
                return Ok(Notice::NotFound);
            }
            Err(Error::NetworkUnavailable(reason)) => {
                warn!(isbn, %reason, "lookup skipped, no connectivity");
                return Ok(Notice::NetworkUnavailable);
            }
            Err(Error::ApiError(reason)) => {
                warn!(isbn, %reason, "lookup failed, treating as not found");
                return Ok(Notice::NotFound);
            }
            Err(e) => return Err(e),
        };

        self.store.upsert_preview(&staged_record(isbn, metadata))?;

        // Read back what is actually stored: a cached preview keeps its
        // original book fields even when the lookup returned fresh ones.
        match self.store.get(isbn)? {
            Some(record) => Ok(Notice::Fetched(record)),
            None => Ok(Notice::NotFound),
        }
    }

    /// Flip a preview to saved. Absent ISBN: silent no-op.
    pub fn confirm(&self, isbn: &str) -> Result<Option<Notice>> {
        let changed = self.store.confirm(isbn)?;
        if changed > 0 {
            info!(isbn, "book saved to catalog");
            Ok(Some(Notice::Saved))
        } else {
            debug!(isbn, "confirm matched no rows");
            Ok(None)
        }
    }

    /// Remove a book and its related rows. Absent ISBN: silent no-op.
    pub fn delete(&mut self, isbn: &str) -> Result<Option<Notice>> {
        let deleted = self.store.delete(isbn)?;
        if deleted > 0 {
            info!(isbn, "book deleted from catalog");
            Ok(Some(Notice::Deleted))
        } else {
            debug!(isbn, "delete matched no rows");
            Ok(None)
        }
    }

    /// Startup cleanup: purge every preview that was never confirmed.
    pub fn sweep(&mut self) -> Result<Notice> {
        let swept = self.store.sweep_unsaved()?;
        Ok(Notice::Swept(swept))
    }

    /// All confirmed entries
    pub fn list(&self) -> Result<Vec<BookRecord>> {
        self.store.list_saved().map_err(Into::into)
    }

    /// Confirmed entries matching a title/subtitle substring query
    pub fn search(&self, query: &str) -> Result<Vec<BookRecord>> {
        self.store.search_saved(query).map_err(Into::into)
    }
}

fn staged_record(isbn: &str, metadata: BookMetadata) -> BookRecord {
    BookRecord {
        isbn: isbn.to_string(),
        title: metadata.title,
        subtitle: metadata.subtitle,
        description: metadata.description,
        cover_url: metadata.cover_url,
        saved: false,
        authors: metadata.authors,
        categories: metadata.categories,
    }
}
