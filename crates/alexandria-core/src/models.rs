use alexandria_store::BookRecord;
use serde::{Deserialize, Serialize};

/// What a metadata provider knows about a book. Optional API fields are
/// already flattened to empty strings here - a missing subtitle never
/// fails a fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookMetadata {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub cover_url: String,
    pub authors: Vec<String>,
    pub categories: Vec<String>,
}

/// One-way result notification, the toast-message equivalent.
///
/// Catalog operations are fire-and-forget; the shell subscribes to these
/// instead of awaiting return values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Fetch succeeded; carries the stored preview for display
    Fetched(BookRecord),
    /// Fetch short-circuited: the book is already in the catalog
    AlreadySaved,
    /// A preview was confirmed into the catalog
    Saved,
    /// A book was removed from the catalog
    Deleted,
    /// The API had no match, or the response was unusable
    NotFound,
    /// The lookup request never reached the API
    NetworkUnavailable,
    /// Input did not normalize to an ISBN-13
    InvalidIsbn,
    /// Startup sweep finished; carries the number of purged previews
    Swept(usize),
}
