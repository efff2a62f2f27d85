// SQLite-backed persistence for the book catalog
// Books, their authors and categories, keyed by ISBN-13

pub mod store;

pub use store::{BookRecord, BookStore, SavedState, StoreError};
