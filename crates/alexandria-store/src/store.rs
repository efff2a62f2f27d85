use std::path::Path;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// A cataloged (or previewed) book with its related rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    pub isbn: String,
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub cover_url: String,
    pub saved: bool,
    pub authors: Vec<String>,
    pub categories: Vec<String>,
}

/// Where an ISBN sits in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavedState {
    /// No row at all
    Absent,
    /// Preview row from a fetch that was never confirmed
    Cached,
    /// Confirmed catalog entry
    Saved,
}

/// Book store over SQLite
///
/// SQLite was chosen because:
/// - Zero-config embedded database
/// - Battle-tested and reliable
/// - Doesn't require a separate process
pub struct BookStore {
    conn: Connection,
}

impl BookStore {
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        Self::init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// In-memory store, used by tests
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self { conn })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS books (
                isbn TEXT PRIMARY KEY,
                title TEXT NOT NULL DEFAULT '',
                subtitle TEXT NOT NULL DEFAULT '',
                description TEXT NOT NULL DEFAULT '',
                cover_url TEXT NOT NULL DEFAULT '',
                saved INTEGER NOT NULL DEFAULT 0,
                cached_at INTEGER NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS authors (
                isbn TEXT NOT NULL,
                name TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS categories (
                isbn TEXT NOT NULL,
                label TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_authors_isbn ON authors(isbn)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_categories_isbn ON categories(isbn)",
            [],
        )?;

        Ok(())
    }

    /// Write a fetched book as an unsaved preview.
    ///
    /// An existing book row (saved or cached) is left untouched; the
    /// author/category rows are replaced wholesale so repeated previews of
    /// the same ISBN never accumulate duplicates. One transaction.
    pub fn upsert_preview(&mut self, record: &BookRecord) -> Result<()> {
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT OR IGNORE INTO books
                (isbn, title, subtitle, description, cover_url, saved, cached_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)",
            params![
                record.isbn,
                record.title,
                record.subtitle,
                record.description,
                record.cover_url,
                Utc::now().timestamp(),
            ],
        )?;

        replace_links(&tx, &record.isbn, &record.authors, &record.categories)?;

        tx.commit()?;
        debug!(isbn = %record.isbn, "preview stored");
        Ok(())
    }

    /// Lifecycle lookup used by the fetch short-circuit
    pub fn saved_state(&self, isbn: &str) -> Result<SavedState> {
        let saved: Option<i64> = self
            .conn
            .query_row(
                "SELECT saved FROM books WHERE isbn = ?1",
                params![isbn],
                |row| row.get(0),
            )
            .optional()?;

        Ok(match saved {
            None => SavedState::Absent,
            Some(0) => SavedState::Cached,
            Some(_) => SavedState::Saved,
        })
    }

    /// Full record with authors and categories, or None
    pub fn get(&self, isbn: &str) -> Result<Option<BookRecord>> {
        let book = self
            .conn
            .query_row(
                "SELECT isbn, title, subtitle, description, cover_url, saved
                 FROM books WHERE isbn = ?1",
                params![isbn],
                row_to_book,
            )
            .optional()?;

        match book {
            Some(mut record) => {
                record.authors = self.linked_values("authors", "name", isbn)?;
                record.categories = self.linked_values("categories", "label", isbn)?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Promote a preview to a confirmed catalog entry.
    /// Returns rows affected; 0 means the ISBN was never fetched.
    pub fn confirm(&self, isbn: &str) -> Result<usize> {
        let changed = self.conn.execute(
            "UPDATE books SET saved = 1 WHERE isbn = ?1",
            params![isbn],
        )?;
        Ok(changed)
    }

    /// Remove a book and its author/category rows.
    /// Returns the number of book rows removed; 0 means the ISBN was absent.
    pub fn delete(&mut self, isbn: &str) -> Result<usize> {
        let tx = self.conn.transaction()?;

        tx.execute("DELETE FROM authors WHERE isbn = ?1", params![isbn])?;
        tx.execute("DELETE FROM categories WHERE isbn = ?1", params![isbn])?;
        let deleted = tx.execute("DELETE FROM books WHERE isbn = ?1", params![isbn])?;

        tx.commit()?;
        Ok(deleted)
    }

    /// Purge every unsaved preview row, leaving saved rows untouched.
    /// Returns the number of book rows removed.
    pub fn sweep_unsaved(&mut self) -> Result<usize> {
        let tx = self.conn.transaction()?;

        tx.execute(
            "DELETE FROM authors
             WHERE isbn IN (SELECT isbn FROM books WHERE saved = 0)",
            [],
        )?;
        tx.execute(
            "DELETE FROM categories
             WHERE isbn IN (SELECT isbn FROM books WHERE saved = 0)",
            [],
        )?;
        let swept = tx.execute("DELETE FROM books WHERE saved = 0", [])?;

        tx.commit()?;
        if swept > 0 {
            debug!(swept, "unsaved previews purged");
        }
        Ok(swept)
    }

    /// All confirmed entries, in insertion order
    pub fn list_saved(&self) -> Result<Vec<BookRecord>> {
        self.saved_query(
            "SELECT isbn, title, subtitle, description, cover_url, saved
             FROM books WHERE saved = 1",
            params![],
        )
    }

    /// Confirmed entries whose title or subtitle contains the query,
    /// case-insensitive. An empty query behaves like `list_saved`.
    pub fn search_saved(&self, query: &str) -> Result<Vec<BookRecord>> {
        if query.is_empty() {
            return self.list_saved();
        }

        let pattern = format!("%{}%", query);
        self.saved_query(
            "SELECT isbn, title, subtitle, description, cover_url, saved
             FROM books WHERE saved = 1 AND (title LIKE ?1 OR subtitle LIKE ?1)",
            params![pattern],
        )
    }

    fn saved_query(
        &self,
        sql: &str,
        query_params: &[&dyn rusqlite::types::ToSql],
    ) -> Result<Vec<BookRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(query_params, row_to_book)?;

        let mut records = Vec::new();
        for row in rows {
            let mut record = row?;
            record.authors = self.linked_values("authors", "name", &record.isbn)?;
            record.categories = self.linked_values("categories", "label", &record.isbn)?;
            records.push(record);
        }
        Ok(records)
    }

    fn linked_values(&self, table: &str, column: &str, isbn: &str) -> Result<Vec<String>> {
        // table/column come from the two call sites above, never from input
        let sql = format!("SELECT {column} FROM {table} WHERE isbn = ?1 ORDER BY rowid");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![isbn], |row| row.get::<_, String>(0))?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }
}

fn row_to_book(row: &rusqlite::Row<'_>) -> rusqlite::Result<BookRecord> {
    Ok(BookRecord {
        isbn: row.get(0)?,
        title: row.get(1)?,
        subtitle: row.get(2)?,
        description: row.get(3)?,
        cover_url: row.get(4)?,
        saved: row.get::<_, i64>(5)? != 0,
        authors: Vec::new(),
        categories: Vec::new(),
    })
}

fn replace_links(
    tx: &Transaction<'_>,
    isbn: &str,
    authors: &[String],
    categories: &[String],
) -> rusqlite::Result<()> {
    tx.execute("DELETE FROM authors WHERE isbn = ?1", params![isbn])?;
    tx.execute("DELETE FROM categories WHERE isbn = ?1", params![isbn])?;

    let mut insert_author = tx.prepare("INSERT INTO authors (isbn, name) VALUES (?1, ?2)")?;
    for name in authors {
        insert_author.execute(params![isbn, name])?;
    }

    let mut insert_category =
        tx.prepare("INSERT INTO categories (isbn, label) VALUES (?1, ?2)")?;
    for label in categories {
        insert_category.execute(params![isbn, label])?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preview(isbn: &str, title: &str, subtitle: &str) -> BookRecord {
        BookRecord {
            isbn: isbn.to_string(),
            title: title.to_string(),
            subtitle: subtitle.to_string(),
            description: String::new(),
            cover_url: String::new(),
            saved: false,
            authors: vec!["Some Author".to_string()],
            categories: vec!["Fiction".to_string()],
        }
    }

    #[test]
    fn test_upsert_and_get_roundtrip() {
        let mut store = BookStore::open_in_memory().unwrap();
        let record = preview("9780141439518", "Pride and Prejudice", "A Novel");
        store.upsert_preview(&record).unwrap();

        let fetched = store.get("9780141439518").unwrap().unwrap();
        assert_eq!(fetched.title, "Pride and Prejudice");
        assert_eq!(fetched.subtitle, "A Novel");
        assert!(!fetched.saved);
        assert_eq!(fetched.authors, vec!["Some Author"]);
        assert_eq!(fetched.categories, vec!["Fiction"]);
    }

    #[test]
    fn test_saved_state_lifecycle() {
        let mut store = BookStore::open_in_memory().unwrap();
        let isbn = "9780141439518";

        assert_eq!(store.saved_state(isbn).unwrap(), SavedState::Absent);

        store.upsert_preview(&preview(isbn, "Title", "")).unwrap();
        assert_eq!(store.saved_state(isbn).unwrap(), SavedState::Cached);

        assert_eq!(store.confirm(isbn).unwrap(), 1);
        assert_eq!(store.saved_state(isbn).unwrap(), SavedState::Saved);

        assert_eq!(store.delete(isbn).unwrap(), 1);
        assert_eq!(store.saved_state(isbn).unwrap(), SavedState::Absent);
    }

    #[test]
    fn test_confirm_absent_is_noop() {
        let store = BookStore::open_in_memory().unwrap();
        assert_eq!(store.confirm("9999999999999").unwrap(), 0);
    }

    #[test]
    fn test_delete_absent_is_noop() {
        let mut store = BookStore::open_in_memory().unwrap();
        assert_eq!(store.delete("9999999999999").unwrap(), 0);
    }

    #[test]
    fn test_delete_removes_related_rows() {
        let mut store = BookStore::open_in_memory().unwrap();
        let isbn = "9780141439518";
        store.upsert_preview(&preview(isbn, "Title", "")).unwrap();
        store.delete(isbn).unwrap();

        let orphans: i64 = store
            .conn
            .query_row(
                "SELECT COUNT(*) FROM authors WHERE isbn = ?1",
                params![isbn],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[test]
    fn test_sweep_removes_only_unsaved_rows() {
        let mut store = BookStore::open_in_memory().unwrap();

        for i in 0..5 {
            let isbn = format!("978000000000{}", i);
            store.upsert_preview(&preview(&isbn, "Preview", "")).unwrap();
        }
        store
            .upsert_preview(&preview("9780141439518", "Keeper", ""))
            .unwrap();
        store.confirm("9780141439518").unwrap();

        assert_eq!(store.sweep_unsaved().unwrap(), 5);
        assert_eq!(
            store.saved_state("9780141439518").unwrap(),
            SavedState::Saved
        );
        assert_eq!(store.list_saved().unwrap().len(), 1);

        // Sweep with nothing to do
        assert_eq!(store.sweep_unsaved().unwrap(), 0);
    }

    #[test]
    fn test_refetch_replaces_links_without_duplicates() {
        let mut store = BookStore::open_in_memory().unwrap();
        let isbn = "9780141439518";

        store.upsert_preview(&preview(isbn, "Title", "")).unwrap();
        let mut refetched = preview(isbn, "Different Title", "");
        refetched.authors = vec!["Jane Austen".to_string()];
        store.upsert_preview(&refetched).unwrap();

        let record = store.get(isbn).unwrap().unwrap();
        // The book row keeps its original fields; links are replaced
        assert_eq!(record.title, "Title");
        assert_eq!(record.authors, vec!["Jane Austen"]);
    }

    #[test]
    fn test_list_saved_excludes_previews() {
        let mut store = BookStore::open_in_memory().unwrap();
        store
            .upsert_preview(&preview("9780000000001", "Unsaved", ""))
            .unwrap();
        store
            .upsert_preview(&preview("9780000000002", "Saved", ""))
            .unwrap();
        store.confirm("9780000000002").unwrap();

        let listed = store.list_saved().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "Saved");
    }

    #[test]
    fn test_search_matches_title_and_subtitle_case_insensitive() {
        let mut store = BookStore::open_in_memory().unwrap();
        store
            .upsert_preview(&preview("9780141439518", "Pride and Prejudice", "A Novel"))
            .unwrap();
        store.confirm("9780141439518").unwrap();

        assert_eq!(store.search_saved("pride").unwrap().len(), 1);
        assert_eq!(store.search_saved("PREJUDICE").unwrap().len(), 1);
        assert_eq!(store.search_saved("novel").unwrap().len(), 1);
        assert!(store.search_saved("zzz").unwrap().is_empty());
    }

    #[test]
    fn test_search_ignores_unsaved_matches() {
        let mut store = BookStore::open_in_memory().unwrap();
        store
            .upsert_preview(&preview("9780141439518", "Pride and Prejudice", ""))
            .unwrap();

        assert!(store.search_saved("pride").unwrap().is_empty());
    }

    #[test]
    fn test_empty_query_lists_all_saved() {
        let mut store = BookStore::open_in_memory().unwrap();
        store
            .upsert_preview(&preview("9780000000001", "One", ""))
            .unwrap();
        store
            .upsert_preview(&preview("9780000000002", "Two", ""))
            .unwrap();
        store.confirm("9780000000001").unwrap();
        store.confirm("9780000000002").unwrap();

        assert_eq!(store.search_saved("").unwrap().len(), 2);
    }
}
