//! crates/book_savor_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or web framework; serde
//! derives exist only because the backup record shape (camelCase JSON) is a
//! boundary contract shared with the mobile client.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ports::{PortError, PortResult};

/// A book in the user's library.
///
/// `total_pages == 0` means the page count is unknown; progress is then
/// indeterminate and reported as 0%.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub total_pages: i32,
    pub current_page: i32,
    pub cover_uri: Option<String>,
    pub isbn: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// Creates a new book with a fresh id and zero progress.
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        total_pages: i32,
        cover_uri: Option<String>,
        isbn: Option<String>,
    ) -> PortResult<Self> {
        if total_pages < 0 {
            return Err(PortError::InvalidInput(format!(
                "total_pages must be non-negative, got {}",
                total_pages
            )));
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            title: title.into(),
            author: author.into(),
            total_pages,
            current_page: 0,
            cover_uri,
            isbn,
            created_at: now,
            updated_at: now,
        })
    }

    /// A book is complete once the current page reaches a known total.
    pub fn is_complete(&self) -> bool {
        self.total_pages > 0 && self.current_page >= self.total_pages
    }

    /// Reading progress as a whole percentage, clamped to 100.
    /// Unknown page counts report 0.
    pub fn progress_percent(&self) -> i32 {
        if self.total_pages <= 0 {
            return 0;
        }
        let pct = (f64::from(self.current_page) / f64::from(self.total_pages) * 100.0).round();
        (pct as i32).min(100)
    }
}

/// A sentence the user saved from a book.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sentence {
    pub id: Uuid,
    pub book_id: Uuid,
    pub content: String,
    pub page: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl Sentence {
    pub fn new(book_id: Uuid, content: impl Into<String>, page: Option<i32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            book_id,
            content: content.into(),
            page,
            created_at: Utc::now(),
        }
    }
}

/// A short audio narration, optionally tied to a book and/or a sentence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recording {
    pub id: Uuid,
    pub book_id: Option<Uuid>,
    pub sentence_id: Option<Uuid>,
    pub title: String,
    pub file_uri: String,
    pub duration_seconds: i64,
    pub created_at: DateTime<Utc>,
}

/// One day's reading for one book.
///
/// At most one entry exists per (book, date) pair; same-day progress updates
/// increment `pages_read` rather than replacing it. Entries are append-only
/// history and are never decremented.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingLog {
    pub id: Uuid,
    pub book_id: Uuid,
    pub date: NaiveDate,
    pub pages_read: i32,
}

/// The derived statistics snapshot shown on the home screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_books: u32,
    pub completed_books: u32,
    pub total_pages_this_month: i64,
    pub total_recording_duration: i64,
    pub streak_days: u32,
    pub monthly_pages: Vec<MonthlyPages>,
}

/// Pages read in one calendar month, keyed as `YYYY-MM`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPages {
    pub month: String,
    pub pages: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_book_rejects_negative_total_pages() {
        let err = Book::new("T", "A", -1, None, None).unwrap_err();
        assert!(matches!(err, PortError::InvalidInput(_)));
    }

    #[test]
    fn progress_percent_rounds_and_clamps() {
        let mut book = Book::new("T", "A", 300, None, None).unwrap();
        book.current_page = 100;
        assert_eq!(book.progress_percent(), 33);
        book.current_page = 200;
        assert_eq!(book.progress_percent(), 67);
        book.current_page = 300;
        assert_eq!(book.progress_percent(), 100);
    }

    #[test]
    fn unknown_total_pages_reports_zero_progress_and_never_completes() {
        let mut book = Book::new("T", "A", 0, None, None).unwrap();
        book.current_page = 42;
        assert_eq!(book.progress_percent(), 0);
        assert!(!book.is_complete());
    }

    #[test]
    fn completion_requires_reaching_a_known_total() {
        let mut book = Book::new("T", "A", 120, None, None).unwrap();
        book.current_page = 119;
        assert!(!book.is_complete());
        book.current_page = 120;
        assert!(book.is_complete());
    }
}
