//! crates/book_savor_core/src/progress.rs
//!
//! Incremental page-progress tracking. Every update clamps the requested
//! page and persists the book; only forward progress upserts the day's
//! reading-log entry.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::Book;
use crate::ports::{BookRepository, PortResult, ReadingLogRepository};

/// Applies page-progress updates against the book and reading-log
/// repositories.
pub struct ProgressTracker {
    books: Arc<dyn BookRepository>,
    logs: Arc<dyn ReadingLogRepository>,
}

impl ProgressTracker {
    pub fn new(books: Arc<dyn BookRepository>, logs: Arc<dyn ReadingLogRepository>) -> Self {
        Self { books, logs }
    }

    /// Moves a book to `requested_page` and logs the positive page delta
    /// under `today`.
    ///
    /// The requested page is clamped to `[0, total_pages]`; when the total
    /// is unknown (`total_pages == 0`) only the lower bound applies. A
    /// negative or zero delta updates the book but writes no log entry:
    /// corrections and rollbacks are not tracked as negative reading, so
    /// repeating the same target page is a no-op on the log.
    ///
    /// Returns the updated book together with the computed delta. Fails
    /// with [`PortError::NotFound`](crate::ports::PortError::NotFound) when
    /// the book id is unknown.
    pub async fn apply_progress(
        &self,
        book_id: Uuid,
        requested_page: i32,
        today: NaiveDate,
    ) -> PortResult<(Book, i32)> {
        let mut book = self.books.get(book_id).await?;

        let clamped = if book.total_pages > 0 {
            requested_page.clamp(0, book.total_pages)
        } else {
            requested_page.max(0)
        };
        let delta = clamped - book.current_page;

        book.current_page = clamped;
        book.updated_at = Utc::now();
        self.books.update(&book).await?;

        if delta > 0 {
            self.logs.upsert_daily_delta(book.id, today, delta).await?;
        }

        Ok((book, delta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ReadingLog;
    use crate::ports::PortError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct InMemoryBooks(Mutex<HashMap<Uuid, Book>>);

    impl InMemoryBooks {
        fn with(book: Book) -> Arc<Self> {
            let mut map = HashMap::new();
            map.insert(book.id, book);
            Arc::new(Self(Mutex::new(map)))
        }
    }

    #[async_trait]
    impl BookRepository for InMemoryBooks {
        async fn get(&self, id: Uuid) -> PortResult<Book> {
            self.0
                .lock()
                .unwrap()
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::NotFound(format!("Book {} not found", id)))
        }

        async fn list(&self) -> PortResult<Vec<Book>> {
            Ok(self.0.lock().unwrap().values().cloned().collect())
        }

        async fn insert(&self, book: &Book) -> PortResult<()> {
            self.0.lock().unwrap().insert(book.id, book.clone());
            Ok(())
        }

        async fn update(&self, book: &Book) -> PortResult<()> {
            self.0.lock().unwrap().insert(book.id, book.clone());
            Ok(())
        }

        async fn delete(&self, id: Uuid) -> PortResult<()> {
            self.0.lock().unwrap().remove(&id);
            Ok(())
        }

        async fn delete_all(&self) -> PortResult<()> {
            self.0.lock().unwrap().clear();
            Ok(())
        }
    }

    struct InMemoryLogs(Mutex<Vec<ReadingLog>>);

    impl InMemoryLogs {
        fn empty() -> Arc<Self> {
            Arc::new(Self(Mutex::new(Vec::new())))
        }
    }

    #[async_trait]
    impl ReadingLogRepository for InMemoryLogs {
        async fn upsert_daily_delta(
            &self,
            book_id: Uuid,
            date: NaiveDate,
            delta: i32,
        ) -> PortResult<ReadingLog> {
            let mut logs = self.0.lock().unwrap();
            if let Some(entry) = logs
                .iter_mut()
                .find(|l| l.book_id == book_id && l.date == date)
            {
                entry.pages_read += delta;
                return Ok(entry.clone());
            }
            let entry = ReadingLog {
                id: Uuid::new_v4(),
                book_id,
                date,
                pages_read: delta,
            };
            logs.push(entry.clone());
            Ok(entry)
        }

        async fn list_all(&self) -> PortResult<Vec<ReadingLog>> {
            Ok(self.0.lock().unwrap().clone())
        }
    }

    fn book_with_pages(total: i32, current: i32) -> Book {
        let mut book = Book::new("Book", "Author", total, None, None).unwrap();
        book.current_page = current;
        book
    }

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn tracker(books: Arc<InMemoryBooks>, logs: Arc<InMemoryLogs>) -> ProgressTracker {
        ProgressTracker::new(books, logs)
    }

    #[tokio::test]
    async fn forward_progress_updates_book_and_logs_delta() {
        let book = book_with_pages(300, 20);
        let id = book.id;
        let books = InMemoryBooks::with(book);
        let logs = InMemoryLogs::empty();
        let tracker = tracker(books.clone(), logs.clone());

        let (updated, delta) = tracker.apply_progress(id, 50, day("2024-06-03")).await.unwrap();

        assert_eq!(updated.current_page, 50);
        assert_eq!(delta, 30);
        let entries = logs.list_all().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].pages_read, 30);
        assert_eq!(entries[0].date, day("2024-06-03"));
    }

    #[tokio::test]
    async fn requested_page_is_clamped_to_total_pages() {
        let book = book_with_pages(300, 280);
        let id = book.id;
        let books = InMemoryBooks::with(book);
        let logs = InMemoryLogs::empty();
        let tracker = tracker(books.clone(), logs.clone());

        let (updated, delta) = tracker.apply_progress(id, 999, day("2024-06-03")).await.unwrap();

        assert_eq!(updated.current_page, 300);
        assert_eq!(delta, 20);
        assert!(updated.is_complete());
    }

    #[tokio::test]
    async fn negative_requested_page_clamps_to_zero() {
        let book = book_with_pages(300, 40);
        let id = book.id;
        let books = InMemoryBooks::with(book);
        let logs = InMemoryLogs::empty();
        let tracker = tracker(books.clone(), logs.clone());

        let (updated, delta) = tracker.apply_progress(id, -5, day("2024-06-03")).await.unwrap();

        assert_eq!(updated.current_page, 0);
        assert_eq!(delta, -40);
        assert!(logs.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_total_pages_accepts_any_page() {
        let book = book_with_pages(0, 0);
        let id = book.id;
        let books = InMemoryBooks::with(book);
        let logs = InMemoryLogs::empty();
        let tracker = tracker(books.clone(), logs.clone());

        let (updated, delta) = tracker.apply_progress(id, 512, day("2024-06-03")).await.unwrap();

        assert_eq!(updated.current_page, 512);
        assert_eq!(delta, 512);
    }

    #[tokio::test]
    async fn same_day_deltas_accumulate_in_one_entry() {
        let book = book_with_pages(300, 0);
        let id = book.id;
        let books = InMemoryBooks::with(book);
        let logs = InMemoryLogs::empty();
        let tracker = tracker(books.clone(), logs.clone());
        let today = day("2024-06-03");

        tracker.apply_progress(id, 10, today).await.unwrap();
        tracker.apply_progress(id, 25, today).await.unwrap();
        tracker.apply_progress(id, 40, today).await.unwrap();

        let entries = logs.list_all().await.unwrap();
        assert_eq!(entries.len(), 1);
        // Sum of positive deltas equals the stored total for the day.
        assert_eq!(entries[0].pages_read, 40);
    }

    #[tokio::test]
    async fn repeating_the_same_target_page_is_a_noop_on_the_log() {
        let book = book_with_pages(300, 0);
        let id = book.id;
        let books = InMemoryBooks::with(book);
        let logs = InMemoryLogs::empty();
        let tracker = tracker(books.clone(), logs.clone());
        let today = day("2024-06-03");

        tracker.apply_progress(id, 75, today).await.unwrap();
        let (_, delta) = tracker.apply_progress(id, 75, today).await.unwrap();

        assert_eq!(delta, 0);
        let entries = logs.list_all().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].pages_read, 75);
    }

    #[tokio::test]
    async fn rollback_writes_no_log_entry() {
        let book = book_with_pages(300, 0);
        let id = book.id;
        let books = InMemoryBooks::with(book);
        let logs = InMemoryLogs::empty();
        let tracker = tracker(books.clone(), logs.clone());
        let today = day("2024-06-03");

        tracker.apply_progress(id, 50, today).await.unwrap();
        let (updated, delta) = tracker.apply_progress(id, 30, today).await.unwrap();

        assert_eq!(updated.current_page, 30);
        assert_eq!(delta, -20);
        // The earlier entry is immutable history.
        let entries = logs.list_all().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].pages_read, 50);
    }

    #[tokio::test]
    async fn unknown_book_fails_with_not_found() {
        let books = InMemoryBooks::with(book_with_pages(300, 0));
        let logs = InMemoryLogs::empty();
        let tracker = tracker(books, logs);

        let err = tracker
            .apply_progress(Uuid::new_v4(), 10, day("2024-06-03"))
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }
}
