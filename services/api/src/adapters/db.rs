//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete
//! implementation of the repository ports from the `core` crate. It handles
//! all interactions with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use book_savor_core::domain::{Book, ReadingLog, Recording, Sentence};
use book_savor_core::ports::{
    BookRepository, PortError, PortResult, ReadingLogRepository, RecordingRepository,
    SentenceRepository,
};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the repository ports.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct BookRecord {
    id: Uuid,
    title: String,
    author: String,
    total_pages: i32,
    current_page: i32,
    cover_uri: Option<String>,
    isbn: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl BookRecord {
    fn to_domain(self) -> Book {
        Book {
            id: self.id,
            title: self.title,
            author: self.author,
            total_pages: self.total_pages,
            current_page: self.current_page,
            cover_uri: self.cover_uri,
            isbn: self.isbn,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct SentenceRecord {
    id: Uuid,
    book_id: Uuid,
    content: String,
    page: Option<i32>,
    created_at: DateTime<Utc>,
}
impl SentenceRecord {
    fn to_domain(self) -> Sentence {
        Sentence {
            id: self.id,
            book_id: self.book_id,
            content: self.content,
            page: self.page,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct RecordingRecord {
    id: Uuid,
    book_id: Option<Uuid>,
    sentence_id: Option<Uuid>,
    title: String,
    file_uri: String,
    duration_seconds: i64,
    created_at: DateTime<Utc>,
}
impl RecordingRecord {
    fn to_domain(self) -> Recording {
        Recording {
            id: self.id,
            book_id: self.book_id,
            sentence_id: self.sentence_id,
            title: self.title,
            file_uri: self.file_uri,
            duration_seconds: self.duration_seconds,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct ReadingLogRecord {
    id: Uuid,
    book_id: Uuid,
    date: NaiveDate,
    pages_read: i32,
}
impl ReadingLogRecord {
    fn to_domain(self) -> ReadingLog {
        ReadingLog {
            id: self.id,
            book_id: self.book_id,
            date: self.date,
            pages_read: self.pages_read,
        }
    }
}

//=========================================================================================
// `BookRepository` Trait Implementation
//=========================================================================================

#[async_trait]
impl BookRepository for DbAdapter {
    async fn get(&self, id: Uuid) -> PortResult<Book> {
        let record = sqlx::query_as::<_, BookRecord>(
            "SELECT id, title, author, total_pages, current_page, cover_uri, isbn, created_at, updated_at \
             FROM books WHERE id = $1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("Book {} not found", id)),
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn list(&self) -> PortResult<Vec<Book>> {
        let records = sqlx::query_as::<_, BookRecord>(
            "SELECT id, title, author, total_pages, current_page, cover_uri, isbn, created_at, updated_at \
             FROM books ORDER BY updated_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn insert(&self, book: &Book) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO books (id, title, author, total_pages, current_page, cover_uri, isbn, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(book.id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.total_pages)
        .bind(book.current_page)
        .bind(&book.cover_uri)
        .bind(&book.isbn)
        .bind(book.created_at)
        .bind(book.updated_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn update(&self, book: &Book) -> PortResult<()> {
        let result = sqlx::query(
            "UPDATE books SET title = $2, author = $3, total_pages = $4, current_page = $5, \
             cover_uri = $6, isbn = $7, updated_at = $8 WHERE id = $1",
        )
        .bind(book.id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.total_pages)
        .bind(book.current_page)
        .bind(&book.cover_uri)
        .bind(&book.isbn)
        .bind(book.updated_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Book {} not found", book.id)));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> PortResult<()> {
        // Sentences, reading logs, and recordings go with the book via
        // ON DELETE CASCADE in the schema.
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Book {} not found", id)));
        }
        Ok(())
    }

    async fn delete_all(&self) -> PortResult<()> {
        sqlx::query("DELETE FROM books")
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }
}

//=========================================================================================
// `ReadingLogRepository` Trait Implementation
//=========================================================================================

#[async_trait]
impl ReadingLogRepository for DbAdapter {
    async fn upsert_daily_delta(
        &self,
        book_id: Uuid,
        date: NaiveDate,
        delta: i32,
    ) -> PortResult<ReadingLog> {
        // A single atomic statement, so two same-day updates racing each
        // other cannot lose a delta.
        let record = sqlx::query_as::<_, ReadingLogRecord>(
            "INSERT INTO reading_logs (id, book_id, date, pages_read) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (book_id, date) \
             DO UPDATE SET pages_read = reading_logs.pages_read + EXCLUDED.pages_read \
             RETURNING id, book_id, date, pages_read",
        )
        .bind(Uuid::new_v4())
        .bind(book_id)
        .bind(date)
        .bind(delta)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn list_all(&self) -> PortResult<Vec<ReadingLog>> {
        let records = sqlx::query_as::<_, ReadingLogRecord>(
            "SELECT id, book_id, date, pages_read FROM reading_logs ORDER BY date DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }
}

//=========================================================================================
// `SentenceRepository` Trait Implementation
//=========================================================================================

#[async_trait]
impl SentenceRepository for DbAdapter {
    async fn insert(&self, sentence: &Sentence) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO sentences (id, book_id, content, page, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(sentence.id)
        .bind(sentence.book_id)
        .bind(&sentence.content)
        .bind(sentence.page)
        .bind(sentence.created_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn list(&self) -> PortResult<Vec<Sentence>> {
        let records = sqlx::query_as::<_, SentenceRecord>(
            "SELECT id, book_id, content, page, created_at FROM sentences ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn list_for_book(&self, book_id: Uuid) -> PortResult<Vec<Sentence>> {
        let records = sqlx::query_as::<_, SentenceRecord>(
            "SELECT id, book_id, content, page, created_at FROM sentences \
             WHERE book_id = $1 ORDER BY created_at DESC",
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn delete(&self, id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM sentences WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Sentence {} not found", id)));
        }
        Ok(())
    }
}

//=========================================================================================
// `RecordingRepository` Trait Implementation
//=========================================================================================

#[async_trait]
impl RecordingRepository for DbAdapter {
    async fn insert(&self, recording: &Recording) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO recordings (id, book_id, sentence_id, title, file_uri, duration_seconds, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(recording.id)
        .bind(recording.book_id)
        .bind(recording.sentence_id)
        .bind(&recording.title)
        .bind(&recording.file_uri)
        .bind(recording.duration_seconds)
        .bind(recording.created_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn list(&self) -> PortResult<Vec<Recording>> {
        let records = sqlx::query_as::<_, RecordingRecord>(
            "SELECT id, book_id, sentence_id, title, file_uri, duration_seconds, created_at \
             FROM recordings ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn delete(&self, id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM recordings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Recording {} not found", id)));
        }
        Ok(())
    }

    async fn delete_all(&self) -> PortResult<()> {
        sqlx::query("DELETE FROM recordings")
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }
}
