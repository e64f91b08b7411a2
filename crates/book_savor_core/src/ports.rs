//! crates/book_savor_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of specific external implementations like databases.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{Book, ReadingLog, Recording, Sentence};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Repository Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait BookRepository: Send + Sync {
    async fn get(&self, id: Uuid) -> PortResult<Book>;

    async fn list(&self) -> PortResult<Vec<Book>>;

    async fn insert(&self, book: &Book) -> PortResult<()>;

    async fn update(&self, book: &Book) -> PortResult<()>;

    /// Deletes the book and everything it owns: its sentences, reading
    /// logs, and recordings (cascade-delete ownership).
    async fn delete(&self, id: Uuid) -> PortResult<()>;

    async fn delete_all(&self) -> PortResult<()>;
}

#[async_trait]
pub trait ReadingLogRepository: Send + Sync {
    /// Create-or-increment the log entry keyed by (book, date): if an entry
    /// exists its `pages_read` grows by `delta`, otherwise a new entry is
    /// created with `pages_read = delta`.
    async fn upsert_daily_delta(
        &self,
        book_id: Uuid,
        date: NaiveDate,
        delta: i32,
    ) -> PortResult<ReadingLog>;

    async fn list_all(&self) -> PortResult<Vec<ReadingLog>>;
}

#[async_trait]
pub trait SentenceRepository: Send + Sync {
    async fn insert(&self, sentence: &Sentence) -> PortResult<()>;

    async fn list(&self) -> PortResult<Vec<Sentence>>;

    async fn list_for_book(&self, book_id: Uuid) -> PortResult<Vec<Sentence>>;

    async fn delete(&self, id: Uuid) -> PortResult<()>;
}

#[async_trait]
pub trait RecordingRepository: Send + Sync {
    async fn insert(&self, recording: &Recording) -> PortResult<()>;

    async fn list(&self) -> PortResult<Vec<Recording>>;

    async fn delete(&self, id: Uuid) -> PortResult<()>;

    async fn delete_all(&self) -> PortResult<()>;
}
