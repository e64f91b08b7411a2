//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use book_savor_core::backup::BackupData;
use book_savor_core::domain::{Book, Recording, Sentence};
use book_savor_core::ports::PortError;
use book_savor_core::stats::StatsAggregator;
use chrono::{Local, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        create_book_handler,
        update_progress_handler,
    ),
    components(
        schemas(CreateBookRequest, ProgressRequest, ProgressResponse)
    ),
    tags(
        (name = "Book Savor API", description = "API endpoints for the personal reading tracker.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Request and Response Structs
//=========================================================================================

/// The payload for adding a book to the library.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookRequest {
    pub title: String,
    #[serde(default)]
    pub author: String,
    /// 0 means the page count is unknown.
    #[serde(default)]
    pub total_pages: i32,
    pub cover_uri: Option<String>,
    pub isbn: Option<String>,
}

/// The payload for editing a book's details.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookRequest {
    pub title: String,
    pub author: String,
    pub total_pages: i32,
    pub cover_uri: Option<String>,
    pub isbn: Option<String>,
}

/// The payload for a page-progress update.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRequest {
    pub current_page: i32,
}

/// The result of a page-progress update.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    pub book_id: Uuid,
    pub current_page: i32,
    pub total_pages: i32,
    /// Pages added to today's reading log; 0 when the update was a no-op
    /// or a rollback.
    pub pages_logged: i32,
    pub progress_percent: i32,
    pub completed: bool,
}

/// The payload for saving a sentence from a book.
#[derive(Deserialize)]
pub struct CreateSentenceRequest {
    pub content: String,
    pub page: Option<i32>,
}

/// The payload for registering a narration recording.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecordingRequest {
    pub book_id: Option<Uuid>,
    pub sentence_id: Option<Uuid>,
    pub title: String,
    pub file_uri: String,
    #[serde(default)]
    pub duration_seconds: i64,
}

/// Per-collection row counts reported after a backup import.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub books: usize,
    pub sentences: usize,
    pub recordings: usize,
    pub reading_logs: usize,
}

/// Maps a port error onto an HTTP status, logging the unexpected ones.
fn port_error_response(action: &str, e: PortError) -> (StatusCode, String) {
    match e {
        PortError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        PortError::InvalidInput(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
        PortError::Unexpected(msg) => {
            error!("Failed to {}: {}", action, msg);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to {}", action),
            )
        }
    }
}

//=========================================================================================
// Book Handlers
//=========================================================================================

pub async fn list_books_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let books = app_state
        .books
        .list()
        .await
        .map_err(|e| port_error_response("list books", e))?;
    Ok(Json(books))
}

/// Add a book to the library.
#[utoipa::path(
    post,
    path = "/books",
    request_body = CreateBookRequest,
    responses(
        (status = 201, description = "Book created successfully"),
        (status = 422, description = "Invalid book data (e.g., negative page count)"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_book_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<CreateBookRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let book = Book::new(
        payload.title,
        payload.author,
        payload.total_pages,
        payload.cover_uri,
        payload.isbn,
    )
    .map_err(|e| port_error_response("create book", e))?;

    app_state
        .books
        .insert(&book)
        .await
        .map_err(|e| port_error_response("create book", e))?;
    Ok((StatusCode::CREATED, Json(book)))
}

pub async fn get_book_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let book = app_state
        .books
        .get(id)
        .await
        .map_err(|e| port_error_response("fetch book", e))?;
    Ok(Json(book))
}

pub async fn update_book_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBookRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if payload.total_pages < 0 {
        return Err(port_error_response(
            "update book",
            PortError::InvalidInput(format!(
                "total_pages must be non-negative, got {}",
                payload.total_pages
            )),
        ));
    }

    let mut book = app_state
        .books
        .get(id)
        .await
        .map_err(|e| port_error_response("update book", e))?;

    book.title = payload.title;
    book.author = payload.author;
    book.total_pages = payload.total_pages;
    book.cover_uri = payload.cover_uri;
    book.isbn = payload.isbn;
    // Shrinking the page count must not leave the bookmark past the end.
    if book.total_pages > 0 && book.current_page > book.total_pages {
        book.current_page = book.total_pages;
    }
    book.updated_at = Utc::now();

    app_state
        .books
        .update(&book)
        .await
        .map_err(|e| port_error_response("update book", e))?;
    Ok(Json(book))
}

pub async fn delete_book_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    app_state
        .books
        .delete(id)
        .await
        .map_err(|e| port_error_response("delete book", e))?;
    Ok(StatusCode::NO_CONTENT)
}

//=========================================================================================
// Progress and Stats Handlers
//=========================================================================================

/// Move a book's bookmark and log today's forward progress.
#[utoipa::path(
    post,
    path = "/books/{id}/progress",
    request_body = ProgressRequest,
    responses(
        (status = 200, description = "Progress applied", body = ProgressResponse),
        (status = 404, description = "Unknown book"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("id" = Uuid, Path, description = "The id of the book.")
    )
)]
pub async fn update_progress_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProgressRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let today = Local::now().date_naive();
    let (book, delta) = app_state
        .progress_tracker()
        .apply_progress(id, payload.current_page, today)
        .await
        .map_err(|e| port_error_response("update progress", e))?;

    Ok(Json(ProgressResponse {
        book_id: book.id,
        current_page: book.current_page,
        total_pages: book.total_pages,
        pages_logged: delta.max(0),
        progress_percent: book.progress_percent(),
        completed: book.is_complete(),
    }))
}

pub async fn stats_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let books = app_state
        .books
        .list()
        .await
        .map_err(|e| port_error_response("compute stats", e))?;
    let logs = app_state
        .logs
        .list_all()
        .await
        .map_err(|e| port_error_response("compute stats", e))?;
    let recordings = app_state
        .recordings
        .list()
        .await
        .map_err(|e| port_error_response("compute stats", e))?;

    let today = Local::now().date_naive();
    Ok(Json(StatsAggregator::recompute(
        &books,
        &logs,
        &recordings,
        today,
    )))
}

//=========================================================================================
// Sentence Handlers
//=========================================================================================

pub async fn list_sentences_handler(
    State(app_state): State<Arc<AppState>>,
    Path(book_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let sentences = app_state
        .sentences
        .list_for_book(book_id)
        .await
        .map_err(|e| port_error_response("list sentences", e))?;
    Ok(Json(sentences))
}

pub async fn create_sentence_handler(
    State(app_state): State<Arc<AppState>>,
    Path(book_id): Path<Uuid>,
    Json(payload): Json<CreateSentenceRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    // Fail with 404 before inserting when the book is gone.
    app_state
        .books
        .get(book_id)
        .await
        .map_err(|e| port_error_response("save sentence", e))?;

    let sentence = Sentence::new(book_id, payload.content, payload.page);
    app_state
        .sentences
        .insert(&sentence)
        .await
        .map_err(|e| port_error_response("save sentence", e))?;
    Ok((StatusCode::CREATED, Json(sentence)))
}

pub async fn delete_sentence_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    app_state
        .sentences
        .delete(id)
        .await
        .map_err(|e| port_error_response("delete sentence", e))?;
    Ok(StatusCode::NO_CONTENT)
}

//=========================================================================================
// Recording Handlers
//=========================================================================================

pub async fn list_recordings_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let recordings = app_state
        .recordings
        .list()
        .await
        .map_err(|e| port_error_response("list recordings", e))?;
    Ok(Json(recordings))
}

pub async fn create_recording_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<CreateRecordingRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if payload.duration_seconds < 0 {
        return Err(port_error_response(
            "save recording",
            PortError::InvalidInput("duration_seconds must be non-negative".to_string()),
        ));
    }

    let recording = Recording {
        id: Uuid::new_v4(),
        book_id: payload.book_id,
        sentence_id: payload.sentence_id,
        title: payload.title,
        file_uri: payload.file_uri,
        duration_seconds: payload.duration_seconds,
        created_at: Utc::now(),
    };
    app_state
        .recordings
        .insert(&recording)
        .await
        .map_err(|e| port_error_response("save recording", e))?;
    Ok((StatusCode::CREATED, Json(recording)))
}

pub async fn delete_recording_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    app_state
        .recordings
        .delete(id)
        .await
        .map_err(|e| port_error_response("delete recording", e))?;
    Ok(StatusCode::NO_CONTENT)
}

//=========================================================================================
// Backup Handlers
//=========================================================================================

pub async fn export_backup_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let books = app_state
        .books
        .list()
        .await
        .map_err(|e| port_error_response("export backup", e))?;
    let sentences = app_state
        .sentences
        .list()
        .await
        .map_err(|e| port_error_response("export backup", e))?;
    let recordings = app_state
        .recordings
        .list()
        .await
        .map_err(|e| port_error_response("export backup", e))?;
    let logs = app_state
        .logs
        .list_all()
        .await
        .map_err(|e| port_error_response("export backup", e))?;

    Ok(Json(BackupData::from_catalog(
        books, sentences, recordings, logs,
    )))
}

/// Replaces the whole catalog with the contents of a backup file.
///
/// Rows that cannot be restored (malformed log dates, dangling foreign
/// keys) are skipped rather than failing the import; the summary reports
/// how many rows of each collection made it in.
pub async fn import_backup_handler(
    State(app_state): State<Arc<AppState>>,
    Json(backup): Json<BackupData>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    // Books cascade to their sentences, logs, and owned recordings;
    // standalone recordings need their own sweep.
    app_state
        .books
        .delete_all()
        .await
        .map_err(|e| port_error_response("import backup", e))?;
    app_state
        .recordings
        .delete_all()
        .await
        .map_err(|e| port_error_response("import backup", e))?;

    let mut summary = ImportSummary {
        books: 0,
        sentences: 0,
        recordings: 0,
        reading_logs: 0,
    };

    for mut book in backup.books.iter().cloned() {
        if book.total_pages < 0 {
            continue;
        }
        book.current_page = if book.total_pages > 0 {
            book.current_page.clamp(0, book.total_pages)
        } else {
            book.current_page.max(0)
        };
        if app_state.books.insert(&book).await.is_ok() {
            summary.books += 1;
        }
    }

    for sentence in &backup.sentences {
        if app_state.sentences.insert(sentence).await.is_ok() {
            summary.sentences += 1;
        }
    }

    for recording in &backup.recordings {
        if app_state.recordings.insert(recording).await.is_ok() {
            summary.recordings += 1;
        }
    }

    for log in backup.valid_reading_logs() {
        let upserted = app_state
            .logs
            .upsert_daily_delta(log.book_id, log.date, log.pages_read)
            .await;
        if upserted.is_ok() {
            summary.reading_logs += 1;
        }
    }

    Ok(Json(summary))
}
