//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use book_savor_core::ports::{
    BookRepository, ReadingLogRepository, RecordingRepository, SentenceRepository,
};
use book_savor_core::progress::ProgressTracker;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub books: Arc<dyn BookRepository>,
    pub logs: Arc<dyn ReadingLogRepository>,
    pub sentences: Arc<dyn SentenceRepository>,
    pub recordings: Arc<dyn RecordingRepository>,
    pub config: Arc<Config>,
}

impl AppState {
    /// A progress tracker wired to the live repositories.
    pub fn progress_tracker(&self) -> ProgressTracker {
        ProgressTracker::new(self.books.clone(), self.logs.clone())
    }
}
