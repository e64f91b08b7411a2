pub mod rest;
pub mod state;

// Re-export the handlers so the binary that builds the router can reach
// them without digging through submodules.
pub use rest::{
    create_book_handler, create_recording_handler, create_sentence_handler, delete_book_handler,
    delete_recording_handler, delete_sentence_handler, export_backup_handler, get_book_handler,
    import_backup_handler, list_books_handler, list_recordings_handler, list_sentences_handler,
    stats_handler, update_book_handler, update_progress_handler,
};
