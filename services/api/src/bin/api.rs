//! services/api/src/bin/api.rs

use api_lib::{
    adapters::db::DbAdapter,
    config::Config,
    error::ApiError,
    web::{
        create_book_handler, create_recording_handler, create_sentence_handler,
        delete_book_handler, delete_recording_handler, delete_sentence_handler,
        export_backup_handler, get_book_handler, import_backup_handler, list_books_handler,
        list_recordings_handler, list_sentences_handler, stats_handler, state::AppState,
        update_book_handler, update_progress_handler,
    },
};
use axum::{
    routing::{delete, get, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Build the Shared AppState ---
    // The one adapter backs all four repository ports.
    let app_state = Arc::new(AppState {
        books: db_adapter.clone(),
        logs: db_adapter.clone(),
        sentences: db_adapter.clone(),
        recordings: db_adapter.clone(),
        config: config.clone(),
    });

    // The mobile client calls from a device, not a fixed origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // --- 4. Create the Web Router ---
    let app = Router::new()
        .route("/books", get(list_books_handler).post(create_book_handler))
        .route(
            "/books/{id}",
            get(get_book_handler)
                .put(update_book_handler)
                .delete(delete_book_handler),
        )
        .route("/books/{id}/progress", post(update_progress_handler))
        .route(
            "/books/{id}/sentences",
            get(list_sentences_handler).post(create_sentence_handler),
        )
        .route("/sentences/{id}", delete(delete_sentence_handler))
        .route(
            "/recordings",
            get(list_recordings_handler).post(create_recording_handler),
        )
        .route("/recordings/{id}", delete(delete_recording_handler))
        .route("/stats", get(stats_handler))
        .route(
            "/backup",
            get(export_backup_handler).post(import_backup_handler),
        )
        .layer(cors)
        .with_state(app_state);

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
