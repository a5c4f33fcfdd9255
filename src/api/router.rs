use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, add_digital_book, add_paper_book, advance_clock, borrow_book, get_availability,
    get_queue_position, list_books, postpone_due_date, register_member, request_book,
    return_book,
};

/// Creates the API router
///
/// Catalog:
/// - POST /books/paper, POST /books/digital - Register a book
/// - GET /books - List books (`?author=` searches author names)
/// - GET /books/:isbn/availability - Copy counts and queue length
///
/// Members:
/// - POST /members - Register a member
///
/// Lending:
/// - POST /lending/request, /lending/borrow, /lending/return, /lending/postpone
/// - GET /lending/queue/:isbn/:member_id - Queue position
///
/// Clock:
/// - POST /clock/advance - Advance the logical clock and reconcile
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        // Catalog
        .route("/books", get(list_books))
        .route("/books/paper", post(add_paper_book))
        .route("/books/digital", post(add_digital_book))
        .route("/books/:isbn/availability", get(get_availability))
        // Members
        .route("/members", post(register_member))
        // Lending
        .route("/lending/request", post(request_book))
        .route("/lending/borrow", post(borrow_book))
        .route("/lending/return", post(return_book))
        .route("/lending/postpone", post(postpone_due_date))
        .route("/lending/queue/:isbn/:member_id", get(get_queue_position))
        // Logical clock
        .route("/clock/advance", post(advance_clock))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
