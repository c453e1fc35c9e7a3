use axum::{
    Router,
    routing::{delete, get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, add_book, borrow_book, cancel_reservation, dashboard, delete_book, get_book,
    list_ebooks, list_user_borrows, list_user_reservations, report, reserve_book, return_book,
    search_books,
};

/// Creates the API router with all library endpoints
///
/// Catalog:
/// - GET /books, POST /books, GET /books/:id, DELETE /books/:id, GET /ebooks
///
/// Lending and reservations:
/// - POST /books/:id/borrow - Borrow a copy
/// - POST /borrows/:id/return - Return a borrowed copy
/// - POST /books/:id/reserve - Reserve a book
/// - DELETE /reservations/:id?user_id= - Cancel a reservation
///
/// Queries:
/// - GET /users/:id/dashboard, GET /users/:id/borrows, GET /users/:id/reservations
/// - GET /reports
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        // Catalog
        .route("/books", get(search_books).post(add_book))
        .route("/books/:id", get(get_book).delete(delete_book))
        .route("/ebooks", get(list_ebooks))
        // Lending
        .route("/books/:id/borrow", post(borrow_book))
        .route("/borrows/:id/return", post(return_book))
        // Reservations
        .route("/books/:id/reserve", post(reserve_book))
        .route("/reservations/:id", delete(cancel_reservation))
        // Queries
        .route("/users/:id/dashboard", get(dashboard))
        .route("/users/:id/borrows", get(list_user_borrows))
        .route("/users/:id/reservations", get(list_user_reservations))
        .route("/reports", get(report))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
