mod errors;
mod reports_service;

pub use errors::{ReportsApplicationError, Result};
pub use reports_service::{
    LibraryStats, TOP_BOOKS_LIMIT, TopBorrowedBook, library_stats, top_borrowed_books,
};
