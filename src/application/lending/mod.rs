mod errors;
mod lending_service;

pub use errors::{LendingApplicationError, Result};
pub use lending_service::{
    BorrowSummary, ReturnOutcome, borrow_book, list_borrows_for_user, return_book,
};
