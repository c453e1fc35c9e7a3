mod errors;
mod reservation_service;

pub use errors::{ReservationApplicationError, Result};
pub use reservation_service::{
    ReservableBook, ReservationSummary, cancel_reservation, list_reservations_for_user,
    reservable_books_for_user, reserve_book,
};
