pub mod catalog_store;
pub mod lending_ledger;
pub mod notification_service;
pub mod reservation_queue;

pub use catalog_store::{CatalogStore, CheckoutOutcome};
pub use lending_ledger::{BorrowCount, LendingLedger};
pub use notification_service::NotificationService;
pub use reservation_queue::ReservationQueue;
