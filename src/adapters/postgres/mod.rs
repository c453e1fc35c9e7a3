pub mod catalog_store;
pub mod lending_ledger;
pub mod reservation_queue;

// パブリックに型を再エクスポート
pub use catalog_store::CatalogStore as PostgresCatalogStore;
pub use lending_ledger::LendingLedger as PostgresLendingLedger;
pub use reservation_queue::ReservationQueue as PostgresReservationQueue;
