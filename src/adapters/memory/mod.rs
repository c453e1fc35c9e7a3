//! インメモリアダプター
//!
//! DATABASE_URL未設定時の開発用ストアとテストで使用する。
//! 各ストアは単一のMutexで保護し、条件付き更新をロック内で完結させる。

pub mod catalog_store;
pub mod lending_ledger;
pub mod reservation_queue;

pub use catalog_store::CatalogStore;
pub use lending_ledger::LendingLedger;
pub use reservation_queue::ReservationQueue;

use std::sync::{Mutex, MutexGuard};

type StoreResult<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// ロックを取得する。ポイズンされたロックはストアエラーとして扱う
fn lock<T>(mutex: &Mutex<T>) -> StoreResult<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| "in-memory store lock poisoned".into())
}
