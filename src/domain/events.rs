use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BookId, BorrowId, Fine, ReservationId, UserId};

/// イベント：蔵書が貸し出された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookBorrowed {
    pub borrow_id: BorrowId,
    pub book_id: BookId,
    pub user_id: UserId,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
}

/// イベント：蔵書が返却された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookReturned {
    pub borrow_id: BorrowId,
    pub book_id: BookId,
    pub user_id: UserId,
    pub returned_date: DateTime<Utc>,
    pub days_late: i64,
    /// 期限超過時のみ設定される
    pub fine: Option<Fine>,
}

impl BookReturned {
    pub fn was_overdue(&self) -> bool {
        self.fine.is_some()
    }
}

/// イベント：蔵書が予約された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookReserved {
    pub reservation_id: ReservationId,
    pub book_id: BookId,
    pub user_id: UserId,
    pub date: DateTime<Utc>,
}

/// イベント：予約が取り消された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationCancelled {
    pub reservation_id: ReservationId,
    pub book_id: BookId,
    pub user_id: UserId,
}
