use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BookId, BorrowId, ReservationId, UserId};

/// コマンド：蔵書を借りる
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowBook {
    pub user_id: UserId,
    pub book_id: BookId,
    pub borrowed_at: DateTime<Utc>,
}

/// コマンド：蔵書を返却する
///
/// `returned_by`は記録用。貸出者本人かどうかは検証しない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnBook {
    pub borrow_id: BorrowId,
    pub returned_by: UserId,
    pub returned_at: DateTime<Utc>,
}

/// コマンド：蔵書を予約する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveBook {
    pub user_id: UserId,
    pub book_id: BookId,
    pub reserved_at: DateTime<Utc>,
}

/// コマンド：予約を取り消す
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelReservation {
    pub user_id: UserId,
    pub reservation_id: ReservationId,
}

/// コマンド：蔵書を登録する（管理者）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddBook {
    pub title: String,
    pub author: String,
    pub category: String,
    pub isbn: String,
    pub description: String,
    pub copies: u32,
    pub cover_image: Option<String>,
    pub ebook: Option<String>,
    pub added_at: DateTime<Utc>,
}
