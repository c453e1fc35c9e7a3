use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    BookId, BookReserved, CancelReservationError, ReservationCancelled, ReservationId, UserId,
};

/// Reservation集約 - 利用者の蔵書に対する予約
///
/// 現在の貸出可能冊数とは独立して記録される。
/// 返却時に自動で充足されることはなく、`fulfilled`は常にfalseのまま作成される。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub reservation_id: ReservationId,
    pub user_id: UserId,
    pub book_id: BookId,
    pub date: DateTime<Utc>,
    pub fulfilled: bool,
}

impl Reservation {
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }
}

/// 純粋関数：蔵書を予約する
///
/// 重複予約の判定は予約キューが原子的に行う。
pub fn reserve_book(
    user_id: UserId,
    book_id: BookId,
    reserved_at: DateTime<Utc>,
) -> (Reservation, BookReserved) {
    let reservation = Reservation {
        reservation_id: ReservationId::new(),
        user_id,
        book_id,
        date: reserved_at,
        fulfilled: false,
    };

    let event = BookReserved {
        reservation_id: reservation.reservation_id,
        book_id,
        user_id,
        date: reserved_at,
    };

    (reservation, event)
}

/// 純粋関数：予約を取り消す
///
/// ビジネスルール：予約者本人のみ取り消せる。
pub fn cancel_reservation(
    reservation: &Reservation,
    user_id: UserId,
) -> Result<ReservationCancelled, CancelReservationError> {
    if !reservation.is_owned_by(user_id) {
        return Err(CancelReservationError::NotOwner);
    }

    Ok(ReservationCancelled {
        reservation_id: reservation.reservation_id,
        book_id: reservation.book_id,
        user_id,
    })
}
