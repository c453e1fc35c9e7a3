use crate::application::ServiceDependencies;
use crate::application::catalog::{UNKNOWN_TITLE, resolve_titles};
use crate::domain::{
    self, BookId, UserId,
    commands::{CancelReservation, ReserveBook},
    reservation::Reservation,
};
use std::collections::HashSet;

use super::errors::{ReservationApplicationError, Result};

/// 利用者の予約一覧の1行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationSummary {
    pub reservation: Reservation,
    /// 蔵書が削除済みの場合は"Unknown"
    pub title: String,
}

/// 予約画面の蔵書1件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservableBook {
    pub book_id: BookId,
    pub title: String,
    /// この利用者が既に予約しているか
    pub reserved: bool,
}

/// 蔵書を予約する
///
/// ビジネスルール：
/// - 蔵書が存在すること
/// - 同じ利用者による同じ蔵書の予約は1件まで
/// - 貸出可能冊数に関係なく予約できる
pub async fn reserve_book(deps: &ServiceDependencies, cmd: ReserveBook) -> Result<Reservation> {
    // 1. 蔵書の存在確認
    let book = deps
        .catalog_store
        .get_by_id(cmd.book_id)
        .await
        .map_err(ReservationApplicationError::CatalogStoreError)?
        .ok_or(ReservationApplicationError::BookNotFound)?;

    // 2. ドメインロジック実行（純粋関数）
    let (reservation, event) =
        domain::reservation::reserve_book(cmd.user_id, cmd.book_id, cmd.reserved_at);

    // 3. 重複がなければ登録（判定と登録は原子的）
    let inserted = deps
        .reservation_queue
        .insert_if_absent(reservation.clone())
        .await
        .map_err(ReservationApplicationError::ReservationQueueError)?;

    if !inserted {
        return Err(ReservationApplicationError::AlreadyReserved);
    }

    tracing::info!(
        reservation_id = %event.reservation_id.value(),
        user_id = %event.user_id.value(),
        "Book reserved: {}",
        book.title
    );

    Ok(reservation)
}

/// 予約を取り消す
///
/// ビジネスルール：予約者本人のみ取り消せる。
/// 存在しない予約と他人の予約は同じエラーになる。
pub async fn cancel_reservation(deps: &ServiceDependencies, cmd: CancelReservation) -> Result<()> {
    // 1. 予約の取得
    let reservation = deps
        .reservation_queue
        .get_by_id(cmd.reservation_id)
        .await
        .map_err(ReservationApplicationError::ReservationQueueError)?
        .ok_or(ReservationApplicationError::ReservationNotFoundOrUnauthorized)?;

    // 2. ドメインロジック実行（純粋関数）
    let event = domain::reservation::cancel_reservation(&reservation, cmd.user_id)?;

    // 3. 削除
    let deleted = deps
        .reservation_queue
        .delete(event.reservation_id)
        .await
        .map_err(ReservationApplicationError::ReservationQueueError)?;

    if !deleted {
        return Err(ReservationApplicationError::ReservationNotFoundOrUnauthorized);
    }

    tracing::info!(
        reservation_id = %event.reservation_id.value(),
        user_id = %event.user_id.value(),
        "Reservation cancelled"
    );

    Ok(())
}

/// 利用者の予約を蔵書タイトル付きで取得する
pub async fn list_reservations_for_user(
    deps: &ServiceDependencies,
    user_id: UserId,
) -> Result<Vec<ReservationSummary>> {
    let reservations = deps
        .reservation_queue
        .find_by_user_id(user_id)
        .await
        .map_err(ReservationApplicationError::ReservationQueueError)?;

    let titles = resolve_titles(
        deps.catalog_store.as_ref(),
        reservations.iter().map(|r| r.book_id),
    )
    .await
    .map_err(ReservationApplicationError::CatalogStoreError)?;

    Ok(reservations
        .into_iter()
        .map(|reservation| {
            let title = titles
                .get(&reservation.book_id)
                .cloned()
                .unwrap_or_else(|| UNKNOWN_TITLE.to_string());
            ReservationSummary { reservation, title }
        })
        .collect())
}

/// 全蔵書と、利用者が予約済みかどうかを取得する
pub async fn reservable_books_for_user(
    deps: &ServiceDependencies,
    user_id: UserId,
) -> Result<Vec<ReservableBook>> {
    let books = deps
        .catalog_store
        .search(None)
        .await
        .map_err(ReservationApplicationError::CatalogStoreError)?;

    let reserved: HashSet<BookId> = deps
        .reservation_queue
        .find_by_user_id(user_id)
        .await
        .map_err(ReservationApplicationError::ReservationQueueError)?
        .into_iter()
        .map(|r| r.book_id)
        .collect();

    Ok(books
        .into_iter()
        .map(|book| ReservableBook {
            reserved: reserved.contains(&book.book_id),
            book_id: book.book_id,
            title: book.title,
        })
        .collect())
}
