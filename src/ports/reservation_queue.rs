use crate::domain::{BookId, ReservationId, UserId, reservation::Reservation};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 予約キューポート
///
/// 利用者と蔵書の組につき予約は1件まで。
#[async_trait]
pub trait ReservationQueue: Send + Sync {
    /// 同じ利用者・蔵書の予約がなければ登録する
    ///
    /// 登録した場合はtrue、既に予約があった場合はfalse。
    async fn insert_if_absent(&self, reservation: Reservation) -> Result<bool>;

    /// IDで予約を取得する
    async fn get_by_id(&self, reservation_id: ReservationId) -> Result<Option<Reservation>>;

    /// 予約を削除する
    ///
    /// 削除した場合はtrue、存在しなかった場合はfalse。
    async fn delete(&self, reservation_id: ReservationId) -> Result<bool>;

    /// 利用者の予約を予約日時順に取得する
    async fn find_by_user_id(&self, user_id: UserId) -> Result<Vec<Reservation>>;

    /// 蔵書に対する未充足の予約のうち最も古いものを取得する
    async fn next_unfulfilled_for_book(&self, book_id: BookId) -> Result<Option<Reservation>>;
}
