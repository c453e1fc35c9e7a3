use crate::domain::{BookReturned, reservation::Reservation};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 通知サービスポート
///
/// 利用者への通知配信メカニズムを抽象化する。
/// 実装はメール、SMS、プッシュ通知などが考えられる。
#[async_trait]
pub trait NotificationService: Send + Sync {
    /// 返却された蔵書の次の予約者に通知する
    ///
    /// 返却成功後に呼ばれる。予約自体は充足済みにしない（職員の手作業）。
    async fn notify_reservation_holder(
        &self,
        reservation: &Reservation,
        book_title: &str,
        returned: &BookReturned,
    ) -> Result<()>;
}
