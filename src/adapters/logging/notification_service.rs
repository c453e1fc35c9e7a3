use crate::domain::{BookReturned, reservation::Reservation};
use crate::ports::notification_service::{NotificationService as NotificationServiceTrait, Result};
use async_trait::async_trait;

/// ログ出力だけを行うNotificationService
///
/// 実際の配信先を持たないため、通知内容をtracingに流すだけで状態は保持しない。
#[derive(Debug, Default)]
pub struct NotificationService;

impl NotificationService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationServiceTrait for NotificationService {
    async fn notify_reservation_holder(
        &self,
        reservation: &Reservation,
        book_title: &str,
        returned: &BookReturned,
    ) -> Result<()> {
        tracing::info!(
            reservation_id = %reservation.reservation_id.value(),
            user_id = %reservation.user_id.value(),
            borrow_id = %returned.borrow_id.value(),
            "A copy of \"{}\" is back on the shelf",
            book_title
        );
        Ok(())
    }
}
