use crate::ports::*;
use std::sync::Arc;

/// サービスの依存関係
///
/// 関数型DDDの原則に従い、データ構造として定義。
/// 振る舞い（メソッド）は持たず、純粋な関数に依存関係を渡す。
///
/// 各サービスはポート越しにのみストアへ触れる：
/// - 貸出サービス：カタログ、貸出台帳（返却時の通知のみ予約キューを参照）
/// - 予約サービス：予約キュー、カタログ（読み取りのみ）
#[derive(Clone)]
pub struct ServiceDependencies {
    pub catalog_store: Arc<dyn CatalogStore>,
    pub lending_ledger: Arc<dyn LendingLedger>,
    pub reservation_queue: Arc<dyn ReservationQueue>,
    pub notification_service: Arc<dyn NotificationService>,
}
