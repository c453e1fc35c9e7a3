use crate::domain::{
    BookId, BorrowId, UserId,
    borrow::{ActiveBorrow, Borrow, ReturnedBorrow},
};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 蔵書ごとの貸出回数（集計用）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorrowCount {
    pub book_id: BookId,
    pub count: u64,
}

/// 貸出台帳ポート
///
/// 貸出レコードは削除されず、返却時に一度だけ更新される。
#[async_trait]
pub trait LendingLedger: Send + Sync {
    /// 新しい貸出を記録する
    async fn insert(&self, borrow: ActiveBorrow) -> Result<()>;

    /// IDで貸出を取得する
    async fn get_by_id(&self, borrow_id: BorrowId) -> Result<Option<Borrow>>;

    /// 貸出を返却済みにする（貸出中の場合のみ）
    ///
    /// 更新した場合はtrue。既に返却済みまたは存在しない場合はfalse。
    /// 並行する二重返却のうち成功するのは1件だけ。
    async fn mark_returned(&self, returned: &ReturnedBorrow) -> Result<bool>;

    /// 返却を取り消して貸出中に戻す
    ///
    /// 返却後の在庫戻しに失敗した場合の補償処理。
    /// 記録されている返却日時が`returned`と一致する場合のみ戻す。
    /// 戻した場合はtrue。
    async fn reopen(&self, returned: &ReturnedBorrow) -> Result<bool>;

    /// 利用者の全貸出（返却済みを含む）を記録順に取得する
    async fn find_by_user_id(&self, user_id: UserId) -> Result<Vec<Borrow>>;

    /// 貸出中の件数
    async fn count_active(&self) -> Result<u64>;

    /// 貸出回数の多い蔵書を取得する
    ///
    /// 回数の降順。同数の場合は最初の貸出が早く記録された蔵書が先。
    /// 並び順の`offset`件目から最大`limit`件を返す。
    async fn top_borrowed_books(&self, limit: usize, offset: usize) -> Result<Vec<BorrowCount>>;
}
