use crate::domain::{BookId, Inventory, book::Book};
use async_trait::async_trait;
use std::collections::HashMap;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 条件付き貸出（在庫減算）の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// 1冊減算した。減算後の在庫を返す
    CheckedOut(Inventory),
    /// 貸出可能冊数が0のため減算しなかった
    Unavailable,
    /// 蔵書が存在しない
    NotFound,
}

/// カタログストアポート
///
/// 蔵書レコードと貸出可能冊数を保持する。
/// 在庫の増減は読み取り→判定→書き込みに分けず、必ず原子的な条件付き更新で行う。
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// 蔵書を登録する
    async fn insert(&self, book: Book) -> Result<()>;

    /// IDで蔵書を取得する
    async fn get_by_id(&self, book_id: BookId) -> Result<Option<Book>>;

    /// 複数の蔵書IDのタイトルを一度に取得する
    ///
    /// 存在しないIDは結果に含まれない。
    async fn titles_by_ids(&self, book_ids: &[BookId]) -> Result<HashMap<BookId, String>>;

    /// 蔵書を検索する
    ///
    /// `query`がNoneの場合は全件を返す。
    /// タイトル・著者・ISBN・分類に対する部分一致（大文字小文字を区別しない）。
    /// 登録順で返す。
    async fn search(&self, query: Option<&str>) -> Result<Vec<Book>>;

    /// 電子書籍が添付された蔵書を取得する
    async fn find_with_ebook(&self) -> Result<Vec<Book>>;

    /// 蔵書を削除する
    ///
    /// 削除した場合はtrue、存在しなかった場合はfalse。
    async fn delete(&self, book_id: BookId) -> Result<bool>;

    /// 登録されている蔵書数
    async fn count(&self) -> Result<u64>;

    /// 貸出可能冊数を1減らす（1冊以上ある場合のみ）
    ///
    /// 並行する貸出が同じ最後の1冊を取り合っても、成功するのは1件だけ。
    async fn try_checkout(&self, book_id: BookId) -> Result<CheckoutOutcome>;

    /// 貸出可能冊数を1増やす（所蔵冊数を上限とする）
    ///
    /// 蔵書が削除済みの場合はNoneを返す。
    async fn checkin(&self, book_id: BookId) -> Result<Option<Inventory>>;
}
