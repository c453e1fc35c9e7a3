use crate::application::ServiceDependencies;
use crate::application::catalog::resolve_titles;

use super::errors::{ReportsApplicationError, Result};

/// 人気蔵書レポートの件数
pub const TOP_BOOKS_LIMIT: usize = 10;

/// 図書館全体の統計
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LibraryStats {
    /// 登録されている蔵書数
    pub books: u64,
    /// 貸出中の件数
    pub active_borrows: u64,
}

/// 人気蔵書レポートの1行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopBorrowedBook {
    pub title: String,
    /// 返却済みを含む累計貸出回数
    pub count: u64,
}

/// 図書館全体の統計を取得する
pub async fn library_stats(deps: &ServiceDependencies) -> Result<LibraryStats> {
    let books = deps
        .catalog_store
        .count()
        .await
        .map_err(ReportsApplicationError::CatalogStoreError)?;

    let active_borrows = deps
        .lending_ledger
        .count_active()
        .await
        .map_err(ReportsApplicationError::LendingLedgerError)?;

    Ok(LibraryStats {
        books,
        active_borrows,
    })
}

/// 貸出回数の多い蔵書を取得する
///
/// ビジネスルール：
/// - 回数の降順、同数なら最初の貸出が早い蔵書が先
/// - カタログから削除された蔵書は含めない
/// - 最大`limit`件
pub async fn top_borrowed_books(
    deps: &ServiceDependencies,
    limit: usize,
) -> Result<Vec<TopBorrowedBook>> {
    let mut top = Vec::with_capacity(limit);
    let mut offset = 0;

    // 削除済みの蔵書を読み飛ばすため、limit件ずつ集計を取得して埋める
    while top.len() < limit {
        let page = deps
            .lending_ledger
            .top_borrowed_books(limit, offset)
            .await
            .map_err(ReportsApplicationError::LendingLedgerError)?;
        offset += page.len();

        let book_ids = page.iter().map(|c| c.book_id);
        let mut titles = resolve_titles(deps.catalog_store.as_ref(), book_ids)
            .await
            .map_err(ReportsApplicationError::CatalogStoreError)?;

        let exhausted = page.len() < limit;
        let remaining = limit - top.len();
        top.extend(
            page.into_iter()
                .filter_map(|entry| {
                    titles.remove(&entry.book_id).map(|title| TopBorrowedBook {
                        title,
                        count: entry.count,
                    })
                })
                .take(remaining),
        );

        if exhausted {
            break;
        }
    }

    Ok(top)
}
