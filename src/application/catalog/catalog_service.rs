use crate::application::ServiceDependencies;
use crate::domain::{self, BookId, book::Book, commands::AddBook};
use crate::ports::CatalogStore;
use chrono::Utc;
use std::collections::{HashMap, HashSet};

use super::errors::{CatalogApplicationError, Result};

/// 蔵書が削除済みの場合に表示するタイトル
pub const UNKNOWN_TITLE: &str = "Unknown";

/// 登録できるISBNの最大長
const MAX_ISBN_LEN: usize = 32;

/// 初期データの冊数
const SAMPLE_BOOK_COPIES: u32 = 3;

/// 蔵書IDからタイトルを引く
///
/// 貸出・予約一覧とレポートで共通利用される。削除済みの蔵書は結果に含まれない。
/// 重複を除いたIDでカタログを1回だけ引く。
pub(crate) async fn resolve_titles(
    catalog_store: &dyn CatalogStore,
    book_ids: impl IntoIterator<Item = BookId>,
) -> std::result::Result<HashMap<BookId, String>, Box<dyn std::error::Error + Send + Sync>> {
    let mut seen = HashSet::new();
    let unique: Vec<BookId> = book_ids.into_iter().filter(|id| seen.insert(*id)).collect();
    if unique.is_empty() {
        return Ok(HashMap::new());
    }

    catalog_store.titles_by_ids(&unique).await
}

/// 蔵書を登録する（管理者）
///
/// ビジネスルール：
/// - 所蔵冊数 = 貸出可能冊数 = 登録冊数
/// - ISBNは32文字まで
pub async fn add_book(deps: &ServiceDependencies, cmd: AddBook) -> Result<Book> {
    if cmd.isbn.chars().count() > MAX_ISBN_LEN {
        return Err(CatalogApplicationError::InvalidBook(format!(
            "isbn must be at most {} characters",
            MAX_ISBN_LEN
        )));
    }

    let book = domain::book::add_book(cmd);

    deps.catalog_store
        .insert(book.clone())
        .await
        .map_err(CatalogApplicationError::CatalogStoreError)?;

    tracing::info!(
        book_id = %book.book_id.value(),
        copies = book.inventory.copies_total(),
        "Book added: {}",
        book.title
    );

    Ok(book)
}

/// 蔵書をIDで取得する
pub async fn get_book(deps: &ServiceDependencies, book_id: BookId) -> Result<Book> {
    deps.catalog_store
        .get_by_id(book_id)
        .await
        .map_err(CatalogApplicationError::CatalogStoreError)?
        .ok_or(CatalogApplicationError::BookNotFound)
}

/// 蔵書を検索する
///
/// 検索語が空の場合は全件を返す。
pub async fn search_catalog(deps: &ServiceDependencies, query: Option<&str>) -> Result<Vec<Book>> {
    let query = query.map(str::trim).filter(|q| !q.is_empty());

    deps.catalog_store
        .search(query)
        .await
        .map_err(CatalogApplicationError::CatalogStoreError)
}

/// 電子書籍が添付された蔵書の一覧
pub async fn list_ebooks(deps: &ServiceDependencies) -> Result<Vec<Book>> {
    deps.catalog_store
        .find_with_ebook()
        .await
        .map_err(CatalogApplicationError::CatalogStoreError)
}

/// 蔵書を削除する（管理者）
///
/// 存在しない場合も成功とする。貸出中の記録は台帳に残る。
pub async fn delete_book(deps: &ServiceDependencies, book_id: BookId) -> Result<()> {
    let deleted = deps
        .catalog_store
        .delete(book_id)
        .await
        .map_err(CatalogApplicationError::CatalogStoreError)?;

    if deleted {
        tracing::info!(book_id = %book_id.value(), "Book deleted");
    } else {
        tracing::debug!(book_id = %book_id.value(), "Delete requested for unknown book");
    }

    Ok(())
}

/// カタログが空なら見本の蔵書を登録する
///
/// # 戻り値
/// 登録した冊数（既に蔵書がある場合は0）
pub async fn seed_defaults(deps: &ServiceDependencies) -> Result<usize> {
    let existing = deps
        .catalog_store
        .count()
        .await
        .map_err(CatalogApplicationError::CatalogStoreError)?;

    if existing > 0 {
        return Ok(0);
    }

    let now = Utc::now();
    for i in 1..=5 {
        let cmd = AddBook {
            title: format!("Sample Book {}", i),
            author: format!("Author {}", i),
            category: "General".to_string(),
            isbn: format!("ISBN{}", i),
            description: "This is a sample book.".to_string(),
            copies: SAMPLE_BOOK_COPIES,
            cover_image: Some(format!("cover{}.svg", i)),
            ebook: None,
            added_at: now,
        };
        add_book(deps, cmd).await?;
    }

    Ok(5)
}
