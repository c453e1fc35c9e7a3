use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BookId, Inventory, commands::AddBook};

/// 表紙画像が指定されなかった場合の既定値
pub const DEFAULT_COVER_IMAGE: &str = "cover1.svg";

/// タイトルが空の場合の既定値
pub const UNTITLED: &str = "Untitled";

/// Book集約 - カタログに登録された1タイトル
///
/// 貸出可能冊数の増減は`Inventory`を通してのみ行う。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub book_id: BookId,
    pub title: String,
    pub author: String,
    pub category: String,
    pub isbn: String,
    pub description: String,
    pub inventory: Inventory,
    /// 電子書籍ファイルへの参照
    pub ebook: Option<String>,
    /// 表紙画像への参照
    pub cover_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Book {
    /// 検索語に一致するか（タイトル・著者・ISBN・分類、大文字小文字を区別しない）
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [&self.title, &self.author, &self.isbn, &self.category]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    pub fn has_ebook(&self) -> bool {
        self.ebook.is_some()
    }
}

/// 純粋関数：蔵書を登録する
///
/// ビジネスルール：
/// - 所蔵冊数 = 貸出可能冊数 = 登録冊数
/// - タイトルが空なら"Untitled"
/// - 表紙画像が未指定なら既定の画像
///
/// 副作用なし。新しいBookを返す。
pub fn add_book(cmd: AddBook) -> Book {
    let title = match cmd.title.trim() {
        "" => UNTITLED.to_string(),
        title => title.to_string(),
    };

    Book {
        book_id: BookId::new(),
        title,
        author: cmd.author,
        category: cmd.category,
        isbn: cmd.isbn,
        description: cmd.description,
        inventory: Inventory::new(cmd.copies),
        ebook: cmd.ebook.filter(|name| !name.is_empty()),
        cover_image: Some(
            cmd.cover_image
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| DEFAULT_COVER_IMAGE.to_string()),
        ),
        created_at: cmd.added_at,
    }
}
