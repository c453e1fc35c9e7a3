use crate::domain::{BookId, Inventory, book::Book};
use crate::ports::catalog_store::{CatalogStore as CatalogStoreTrait, CheckoutOutcome, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use std::collections::HashMap;
use uuid::Uuid;

/// 不正なデータをI/Oエラーとして包む
fn invalid_data(message: String) -> Box<dyn std::error::Error + Send + Sync> {
    Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, message))
}

/// 冊数カラム（INTEGER）をu32に変換する
fn copies_from_row(row: &PgRow, column: &str) -> Result<u32> {
    let value: i32 = row.try_get(column)?;
    u32::try_from(value).map_err(|_| invalid_data(format!("{} out of range: {}", column, value)))
}

fn inventory_from_row(row: &PgRow) -> Result<Inventory> {
    let total = copies_from_row(row, "copies_total")?;
    let available = copies_from_row(row, "copies_available")?;
    Inventory::from_counts(total, available).map_err(|e| invalid_data(format!("{:?}", e)))
}

/// PostgreSQLの行データをBookに変換する
fn map_row_to_book(row: &PgRow) -> Result<Book> {
    Ok(Book {
        book_id: BookId::from_uuid(row.try_get("book_id")?),
        title: row.try_get("title")?,
        author: row.try_get("author")?,
        category: row.try_get("category")?,
        isbn: row.try_get("isbn")?,
        description: row.try_get("description")?,
        inventory: inventory_from_row(row)?,
        ebook: row.try_get("ebook")?,
        cover_image: row.try_get("cover_image")?,
        created_at: row.try_get("created_at")?,
    })
}

/// ILIKE用に検索語をエスケープして部分一致パターンにする
fn like_pattern(query: &str) -> String {
    let escaped = query
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

const BOOK_COLUMNS: &str = "book_id, title, author, category, isbn, description, \
     copies_total, copies_available, ebook, cover_image, created_at";

/// CatalogStoreのPostgreSQL実装
///
/// 在庫の増減は単一のUPDATE文の条件で判定し、読み取りとの間に隙間を作らない。
pub struct CatalogStore {
    pool: PgPool,
}

impl CatalogStore {
    /// PostgreSQLコネクションプールから新しいCatalogStoreを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn exists(&self, book_id: BookId) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM books WHERE book_id = $1)")
                .bind(book_id.value())
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }
}

#[async_trait]
impl CatalogStoreTrait for CatalogStore {
    async fn insert(&self, book: Book) -> Result<()> {
        let copies_total = i32::try_from(book.inventory.copies_total())?;
        let copies_available = i32::try_from(book.inventory.copies_available())?;

        sqlx::query(
            r#"
            INSERT INTO books (
                book_id,
                title,
                author,
                category,
                isbn,
                description,
                copies_total,
                copies_available,
                ebook,
                cover_image,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(book.book_id.value())
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.category)
        .bind(&book.isbn)
        .bind(&book.description)
        .bind(copies_total)
        .bind(copies_available)
        .bind(&book.ebook)
        .bind(&book.cover_image)
        .bind(book.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_by_id(&self, book_id: BookId) -> Result<Option<Book>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM books WHERE book_id = $1",
            BOOK_COLUMNS
        ))
        .bind(book_id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_book).transpose()
    }

    async fn titles_by_ids(&self, book_ids: &[BookId]) -> Result<HashMap<BookId, String>> {
        let ids: Vec<Uuid> = book_ids.iter().map(|id| id.value()).collect();
        let rows = sqlx::query("SELECT book_id, title FROM books WHERE book_id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                Ok((
                    BookId::from_uuid(row.try_get("book_id")?),
                    row.try_get("title")?,
                ))
            })
            .collect()
    }

    async fn search(&self, query: Option<&str>) -> Result<Vec<Book>> {
        let pattern = query
            .filter(|q| !q.trim().is_empty())
            .map(like_pattern);

        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM books
            WHERE $1::text IS NULL
               OR title ILIKE $1
               OR author ILIKE $1
               OR isbn ILIKE $1
               OR category ILIKE $1
            ORDER BY seq ASC
            "#,
            BOOK_COLUMNS
        ))
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_book).collect()
    }

    async fn find_with_ebook(&self) -> Result<Vec<Book>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM books WHERE ebook IS NOT NULL ORDER BY seq ASC",
            BOOK_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_book).collect()
    }

    async fn delete(&self, book_id: BookId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM books WHERE book_id = $1")
            .bind(book_id.value())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(u64::try_from(count)?)
    }

    /// 条件付きUPDATEで在庫を減算する
    ///
    /// 更新行がなければ、蔵書の有無で Unavailable / NotFound を区別する。
    async fn try_checkout(&self, book_id: BookId) -> Result<CheckoutOutcome> {
        let row = sqlx::query(
            r#"
            UPDATE books
            SET copies_available = copies_available - 1
            WHERE book_id = $1 AND copies_available >= 1
            RETURNING copies_total, copies_available
            "#,
        )
        .bind(book_id.value())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(CheckoutOutcome::CheckedOut(inventory_from_row(&row)?)),
            None if self.exists(book_id).await? => Ok(CheckoutOutcome::Unavailable),
            None => Ok(CheckoutOutcome::NotFound),
        }
    }

    async fn checkin(&self, book_id: BookId) -> Result<Option<Inventory>> {
        let row = sqlx::query(
            r#"
            UPDATE books
            SET copies_available = LEAST(copies_available + 1, copies_total)
            WHERE book_id = $1
            RETURNING copies_total, copies_available
            "#,
        )
        .bind(book_id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(inventory_from_row).transpose()
    }
}
