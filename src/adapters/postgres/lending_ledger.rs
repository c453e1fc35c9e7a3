use crate::domain::{
    BookId, BorrowId, Fine, UserId,
    borrow::{ActiveBorrow, Borrow, BorrowCore, ReturnedBorrow},
};
use crate::ports::lending_ledger::{BorrowCount, LendingLedger as LendingLedgerTrait, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};

/// PostgreSQLの行データをBorrowに変換する
///
/// returned_dateの有無でActive/Returnedを判別する。
/// fineのi32からFineへの変換でエラーハンドリングを行う。
fn map_row_to_borrow(row: &PgRow) -> Result<Borrow> {
    let core = BorrowCore {
        borrow_id: BorrowId::from_uuid(row.try_get("borrow_id")?),
        user_id: UserId::from_uuid(row.try_get("user_id")?),
        book_id: BookId::from_uuid(row.try_get("book_id")?),
        borrow_date: row.try_get("borrow_date")?,
        due_date: row.try_get("due_date")?,
    };

    let returned_date: Option<DateTime<Utc>> = row.try_get("returned_date")?;
    let Some(returned_date) = returned_date else {
        return Ok(Borrow::Active(ActiveBorrow { core }));
    };

    let fine: Option<i32> = row.try_get("fine")?;
    let fine = fine
        .map(|amount| {
            Fine::try_from(amount).map_err(|_| {
                Box::new(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("fine out of range: {}", amount),
                )) as Box<dyn std::error::Error + Send + Sync>
            })
        })
        .transpose()?;

    Ok(Borrow::Returned(ReturnedBorrow {
        core,
        returned_date,
        fine,
    }))
}

/// LendingLedgerのPostgreSQL実装
pub struct LendingLedger {
    pool: PgPool,
}

impl LendingLedger {
    /// PostgreSQLコネクションプールから新しいLendingLedgerを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LendingLedgerTrait for LendingLedger {
    async fn insert(&self, borrow: ActiveBorrow) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO borrows (
                borrow_id,
                user_id,
                book_id,
                borrow_date,
                due_date
            )
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(borrow.borrow_id.value())
        .bind(borrow.user_id.value())
        .bind(borrow.book_id.value())
        .bind(borrow.borrow_date)
        .bind(borrow.due_date)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_by_id(&self, borrow_id: BorrowId) -> Result<Option<Borrow>> {
        let row = sqlx::query(
            r#"
            SELECT
                borrow_id,
                user_id,
                book_id,
                borrow_date,
                due_date,
                returned_date,
                fine
            FROM borrows
            WHERE borrow_id = $1
            "#,
        )
        .bind(borrow_id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_borrow).transpose()
    }

    /// returned_date IS NULL を条件に更新し、二重返却を防ぐ
    async fn mark_returned(&self, returned: &ReturnedBorrow) -> Result<bool> {
        let fine = returned
            .fine
            .map(|fine| i32::try_from(fine.amount()))
            .transpose()?;

        let result = sqlx::query(
            r#"
            UPDATE borrows
            SET returned_date = $2, fine = $3
            WHERE borrow_id = $1 AND returned_date IS NULL
            "#,
        )
        .bind(returned.borrow_id.value())
        .bind(returned.returned_date)
        .bind(fine)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// 自分が書き込んだ返却日時と一致する場合のみ戻す
    async fn reopen(&self, returned: &ReturnedBorrow) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE borrows
            SET returned_date = NULL, fine = NULL
            WHERE borrow_id = $1 AND returned_date = $2
            "#,
        )
        .bind(returned.borrow_id.value())
        .bind(returned.returned_date)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn find_by_user_id(&self, user_id: UserId) -> Result<Vec<Borrow>> {
        let rows = sqlx::query(
            r#"
            SELECT
                borrow_id,
                user_id,
                book_id,
                borrow_date,
                due_date,
                returned_date,
                fine
            FROM borrows
            WHERE user_id = $1
            ORDER BY seq ASC
            "#,
        )
        .bind(user_id.value())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_borrow).collect()
    }

    async fn count_active(&self) -> Result<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM borrows WHERE returned_date IS NULL")
                .fetch_one(&self.pool)
                .await?;
        Ok(u64::try_from(count)?)
    }

    /// 同数の場合は最初の貸出のseqが小さい蔵書を先にする
    async fn top_borrowed_books(&self, limit: usize, offset: usize) -> Result<Vec<BorrowCount>> {
        let rows = sqlx::query(
            r#"
            SELECT book_id, COUNT(*) AS borrow_count, MIN(seq) AS first_seq
            FROM borrows
            GROUP BY book_id
            ORDER BY borrow_count DESC, first_seq ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(i64::try_from(limit)?)
        .bind(i64::try_from(offset)?)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<BorrowCount> {
                let count: i64 = row.try_get("borrow_count")?;
                Ok(BorrowCount {
                    book_id: BookId::from_uuid(row.try_get("book_id")?),
                    count: u64::try_from(count)?,
                })
            })
            .collect()
    }
}
