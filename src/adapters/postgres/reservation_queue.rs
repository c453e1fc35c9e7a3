use crate::domain::{BookId, ReservationId, UserId, reservation::Reservation};
use crate::ports::reservation_queue::{ReservationQueue as ReservationQueueTrait, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

fn map_row_to_reservation(row: &PgRow) -> Result<Reservation> {
    Ok(Reservation {
        reservation_id: ReservationId::from_uuid(row.try_get("reservation_id")?),
        user_id: UserId::from_uuid(row.try_get("user_id")?),
        book_id: BookId::from_uuid(row.try_get("book_id")?),
        date: row.try_get("date")?,
        fulfilled: row.try_get("fulfilled")?,
    })
}

/// ReservationQueueのPostgreSQL実装
///
/// (user_id, book_id) の一意制約で重複予約を防ぐ。
pub struct ReservationQueue {
    pool: PgPool,
}

impl ReservationQueue {
    /// PostgreSQLコネクションプールから新しいReservationQueueを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReservationQueueTrait for ReservationQueue {
    async fn insert_if_absent(&self, reservation: Reservation) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO reservations (
                reservation_id,
                user_id,
                book_id,
                date,
                fulfilled
            )
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, book_id) DO NOTHING
            "#,
        )
        .bind(reservation.reservation_id.value())
        .bind(reservation.user_id.value())
        .bind(reservation.book_id.value())
        .bind(reservation.date)
        .bind(reservation.fulfilled)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn get_by_id(&self, reservation_id: ReservationId) -> Result<Option<Reservation>> {
        let row = sqlx::query(
            r#"
            SELECT reservation_id, user_id, book_id, date, fulfilled
            FROM reservations
            WHERE reservation_id = $1
            "#,
        )
        .bind(reservation_id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_reservation).transpose()
    }

    async fn delete(&self, reservation_id: ReservationId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM reservations WHERE reservation_id = $1")
            .bind(reservation_id.value())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_user_id(&self, user_id: UserId) -> Result<Vec<Reservation>> {
        let rows = sqlx::query(
            r#"
            SELECT reservation_id, user_id, book_id, date, fulfilled
            FROM reservations
            WHERE user_id = $1
            ORDER BY date ASC, seq ASC
            "#,
        )
        .bind(user_id.value())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_reservation).collect()
    }

    async fn next_unfulfilled_for_book(&self, book_id: BookId) -> Result<Option<Reservation>> {
        let row = sqlx::query(
            r#"
            SELECT reservation_id, user_id, book_id, date, fulfilled
            FROM reservations
            WHERE book_id = $1 AND fulfilled = FALSE
            ORDER BY date ASC, seq ASC
            LIMIT 1
            "#,
        )
        .bind(book_id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_reservation).transpose()
    }
}
