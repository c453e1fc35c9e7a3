use super::lock;
use crate::domain::{BookId, ReservationId, UserId, reservation::Reservation};
use crate::ports::reservation_queue::{ReservationQueue as ReservationQueueTrait, Result};
use async_trait::async_trait;
use std::sync::Mutex;

/// ReservationQueueのインメモリ実装
pub struct ReservationQueue {
    reservations: Mutex<Vec<Reservation>>,
}

impl ReservationQueue {
    pub fn new() -> Self {
        Self {
            reservations: Mutex::new(Vec::new()),
        }
    }
}

impl Default for ReservationQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReservationQueueTrait for ReservationQueue {
    /// 重複確認と登録を同じロック内で行う
    async fn insert_if_absent(&self, reservation: Reservation) -> Result<bool> {
        let mut reservations = lock(&self.reservations)?;
        let exists = reservations
            .iter()
            .any(|r| r.user_id == reservation.user_id && r.book_id == reservation.book_id);
        if exists {
            return Ok(false);
        }
        reservations.push(reservation);
        Ok(true)
    }

    async fn get_by_id(&self, reservation_id: ReservationId) -> Result<Option<Reservation>> {
        let reservations = lock(&self.reservations)?;
        Ok(reservations
            .iter()
            .find(|r| r.reservation_id == reservation_id)
            .cloned())
    }

    async fn delete(&self, reservation_id: ReservationId) -> Result<bool> {
        let mut reservations = lock(&self.reservations)?;
        let before = reservations.len();
        reservations.retain(|r| r.reservation_id != reservation_id);
        Ok(reservations.len() != before)
    }

    async fn find_by_user_id(&self, user_id: UserId) -> Result<Vec<Reservation>> {
        let reservations = lock(&self.reservations)?;
        let mut found: Vec<Reservation> = reservations
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        found.sort_by_key(|r| r.date);
        Ok(found)
    }

    async fn next_unfulfilled_for_book(&self, book_id: BookId) -> Result<Option<Reservation>> {
        let reservations = lock(&self.reservations)?;
        Ok(reservations
            .iter()
            .filter(|r| r.book_id == book_id && !r.fulfilled)
            .min_by_key(|r| r.date)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reservation::reserve_book;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_insert_if_absent_rejects_same_pair() {
        let queue = ReservationQueue::new();
        let user_id = UserId::new();
        let book_id = BookId::new();

        let (first, _) = reserve_book(user_id, book_id, Utc::now());
        let (second, _) = reserve_book(user_id, book_id, Utc::now());

        assert!(queue.insert_if_absent(first).await.unwrap());
        assert!(!queue.insert_if_absent(second).await.unwrap());
        assert_eq!(queue.find_by_user_id(user_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_next_unfulfilled_is_oldest() {
        let queue = ReservationQueue::new();
        let book_id = BookId::new();
        let now = Utc::now();

        let (later, _) = reserve_book(UserId::new(), book_id, now);
        let (earlier, _) = reserve_book(UserId::new(), book_id, now - Duration::hours(2));
        let earlier_id = earlier.reservation_id;

        queue.insert_if_absent(later).await.unwrap();
        queue.insert_if_absent(earlier).await.unwrap();

        let next = queue.next_unfulfilled_for_book(book_id).await.unwrap().unwrap();
        assert_eq!(next.reservation_id, earlier_id);
        assert!(queue.next_unfulfilled_for_book(BookId::new()).await.unwrap().is_none());
    }
}
