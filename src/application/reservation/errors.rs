use crate::domain::CancelReservationError;
use thiserror::Error;

/// 予約管理アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum ReservationApplicationError {
    /// 蔵書が見つからない
    #[error("Book not found")]
    BookNotFound,

    /// 同じ蔵書を既に予約している
    #[error("You have already reserved this book")]
    AlreadyReserved,

    /// 予約が存在しない、または予約者本人ではない
    ///
    /// 他人の予約の存在を明かさないため、2つを区別しない。
    #[error("Reservation not found or unauthorized")]
    ReservationNotFoundOrUnauthorized,

    /// CatalogStoreのエラー
    #[error("Catalog store error")]
    CatalogStoreError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// ReservationQueueのエラー
    #[error("Reservation queue error")]
    ReservationQueueError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<CancelReservationError> for ReservationApplicationError {
    fn from(err: CancelReservationError) -> Self {
        match err {
            CancelReservationError::NotOwner => {
                ReservationApplicationError::ReservationNotFoundOrUnauthorized
            }
        }
    }
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, ReservationApplicationError>;
