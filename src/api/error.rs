use crate::application::{
    catalog::CatalogApplicationError, lending::LendingApplicationError,
    reports::ReportsApplicationError, reservation::ReservationApplicationError,
};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーをラップし、HTTPレスポンスへのマッピングを提供する。
#[derive(Debug)]
pub enum ApiError {
    Catalog(CatalogApplicationError),
    Lending(LendingApplicationError),
    Reservation(ReservationApplicationError),
    Reports(ReportsApplicationError),
    /// リクエストの形式が不正
    BadRequest(String),
}

impl From<CatalogApplicationError> for ApiError {
    fn from(err: CatalogApplicationError) -> Self {
        ApiError::Catalog(err)
    }
}

impl From<LendingApplicationError> for ApiError {
    fn from(err: LendingApplicationError) -> Self {
        ApiError::Lending(err)
    }
}

impl From<ReservationApplicationError> for ApiError {
    fn from(err: ReservationApplicationError) -> Self {
        ApiError::Reservation(err)
    }
}

impl From<ReportsApplicationError> for ApiError {
    fn from(err: ReportsApplicationError) -> Self {
        ApiError::Reports(err)
    }
}

/// 500 Internal Server Error
///
/// 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
fn internal_error(
    error_type: &'static str,
    err: &(dyn std::error::Error + Send + Sync),
) -> (StatusCode, &'static str, String) {
    tracing::error!("{}: {}", error_type, err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        error_type,
        "An unexpected error occurred".to_string(),
    )
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),

            ApiError::Catalog(err) => match err {
                CatalogApplicationError::BookNotFound => {
                    (StatusCode::NOT_FOUND, "BOOK_NOT_FOUND", err.to_string())
                }
                CatalogApplicationError::InvalidBook(ref msg) => {
                    (StatusCode::BAD_REQUEST, "INVALID_BOOK", msg.clone())
                }
                CatalogApplicationError::CatalogStoreError(ref e) => {
                    internal_error("CATALOG_STORE_ERROR", e.as_ref())
                }
            },

            ApiError::Lending(err) => match err {
                // 404 Not Found - リクエストされたリソースが存在しない
                LendingApplicationError::BookNotFound => {
                    (StatusCode::NOT_FOUND, "BOOK_NOT_FOUND", err.to_string())
                }
                LendingApplicationError::BorrowNotFound => {
                    (StatusCode::NOT_FOUND, "BORROW_NOT_FOUND", err.to_string())
                }
                // 409 Conflict - 状態の衝突
                LendingApplicationError::AlreadyReturned => {
                    (StatusCode::CONFLICT, "ALREADY_RETURNED", err.to_string())
                }
                // 422 Unprocessable Entity - ビジネスルール違反
                LendingApplicationError::BookUnavailable => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "BOOK_UNAVAILABLE",
                    err.to_string(),
                ),
                LendingApplicationError::CatalogStoreError(ref e) => {
                    internal_error("CATALOG_STORE_ERROR", e.as_ref())
                }
                LendingApplicationError::LendingLedgerError(ref e) => {
                    internal_error("LENDING_LEDGER_ERROR", e.as_ref())
                }
            },

            ApiError::Reservation(err) => match err {
                ReservationApplicationError::BookNotFound => {
                    (StatusCode::NOT_FOUND, "BOOK_NOT_FOUND", err.to_string())
                }
                ReservationApplicationError::ReservationNotFoundOrUnauthorized => (
                    StatusCode::NOT_FOUND,
                    "RESERVATION_NOT_FOUND_OR_UNAUTHORIZED",
                    err.to_string(),
                ),
                ReservationApplicationError::AlreadyReserved => {
                    (StatusCode::CONFLICT, "ALREADY_RESERVED", err.to_string())
                }
                ReservationApplicationError::CatalogStoreError(ref e) => {
                    internal_error("CATALOG_STORE_ERROR", e.as_ref())
                }
                ReservationApplicationError::ReservationQueueError(ref e) => {
                    internal_error("RESERVATION_QUEUE_ERROR", e.as_ref())
                }
            },

            ApiError::Reports(err) => match err {
                ReportsApplicationError::CatalogStoreError(ref e) => {
                    internal_error("CATALOG_STORE_ERROR", e.as_ref())
                }
                ReportsApplicationError::LendingLedgerError(ref e) => {
                    internal_error("LENDING_LEDGER_ERROR", e.as_ref())
                }
            },
        };

        let body = Json(ErrorResponse::new(error_type, message));
        (status, body).into_response()
    }
}
