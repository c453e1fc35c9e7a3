use crate::domain::{BorrowBookError, ReturnBookError};
use thiserror::Error;

/// 貸出管理アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum LendingApplicationError {
    /// 蔵書が見つからない
    #[error("Book not found")]
    BookNotFound,

    /// 貸出可能な冊数がない
    #[error("Book is not available, consider reserving it")]
    BookUnavailable,

    /// 貸出が見つからない
    #[error("Borrow record not found")]
    BorrowNotFound,

    /// 既に返却済み
    #[error("Book has already been returned")]
    AlreadyReturned,

    /// CatalogStoreのエラー
    #[error("Catalog store error")]
    CatalogStoreError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// LendingLedgerのエラー
    #[error("Lending ledger error")]
    LendingLedgerError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<BorrowBookError> for LendingApplicationError {
    fn from(err: BorrowBookError) -> Self {
        match err {
            BorrowBookError::NoCopiesAvailable => LendingApplicationError::BookUnavailable,
        }
    }
}

impl From<ReturnBookError> for LendingApplicationError {
    fn from(err: ReturnBookError) -> Self {
        match err {
            ReturnBookError::AlreadyReturned => LendingApplicationError::AlreadyReturned,
        }
    }
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, LendingApplicationError>;
