use thiserror::Error;

/// 集計アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum ReportsApplicationError {
    /// CatalogStoreのエラー
    #[error("Catalog store error")]
    CatalogStoreError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// LendingLedgerのエラー
    #[error("Lending ledger error")]
    LendingLedgerError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, ReportsApplicationError>;
