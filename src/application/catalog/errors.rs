use thiserror::Error;

/// カタログ管理アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum CatalogApplicationError {
    /// 蔵書が見つからない
    #[error("Book not found")]
    BookNotFound,

    /// 登録内容が不正
    #[error("Invalid book: {0}")]
    InvalidBook(String),

    /// CatalogStoreのエラー
    #[error("Catalog store error")]
    CatalogStoreError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, CatalogApplicationError>;
