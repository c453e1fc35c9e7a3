use super::lock;
use crate::domain::{BookId, Inventory, book::Book};
use crate::ports::catalog_store::{CatalogStore as CatalogStoreTrait, CheckoutOutcome, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// CatalogStoreのインメモリ実装
///
/// 登録順を保持するためVecで管理する。
pub struct CatalogStore {
    books: Mutex<Vec<Book>>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self {
            books: Mutex::new(Vec::new()),
        }
    }
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogStoreTrait for CatalogStore {
    async fn insert(&self, book: Book) -> Result<()> {
        let mut books = lock(&self.books)?;
        if books.iter().any(|b| b.book_id == book.book_id) {
            return Err(format!("book {} already exists", book.book_id.value()).into());
        }
        books.push(book);
        Ok(())
    }

    async fn get_by_id(&self, book_id: BookId) -> Result<Option<Book>> {
        let books = lock(&self.books)?;
        Ok(books.iter().find(|b| b.book_id == book_id).cloned())
    }

    async fn titles_by_ids(&self, book_ids: &[BookId]) -> Result<HashMap<BookId, String>> {
        let books = lock(&self.books)?;
        Ok(books
            .iter()
            .filter(|b| book_ids.contains(&b.book_id))
            .map(|b| (b.book_id, b.title.clone()))
            .collect())
    }

    async fn search(&self, query: Option<&str>) -> Result<Vec<Book>> {
        let books = lock(&self.books)?;
        Ok(books
            .iter()
            .filter(|b| query.is_none_or(|q| b.matches_query(q)))
            .cloned()
            .collect())
    }

    async fn find_with_ebook(&self) -> Result<Vec<Book>> {
        let books = lock(&self.books)?;
        Ok(books.iter().filter(|b| b.has_ebook()).cloned().collect())
    }

    async fn delete(&self, book_id: BookId) -> Result<bool> {
        let mut books = lock(&self.books)?;
        let before = books.len();
        books.retain(|b| b.book_id != book_id);
        Ok(books.len() != before)
    }

    async fn count(&self) -> Result<u64> {
        Ok(lock(&self.books)?.len() as u64)
    }

    /// ロック内で判定と減算を行う
    async fn try_checkout(&self, book_id: BookId) -> Result<CheckoutOutcome> {
        let mut books = lock(&self.books)?;
        let Some(book) = books.iter_mut().find(|b| b.book_id == book_id) else {
            return Ok(CheckoutOutcome::NotFound);
        };

        match book.inventory.checkout() {
            Ok(inventory) => {
                book.inventory = inventory;
                Ok(CheckoutOutcome::CheckedOut(inventory))
            }
            Err(_) => Ok(CheckoutOutcome::Unavailable),
        }
    }

    async fn checkin(&self, book_id: BookId) -> Result<Option<Inventory>> {
        let mut books = lock(&self.books)?;
        Ok(books.iter_mut().find(|b| b.book_id == book_id).map(|book| {
            book.inventory = book.inventory.checkin();
            book.inventory
        }))
    }
}
