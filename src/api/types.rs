use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::{
    lending::{BorrowSummary, ReturnOutcome},
    reports::{LibraryStats, TopBorrowedBook},
    reservation::{ReservableBook, ReservationSummary},
};
use crate::domain::{
    UserId,
    book::Book,
    borrow::{ActiveBorrow, Borrow},
    commands::AddBook,
    reservation::Reservation,
};

// ============================================================================
// Requests
// ============================================================================

/// 蔵書検索のクエリパラメータ
#[derive(Debug, Deserialize)]
pub struct SearchBooksQuery {
    pub q: Option<String>,
}

/// 蔵書登録リクエスト（POST /books）
#[derive(Debug, Deserialize)]
pub struct AddBookRequest {
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub isbn: String,
    #[serde(default)]
    pub description: String,
    /// 省略時は1冊
    pub copies: Option<u32>,
    pub cover_image: Option<String>,
    pub ebook: Option<String>,
}

impl AddBookRequest {
    pub fn to_command(self) -> AddBook {
        AddBook {
            title: self.title,
            author: self.author,
            category: self.category,
            isbn: self.isbn,
            description: self.description,
            copies: self.copies.unwrap_or(1),
            cover_image: self.cover_image,
            ebook: self.ebook,
            added_at: Utc::now(),
        }
    }
}

/// 利用者を指定するリクエスト（貸出・返却・予約）
#[derive(Debug, Deserialize)]
pub struct UserRequest {
    pub user_id: Uuid,
}

impl UserRequest {
    pub fn user_id(&self) -> UserId {
        UserId::from_uuid(self.user_id)
    }
}

/// 利用者を指定するクエリパラメータ（予約取消）
#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: Option<Uuid>,
}

// ============================================================================
// Responses
// ============================================================================

/// 蔵書レスポンス
#[derive(Debug, Serialize)]
pub struct BookResponse {
    pub book_id: Uuid,
    pub title: String,
    pub author: String,
    pub category: String,
    pub isbn: String,
    pub description: String,
    pub copies_total: u32,
    pub copies_available: u32,
    pub ebook: Option<String>,
    pub cover_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            book_id: book.book_id.value(),
            copies_total: book.inventory.copies_total(),
            copies_available: book.inventory.copies_available(),
            title: book.title,
            author: book.author,
            category: book.category,
            isbn: book.isbn,
            description: book.description,
            ebook: book.ebook,
            cover_image: book.cover_image,
            created_at: book.created_at,
        }
    }
}

/// 貸出作成レスポンス（POST /books/:id/borrow）
#[derive(Debug, Serialize)]
pub struct BorrowCreatedResponse {
    pub borrow_id: Uuid,
    pub book_id: Uuid,
    pub user_id: Uuid,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
}

impl From<ActiveBorrow> for BorrowCreatedResponse {
    fn from(borrow: ActiveBorrow) -> Self {
        Self {
            borrow_id: borrow.borrow_id.value(),
            book_id: borrow.book_id.value(),
            user_id: borrow.user_id.value(),
            borrow_date: borrow.borrow_date,
            due_date: borrow.due_date,
        }
    }
}

/// 返却レスポンス（POST /borrows/:id/return）
#[derive(Debug, Serialize)]
pub struct BookReturnedResponse {
    pub borrow_id: Uuid,
    pub book_id: Uuid,
    pub on_time: bool,
    pub days_late: i64,
    pub fine: u32,
    pub message: String,
}

impl From<ReturnOutcome> for BookReturnedResponse {
    fn from(outcome: ReturnOutcome) -> Self {
        Self {
            message: outcome.message(),
            borrow_id: outcome.borrow_id.value(),
            book_id: outcome.book_id.value(),
            on_time: outcome.on_time,
            days_late: outcome.days_late,
            fine: outcome.fine,
        }
    }
}

/// 貸出一覧の1行
#[derive(Debug, Serialize)]
pub struct BorrowResponse {
    pub borrow_id: Uuid,
    pub book_id: Uuid,
    pub title: String,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub returned_date: Option<DateTime<Utc>>,
    pub fine: Option<u32>,
}

impl From<BorrowSummary> for BorrowResponse {
    fn from(summary: BorrowSummary) -> Self {
        let borrow: &Borrow = &summary.borrow;
        let core = borrow.core();
        Self {
            borrow_id: core.borrow_id.value(),
            book_id: core.book_id.value(),
            borrow_date: core.borrow_date,
            due_date: core.due_date,
            returned_date: borrow.returned_date(),
            fine: borrow.fine().map(|f| f.amount()),
            title: summary.title,
        }
    }
}

/// 予約レスポンス
#[derive(Debug, Serialize)]
pub struct ReservationResponse {
    pub reservation_id: Uuid,
    pub book_id: Uuid,
    pub title: String,
    pub date: DateTime<Utc>,
    pub fulfilled: bool,
}

impl ReservationResponse {
    pub fn new(reservation: Reservation, title: String) -> Self {
        Self {
            reservation_id: reservation.reservation_id.value(),
            book_id: reservation.book_id.value(),
            title,
            date: reservation.date,
            fulfilled: reservation.fulfilled,
        }
    }
}

impl From<ReservationSummary> for ReservationResponse {
    fn from(summary: ReservationSummary) -> Self {
        Self::new(summary.reservation, summary.title)
    }
}

/// 予約画面の蔵書1件
#[derive(Debug, Serialize)]
pub struct ReservableBookResponse {
    pub book_id: Uuid,
    pub title: String,
    pub reserved: bool,
}

impl From<ReservableBook> for ReservableBookResponse {
    fn from(book: ReservableBook) -> Self {
        Self {
            book_id: book.book_id.value(),
            title: book.title,
            reserved: book.reserved,
        }
    }
}

/// 利用者ダッシュボード（GET /users/:id/dashboard）
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub borrows: Vec<BorrowResponse>,
    pub reservations: Vec<ReservationResponse>,
    pub books: Vec<ReservableBookResponse>,
}

/// 人気蔵書の1行
#[derive(Debug, Serialize)]
pub struct TopBookResponse {
    pub title: String,
    pub count: u64,
}

impl From<TopBorrowedBook> for TopBookResponse {
    fn from(book: TopBorrowedBook) -> Self {
        Self {
            title: book.title,
            count: book.count,
        }
    }
}

/// レポート（GET /reports）
#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub books: u64,
    pub active_borrows: u64,
    pub top_books: Vec<TopBookResponse>,
}

impl ReportResponse {
    pub fn new(stats: LibraryStats, top_books: Vec<TopBorrowedBook>) -> Self {
        Self {
            books: stats.books,
            active_borrows: stats.active_borrows,
            top_books: top_books.into_iter().map(TopBookResponse::from).collect(),
        }
    }
}

/// エラーレスポンス
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}
